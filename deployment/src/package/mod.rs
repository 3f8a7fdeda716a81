use handlebars::Handlebars;
use serde::Serialize;

use crate::{helpers::zip_files, sanitize, DeployConfig, DeployError, Platform};

const FALLBACK_NAME: &str = "site";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bundle {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct Packager {
    handlebars: Handlebars<'static>,
}

impl Default for Packager {
    fn default() -> Self {
        Packager::new()
    }
}

impl Packager {
    pub fn new() -> Packager {
        Packager {
            handlebars: Handlebars::new(),
        }
    }

    pub fn build(&self, artifact: &str, config: &DeployConfig) -> Result<Bundle, DeployError> {
        let slug = sanitize(&config.project_name)
            .map(|s| s.to_string())
            .unwrap_or_else(|_| FALLBACK_NAME.to_owned());

        let (config_file, config_content) = self.platform_config(config, &slug)?;
        let manifest = package_manifest(&slug)?;

        let bytes = zip_files(&[
            ("index.html", artifact.as_bytes()),
            (config_file, config_content.as_bytes()),
            ("package.json", manifest.as_bytes()),
        ])
        .map_err(|e| DeployError::Packaging(format!("{:#}", e)))?;
        debug!("Built {} byte bundle for {}", bytes.len(), slug);

        Ok(Bundle {
            file_name: format!("{}-deploy-ready.zip", slug),
            bytes,
        })
    }

    fn platform_config(
        &self,
        config: &DeployConfig,
        slug: &str,
    ) -> Result<(&'static str, String), DeployError> {
        match config.platform {
            Platform::Vercel => Ok(("vercel.json", vercel_json()?)),
            Platform::Netlify => Ok(("netlify.toml", netlify_toml()?)),
            Platform::GithubPages => {
                let data = ReadmeData {
                    display_name: config.project_name.trim(),
                    slug,
                };
                let readme = self
                    .handlebars
                    .render_template(include_str!("./github_pages_readme.handlebars"), &data)
                    .map_err(|e| DeployError::Packaging(e.to_string()))?;
                Ok(("README.md", readme))
            }
        }
    }
}

pub fn build_package(artifact: &str, config: &DeployConfig) -> Result<Bundle, DeployError> {
    Packager::new().build(artifact, config)
}

#[derive(Serialize)]
struct ReadmeData<'a> {
    display_name: &'a str,
    slug: &'a str,
}

fn vercel_json() -> Result<String, DeployError> {
    let config = serde_json::json!({
        "version": 2,
        "cleanUrls": true,
        "rewrites": [
            { "source": "/(.*)", "destination": "/index.html" }
        ]
    });
    serde_json::to_string_pretty(&config).map_err(|e| DeployError::Packaging(e.to_string()))
}

#[derive(Serialize)]
struct NetlifyToml {
    build: NetlifyBuild,
    redirects: Vec<NetlifyRedirect>,
}

#[derive(Serialize)]
struct NetlifyBuild {
    publish: String,
    command: String,
}

#[derive(Serialize)]
struct NetlifyRedirect {
    from: String,
    to: String,
    status: u16,
}

fn netlify_toml() -> Result<String, DeployError> {
    let config = NetlifyToml {
        build: NetlifyBuild {
            publish: ".".to_owned(),
            command: String::new(),
        },
        redirects: vec![NetlifyRedirect {
            from: "/*".to_owned(),
            to: "/index.html".to_owned(),
            status: 200,
        }],
    };
    toml::to_string(&config).map_err(|e| DeployError::Packaging(e.to_string()))
}

fn package_manifest(slug: &str) -> Result<String, DeployError> {
    let manifest = serde_json::json!({
        "name": slug,
        "version": "1.0.0",
        "private": true,
        "scripts": {
            "dev": "npx serve .",
            "build": "echo \"No build step required\"",
            "start": "npx serve ."
        }
    });
    serde_json::to_string_pretty(&manifest).map_err(|e| DeployError::Packaging(e.to_string()))
}
