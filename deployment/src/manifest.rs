use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Vercel,
    Netlify,
    GithubPages,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Vercel, Platform::Netlify, Platform::GithubPages];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Vercel => "vercel",
            Platform::Netlify => "netlify",
            Platform::GithubPages => "github-pages",
        }
    }

    pub fn credential_namespace(&self) -> &'static str {
        match self {
            Platform::Vercel => "vercel",
            Platform::Netlify => "netlify",
            Platform::GithubPages => "github",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Vercel => "Vercel",
            Platform::Netlify => "Netlify",
            Platform::GithubPages => "GitHub Pages",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown platform {:?}", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeployConfig {
    pub platform: Platform,
    pub project_name: String,
    #[serde(default)]
    pub framework: Option<String>,
}

impl DeployConfig {
    pub fn new(platform: Platform, project_name: impl Into<String>) -> Self {
        DeployConfig {
            platform,
            project_name: project_name.into(),
            framework: None,
        }
    }

    pub fn with_project_name(&self, project_name: impl Into<String>) -> Self {
        DeployConfig {
            project_name: project_name.into(),
            ..self.clone()
        }
    }
}

#[derive(Clone)]
pub struct DeployRequest {
    pub config: DeployConfig,
    pub artifact: String,
    /// Overrides the stored credential for this attempt only.
    pub token: Option<String>,
}

impl DeployRequest {
    pub fn new(config: DeployConfig, artifact: impl Into<String>) -> Self {
        DeployRequest {
            config,
            artifact: artifact.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl fmt::Debug for DeployRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployRequest")
            .field("config", &self.config)
            .field("artifact_len", &self.artifact.len())
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}
