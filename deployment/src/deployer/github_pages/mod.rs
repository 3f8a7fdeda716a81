use client::{
    CreateBlobBody, CreateCommitBody, CreateRepositoryBody, CreateTreeBody, EnablePagesBody,
    GithubClient, PagesSource, RepoId, TreeEntry, UpdateRefBody,
};
use figment::{providers::Serialized, Figment};
use serde::Deserialize;

mod client;

use super::{Deployer, DeploymentHandle};
use crate::{
    config::ConfigurationError, helpers::encode_base64_utf8, manager::RegisterDeployment,
    Credential, DeployConfig, DeployError, Platform, Slug,
};

const BRANCH: &str = "main";

pub struct GithubPagesDeployer {
    api_url: String,
    commit_message: String,
}

#[derive(Deserialize)]
struct GithubPagesConfig {
    api_url: String,
    commit_message: String,
}

impl GithubPagesDeployer {
    pub fn new(api_url: impl Into<String>, commit_message: impl Into<String>) -> Self {
        GithubPagesDeployer {
            api_url: api_url.into(),
            commit_message: commit_message.into(),
        }
    }

    pub fn configure(figment: &Figment) -> Result<Self, ConfigurationError> {
        let config: GithubPagesConfig = figment.extract_inner("github_pages")?;
        Ok(GithubPagesDeployer::new(config.api_url, config.commit_message))
    }

    pub fn figment_default_values() -> Figment {
        Figment::from(Serialized::default(
            "github_pages",
            serde_json::json!({
                "api_url": "https://api.github.com",
                "commit_message": "Deploy index.html"
            }),
        ))
    }
}

impl Deployer for GithubPagesDeployer {
    fn publish(
        &self,
        artifact: &str,
        slug: &Slug,
        config: &DeployConfig,
        credential: &Credential,
        handle: &DeploymentHandle,
    ) -> Result<String, DeployError> {
        let client = GithubClient::new(&self.api_url, credential)?;

        handle.info("Creating GitHub repository...");
        let repository = client
            .create_repository(&CreateRepositoryBody {
                name: slug.to_string(),
                description: format!("{} (deployed with skiff)", config.project_name),
                auto_init: true,
            })
            .inspect_err(|e| warn!("GitHub repository creation for {} failed: {}", slug, e))?;
        let repo = RepoId {
            owner: repository.owner.login,
            name: repository.name,
        };
        info!("Created GitHub repository {}/{}", repo.owner, repo.name);

        let base = client.get_branch_ref(&repo, BRANCH)?;
        let base_sha = base.object.sha;
        debug!("{} of {}/{} is at {}", base.ref_, repo.owner, repo.name, base_sha);

        handle.info("Uploading index.html...");
        let blob = client.create_blob(
            &repo,
            &CreateBlobBody {
                content: encode_base64_utf8(artifact),
                encoding: "base64".to_owned(),
            },
        )?;

        handle.info("Creating commit...");
        let tree = client.create_tree(
            &repo,
            &CreateTreeBody {
                base_tree: base_sha.clone(),
                tree: vec![TreeEntry {
                    path: "index.html".to_owned(),
                    mode: "100644".to_owned(),
                    type_: "blob".to_owned(),
                    sha: blob.sha,
                }],
            },
        )?;
        let commit = client.create_commit(
            &repo,
            &CreateCommitBody {
                message: self.commit_message.clone(),
                tree: tree.sha,
                parents: vec![base_sha],
            },
        )?;

        handle.info(format!("Updating {} branch...", BRANCH));
        client.update_branch_ref(
            &repo,
            BRANCH,
            &UpdateRefBody {
                sha: commit.sha,
                force: false,
            },
        )?;

        handle.info("Enabling GitHub Pages...");
        let newly_enabled = client.enable_pages(
            &repo,
            &EnablePagesBody {
                source: PagesSource {
                    branch: BRANCH.to_owned(),
                    path: "/".to_owned(),
                },
            },
        )?;
        if !newly_enabled {
            handle.info("GitHub Pages was already enabled");
        }

        Ok(format!(
            "https://{}.github.io/{}/",
            repo.owner.to_lowercase(),
            repo.name
        ))
    }
}

impl RegisterDeployment for GithubPagesDeployer {
    fn platform() -> Platform {
        Platform::GithubPages
    }
}
