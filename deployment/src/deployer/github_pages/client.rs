use reqwest::{
    header::{HeaderValue, ACCEPT},
    StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    helpers::{bearer_headers, read_json, rejected},
    Credential, DeployError,
};

const USER_AGENT: &str = concat!("skiff/", env!("CARGO_PKG_VERSION"));

pub struct GithubClient {
    base_url: String,
    api_client: reqwest::blocking::Client,
}

impl GithubClient {
    pub fn new(base_url: &str, credential: &Credential) -> Result<Self, DeployError> {
        let mut default_headers = bearer_headers(credential)?;
        default_headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let api_client = reqwest::blocking::Client::builder()
            .default_headers(default_headers)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(GithubClient {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_client,
        })
    }

    pub fn create_repository(&self, request: &CreateRepositoryBody) -> Result<Repository, DeployError> {
        let url = format!("{}/user/repos", self.base_url);
        let response = self.api_client.post(&url).json(request).send()?;
        read_json(response)
    }

    pub fn get_branch_ref(&self, repo: &RepoId, branch: &str) -> Result<GitRef, DeployError> {
        let url = format!("{}/git/ref/heads/{}", self.repo_url(repo), branch);
        let response = self.api_client.get(&url).send()?;
        read_json(response)
    }

    pub fn create_blob(&self, repo: &RepoId, request: &CreateBlobBody) -> Result<GitObject, DeployError> {
        let url = format!("{}/git/blobs", self.repo_url(repo));
        let response = self.api_client.post(&url).json(request).send()?;
        read_json(response)
    }

    pub fn create_tree(&self, repo: &RepoId, request: &CreateTreeBody) -> Result<GitObject, DeployError> {
        let url = format!("{}/git/trees", self.repo_url(repo));
        let response = self.api_client.post(&url).json(request).send()?;
        read_json(response)
    }

    pub fn create_commit(
        &self,
        repo: &RepoId,
        request: &CreateCommitBody,
    ) -> Result<GitObject, DeployError> {
        let url = format!("{}/git/commits", self.repo_url(repo));
        let response = self.api_client.post(&url).json(request).send()?;
        read_json(response)
    }

    pub fn update_branch_ref(
        &self,
        repo: &RepoId,
        branch: &str,
        request: &UpdateRefBody,
    ) -> Result<GitRef, DeployError> {
        let url = format!("{}/git/refs/heads/{}", self.repo_url(repo), branch);
        let response = self.api_client.patch(&url).json(request).send()?;
        read_json(response)
    }

    // `false` when Pages was already enabled.
    pub fn enable_pages(&self, repo: &RepoId, request: &EnablePagesBody) -> Result<bool, DeployError> {
        let url = format!("{}/pages", self.repo_url(repo));
        let response = self.api_client.post(&url).json(request).send()?;
        match response.status() {
            StatusCode::CONFLICT => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(rejected(response)),
        }
    }

    fn repo_url(&self, repo: &RepoId) -> String {
        format!("{}/repos/{}/{}", self.base_url, repo.owner, repo.name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateRepositoryBody {
    pub name: String,
    pub description: String,
    pub auto_init: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_: String,
    pub object: GitObject,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct CreateBlobBody {
    pub content: String,
    pub encoding: String,
}

#[derive(Debug, Serialize)]
pub struct CreateTreeBody {
    pub base_tree: String,
    pub tree: Vec<TreeEntry>,
}

#[derive(Debug, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCommitBody {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateRefBody {
    pub sha: String,
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct EnablePagesBody {
    pub source: PagesSource,
}

#[derive(Debug, Serialize)]
pub struct PagesSource {
    pub branch: String,
    pub path: String,
}

#[cfg(test)]
pub mod testhelpers {
    pub const REPOSITORY_RESPONSE: &str = r#"{
        "id": 1296269,
        "name": "my-cool-app",
        "full_name": "octocat/my-cool-app",
        "owner": {"login": "octocat", "id": 1},
        "private": false,
        "default_branch": "main"
    }"#;

    pub const MAIN_REF_RESPONSE: &str = r#"{
        "ref": "refs/heads/main",
        "node_id": "MDM6UmVmcmVmcy9oZWFkcy9mZWF0dXJlQQ==",
        "url": "https://api.github.com/repos/octocat/my-cool-app/git/refs/heads/main",
        "object": {"type": "commit", "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd"}
    }"#;

    pub const UPDATED_REF_RESPONSE: &str = r#"{
        "ref": "refs/heads/main",
        "object": {"type": "commit", "sha": "7638417db6d59f3c431d3e1f261cc637155684cd"}
    }"#;

    pub const BLOB_SHA: &str = "3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15";
    pub const TREE_SHA: &str = "cd8274d15fa3ae2ab983129fb037999f264ba9a7";
    pub const COMMIT_SHA: &str = "7638417db6d59f3c431d3e1f261cc637155684cd";

    pub fn object_response(sha: &str) -> String {
        format!(r#"{{"sha": "{}", "url": "https://api.github.com/x/{}"}}"#, sha, sha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn test_client(server: &ServerGuard) -> GithubClient {
        GithubClient::new(&server.url(), &Credential::new("gh_token")).unwrap()
    }

    fn repo() -> RepoId {
        RepoId {
            owner: "octocat".into(),
            name: "my-cool-app".into(),
        }
    }

    #[test]
    fn test_create_repository_sends_github_headers() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/user/repos")
            .match_header("Authorization", "Bearer gh_token")
            .match_header("Accept", "application/vnd.github+json")
            .match_header("User-Agent", Matcher::Regex("^skiff/".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "name": "my-cool-app",
                "auto_init": true
            })))
            .with_status(201)
            .with_body(testhelpers::REPOSITORY_RESPONSE)
            .create();

        let repository = test_client(&server)
            .create_repository(&CreateRepositoryBody {
                name: "my-cool-app".into(),
                description: "test".into(),
                auto_init: true,
            })
            .unwrap();
        assert_eq!(repository.owner.login, "octocat");
    }

    #[test]
    fn test_get_branch_ref() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/repos/octocat/my-cool-app/git/ref/heads/main")
            .with_status(200)
            .with_body(testhelpers::MAIN_REF_RESPONSE)
            .create();

        let git_ref = test_client(&server).get_branch_ref(&repo(), "main").unwrap();
        assert_eq!(git_ref.ref_, "refs/heads/main");
        assert_eq!(git_ref.object.sha, "aa218f56b14c9653891f9e74264a383fa43fefbd");
    }

    #[test]
    fn test_enable_pages_conflict_means_already_enabled() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/repos/octocat/my-cool-app/pages")
            .with_status(409)
            .with_body(r#"{"message": "GitHub Pages is already enabled."}"#)
            .create();

        let body = EnablePagesBody {
            source: PagesSource {
                branch: "main".into(),
                path: "/".into(),
            },
        };
        assert_eq!(test_client(&server).enable_pages(&repo(), &body), Ok(false));
    }

    #[test]
    fn test_enable_pages_failure_is_rejection() {
        let mut server = Server::new();
        let _m = server
            .mock("POST", "/repos/octocat/my-cool-app/pages")
            .with_status(422)
            .with_body(r#"{"message": "Pages are not available for private repositories"}"#)
            .create();

        let body = EnablePagesBody {
            source: PagesSource {
                branch: "main".into(),
                path: "/".into(),
            },
        };
        assert_eq!(
            test_client(&server).enable_pages(&repo(), &body),
            Err(DeployError::ProviderRejected(
                "Pages are not available for private repositories".into()
            ))
        );
    }
}
