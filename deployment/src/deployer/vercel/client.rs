use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    helpers::{bearer_headers, read_json},
    Credential, DeployError,
};

pub struct VercelClient {
    base_url: String,
    api_client: reqwest::blocking::Client,
}

impl VercelClient {
    pub fn new(base_url: &str, credential: &Credential) -> Result<Self, DeployError> {
        let api_client = reqwest::blocking::Client::builder()
            .default_headers(bearer_headers(credential)?)
            .build()?;

        Ok(VercelClient {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_client,
        })
    }

    pub fn create_project(&self, request: &CreateProjectBody) -> Result<VercelProject, DeployError> {
        let url = format!("{}/v9/projects", self.base_url);
        let response = self.api_client.post(&url).json(request).send()?;
        if response.status() == StatusCode::CONFLICT {
            return Err(DeployError::NameConflict(request.name.clone()));
        }
        read_json(response)
    }

    pub fn create_deployment(
        &self,
        request: &CreateDeploymentBody,
    ) -> Result<VercelDeployment, DeployError> {
        let url = format!("{}/v13/deployments", self.base_url);
        let response = self.api_client.post(&url).json(request).send()?;
        read_json(response)
    }

    pub fn get_deployment(&self, id: &str) -> Result<VercelDeployment, DeployError> {
        let url = format!("{}/v13/deployments/{}", self.base_url, id);
        let response = self.api_client.get(&url).send()?;
        read_json(response)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateProjectBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VercelProject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateDeploymentBody {
    pub name: String,
    pub project: String,
    pub target: String,
    pub files: Vec<InlineFile>,
}

#[derive(Debug, Serialize)]
pub struct InlineFile {
    // Vercel's inline file entries name the path `file`, not `path`.
    pub file: String,
    pub data: String,
    pub encoding: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadyState {
    Initializing,
    Queued,
    Building,
    Ready,
    Error,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelDeployment {
    pub id: String,
    pub url: String,
    pub ready_state: ReadyState,
    #[serde(default)]
    pub error_message: Option<String>,
}
