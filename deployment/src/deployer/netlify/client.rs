use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::{
    helpers::{bearer_headers, read_json},
    Credential, DeployError,
};

pub struct NetlifyClient {
    base_url: String,
    api_client: reqwest::blocking::Client,
}

impl NetlifyClient {
    pub fn new(base_url: &str, credential: &Credential) -> Result<Self, DeployError> {
        let api_client = reqwest::blocking::Client::builder()
            .default_headers(bearer_headers(credential)?)
            .build()?;

        Ok(NetlifyClient {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_client,
        })
    }

    pub fn create_site(&self, request: &CreateSiteBody) -> Result<NetlifySite, DeployError> {
        let url = format!("{}/api/v1/sites", self.base_url);
        let response = self.api_client.post(&url).json(request).send()?;
        read_json(response)
    }

    pub fn create_deploy(
        &self,
        site_id: &str,
        archive: Vec<u8>,
    ) -> Result<NetlifyDeploy, DeployError> {
        let url = format!("{}/api/v1/sites/{}/deploys", self.base_url, site_id);
        let part = Part::bytes(archive)
            .file_name("site.zip")
            .mime_str("application/zip")?;
        let form = Form::new().part("file", part);
        let response = self.api_client.post(&url).multipart(form).send()?;
        read_json(response)
    }

    pub fn get_deploy(&self, site_id: &str, deploy_id: &str) -> Result<NetlifyDeploy, DeployError> {
        let url = format!(
            "{}/api/v1/sites/{}/deploys/{}",
            self.base_url, site_id, deploy_id
        );
        let response = self.api_client.get(&url).send()?;
        read_json(response)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateSiteBody {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NetlifySite {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub ssl_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NetlifyDeploy {
    pub id: String,
    pub state: String,
    pub url: Option<String>,
    pub ssl_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[cfg(test)]
pub mod testhelpers {
    pub const SITE_RESPONSE: &str = r#"{
        "id": "3970e0fe-8564-4903-9a55-c5f8de49fb8b",
        "name": "my-cool-app",
        "url": "http://my-cool-app.netlify.app",
        "ssl_url": "https://my-cool-app.netlify.app",
        "admin_url": "https://app.netlify.com/sites/my-cool-app"
    }"#;

    pub fn deploy_response(state: &str) -> String {
        format!(
            r#"{{
                "id": "64f1c0ffee",
                "site_id": "3970e0fe-8564-4903-9a55-c5f8de49fb8b",
                "state": "{}",
                "name": "my-cool-app",
                "url": "http://my-cool-app.netlify.app",
                "ssl_url": "https://my-cool-app.netlify.app",
                "error_message": null
            }}"#,
            state
        )
    }
}
