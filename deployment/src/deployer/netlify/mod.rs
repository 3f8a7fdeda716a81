use client::{CreateSiteBody, NetlifyClient};
use figment::{providers::Serialized, Figment};

mod client;

use super::{
    poll::{poll, PollPolicy, PollStatus},
    Deployer, DeploymentHandle,
};
use crate::{
    config::ConfigurationError, helpers::zip_files, manager::RegisterDeployment, Credential,
    DeployConfig, DeployError, Platform, Slug,
};

pub struct NetlifyDeployer {
    api_url: String,
    poll_policy: PollPolicy,
}

impl NetlifyDeployer {
    pub fn new(api_url: impl Into<String>, poll_policy: PollPolicy) -> Self {
        NetlifyDeployer {
            api_url: api_url.into(),
            poll_policy,
        }
    }

    pub fn configure(figment: &Figment) -> Result<Self, ConfigurationError> {
        let api_url: String = figment.extract_inner("netlify.api_url")?;
        Ok(NetlifyDeployer::new(api_url, PollPolicy::configure(figment)?))
    }

    pub fn figment_default_values() -> Figment {
        Figment::from(Serialized::default(
            "netlify",
            serde_json::json!({
                "api_url": "https://api.netlify.com"
            }),
        ))
    }
}

impl Deployer for NetlifyDeployer {
    fn publish(
        &self,
        artifact: &str,
        slug: &Slug,
        _config: &DeployConfig,
        credential: &Credential,
        handle: &DeploymentHandle,
    ) -> Result<String, DeployError> {
        let client = NetlifyClient::new(&self.api_url, credential)?;

        handle.info("Creating Netlify site...");
        let site = client
            .create_site(&CreateSiteBody {
                name: slug.to_string(),
            })
            .inspect_err(|e| warn!("Netlify site creation for {} failed: {}", slug, e))?;
        info!("Created Netlify site {} ({})", site.name, site.id);

        handle.info("Packaging site...");
        let archive = zip_files(&[("index.html", artifact.as_bytes())])
            .map_err(|e| DeployError::Packaging(format!("{:#}", e)))?;

        handle.info("Uploading site archive...");
        let deploy = client.create_deploy(&site.id, archive)?;
        debug!("Created Netlify deploy {} in state {}", deploy.id, deploy.state);

        let mut last_state: Option<String> = None;
        poll(&self.poll_policy, |attempt| {
            let current = client.get_deploy(&site.id, &deploy.id)?;
            debug!(
                "Netlify deploy {} is {} (check {})",
                current.id, current.state, attempt
            );
            if last_state.as_deref() != Some(current.state.as_str()) {
                match current.state.as_str() {
                    "uploading" => handle.info("Uploading files..."),
                    "building" => handle.info("Building site..."),
                    _ => {}
                }
                last_state = Some(current.state.clone());
            }

            Ok(match current.state.as_str() {
                "ready" => match current.ssl_url.or(current.url) {
                    Some(url) => PollStatus::Ready(url),
                    None => PollStatus::Ready(
                        site.ssl_url
                            .clone()
                            .or_else(|| site.url.clone())
                            .unwrap_or_else(|| format!("https://{}.netlify.app", site.name)),
                    ),
                },
                "error" => PollStatus::Failed(
                    current
                        .error_message
                        .unwrap_or_else(|| "Netlify reported a deploy error".to_owned()),
                ),
                _ => PollStatus::Pending,
            })
        })
    }
}

impl RegisterDeployment for NetlifyDeployer {
    fn platform() -> Platform {
        Platform::Netlify
    }
}
