use client::{
    CreateDeploymentBody, CreateProjectBody, InlineFile, ReadyState, VercelClient,
};
use figment::{providers::Serialized, Figment};

mod client;

use super::{
    poll::{poll, PollPolicy, PollStatus},
    Deployer, DeploymentHandle,
};
use crate::{
    config::ConfigurationError, helpers::encode_base64_utf8, manager::RegisterDeployment,
    Credential, DeployConfig, DeployError, Platform, Slug,
};

pub struct VercelDeployer {
    api_url: String,
    poll_policy: PollPolicy,
}

impl VercelDeployer {
    pub fn new(api_url: impl Into<String>, poll_policy: PollPolicy) -> Self {
        VercelDeployer {
            api_url: api_url.into(),
            poll_policy,
        }
    }

    pub fn configure(figment: &Figment) -> Result<Self, ConfigurationError> {
        let api_url: String = figment.extract_inner("vercel.api_url")?;
        Ok(VercelDeployer::new(api_url, PollPolicy::configure(figment)?))
    }

    pub fn figment_default_values() -> Figment {
        Figment::from(Serialized::default(
            "vercel",
            serde_json::json!({
                "api_url": "https://api.vercel.com"
            }),
        ))
    }
}

impl Deployer for VercelDeployer {
    fn publish(
        &self,
        artifact: &str,
        slug: &Slug,
        config: &DeployConfig,
        credential: &Credential,
        handle: &DeploymentHandle,
    ) -> Result<String, DeployError> {
        let client = VercelClient::new(&self.api_url, credential)?;

        handle.info("Creating Vercel project...");
        let project = client
            .create_project(&CreateProjectBody {
                name: slug.to_string(),
                framework: config.framework.clone(),
            })
            .inspect_err(|e| warn!("Vercel project creation for {} failed: {}", slug, e))?;
        info!("Created Vercel project {} ({})", project.name, project.id);

        handle.info("Uploading index.html...");
        let deployment = client.create_deployment(&CreateDeploymentBody {
            name: slug.to_string(),
            project: project.id,
            target: "production".to_owned(),
            files: vec![InlineFile {
                file: "index.html".to_owned(),
                data: encode_base64_utf8(artifact),
                encoding: "base64".to_owned(),
            }],
        })?;
        debug!("Created Vercel deployment {}", deployment.id);

        let mut last_state = None;
        poll(&self.poll_policy, |attempt| {
            let current = client.get_deployment(&deployment.id)?;
            debug!(
                "Vercel deployment {} is {:?} (check {})",
                current.id, current.ready_state, attempt
            );
            if last_state != Some(current.ready_state) {
                match current.ready_state {
                    ReadyState::Queued => handle.info("Deployment queued..."),
                    ReadyState::Building => handle.info("Building project..."),
                    _ => {}
                }
                last_state = Some(current.ready_state);
            }

            Ok(match current.ready_state {
                ReadyState::Ready => PollStatus::Ready(format!("https://{}", current.url)),
                ReadyState::Error => PollStatus::Failed(
                    current
                        .error_message
                        .unwrap_or_else(|| "Vercel reported a build error".to_owned()),
                ),
                ReadyState::Canceled => {
                    PollStatus::Failed("The deployment was canceled on Vercel".to_owned())
                }
                ReadyState::Initializing
                | ReadyState::Queued
                | ReadyState::Building
                | ReadyState::Unknown => PollStatus::Pending,
            })
        })
    }
}

impl RegisterDeployment for VercelDeployer {
    fn platform() -> Platform {
        Platform::Vercel
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::{Matcher, Server, ServerGuard};

    use super::client::testhelpers::{deployment_response, PROJECT_RESPONSE};
    use super::*;
    use crate::{deployer::handle::deployment_handle, sanitize};

    fn test_deployer(server: &ServerGuard) -> VercelDeployer {
        VercelDeployer::new(
            server.url(),
            PollPolicy {
                interval: Duration::from_millis(1),
                max_attempts: 30,
            },
        )
    }

    fn publish(server: &ServerGuard, name: &str) -> (Result<String, DeployError>, Vec<String>) {
        let (handle, mut logs) = deployment_handle();
        let config = DeployConfig::new(Platform::Vercel, name);
        let result = test_deployer(server).publish(
            "<h1>Hi ✨</h1>",
            &sanitize(name).unwrap(),
            &config,
            &Credential::new("vc_token"),
            &handle,
        );
        drop(handle);
        let lines = logs.drain().into_iter().map(|e| e.message).collect();
        (result, lines)
    }

    fn mock_project(server: &mut ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/v9/projects")
            .match_body(Matcher::PartialJson(serde_json::json!({"name": "my-cool-app"})))
            .with_status(201)
            .with_body(PROJECT_RESPONSE)
            .create()
    }

    fn mock_status(server: &mut ServerGuard, state: &str, hits: usize) -> mockito::Mock {
        server
            .mock("GET", "/v13/deployments/dpl_89qyp1cskzkLrVicDaZoDbjyHuDJ")
            .with_status(200)
            .with_body(deployment_response(state))
            .expect(hits)
            .create()
    }

    #[test]
    fn test_queued_building_ready_succeeds() {
        let mut server = Server::new();
        let _project = mock_project(&mut server);
        let deploy = server
            .mock("POST", "/v13/deployments")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "project": "prj_12HKQaOmR5t5Uy6vdcQsNIiZgHGB",
                "files": [{
                    "file": "index.html",
                    "data": encode_base64_utf8("<h1>Hi ✨</h1>"),
                    "encoding": "base64"
                }]
            })))
            .with_status(200)
            .with_body(deployment_response("QUEUED"))
            .create();
        let queued = mock_status(&mut server, "QUEUED", 1);
        let building = mock_status(&mut server, "BUILDING", 2);
        let ready = mock_status(&mut server, "READY", 1);

        let (result, lines) = publish(&server, "My Cool App!!");

        assert_eq!(result, Ok("https://my-cool-app-xyz.vercel.app".to_owned()));
        deploy.assert();
        queued.assert();
        building.assert();
        ready.assert();
        assert_eq!(
            lines,
            vec![
                "Creating Vercel project...",
                "Uploading index.html...",
                "Deployment queued...",
                "Building project...",
            ]
        );
    }

    #[test]
    fn test_conflict_is_not_retried() {
        let mut server = Server::new();
        let create = server
            .mock("POST", "/v9/projects")
            .with_status(409)
            .with_body(super::client::testhelpers::CONFLICT_RESPONSE)
            .expect(1)
            .create();
        let deploy = server.mock("POST", "/v13/deployments").expect(0).create();

        let (result, _) = publish(&server, "My Cool App!!");

        assert_eq!(result, Err(DeployError::NameConflict("my-cool-app".into())));
        create.assert();
        deploy.assert();
    }

    #[test]
    fn test_error_state_is_build_failure() {
        let mut server = Server::new();
        let _project = mock_project(&mut server);
        let _deploy = server
            .mock("POST", "/v13/deployments")
            .with_status(200)
            .with_body(deployment_response("QUEUED"))
            .create();
        let _error = mock_status(&mut server, "ERROR", 1);

        let (result, _) = publish(&server, "my-cool-app");
        assert!(matches!(result, Err(DeployError::BuildFailed(_))));
    }

    #[test]
    fn test_never_ready_times_out() {
        let mut server = Server::new();
        let _project = mock_project(&mut server);
        let _deploy = server
            .mock("POST", "/v13/deployments")
            .with_status(200)
            .with_body(deployment_response("QUEUED"))
            .create();
        let building = mock_status(&mut server, "BUILDING", 30);

        let (result, lines) = publish(&server, "my-cool-app");

        assert_eq!(result, Err(DeployError::Timeout { attempts: 30 }));
        building.assert();
        assert_eq!(lines.iter().filter(|l| *l == "Building project...").count(), 1);
    }

    #[test]
    fn test_unrecognised_state_keeps_polling() {
        let mut server = Server::new();
        let _project = mock_project(&mut server);
        let _deploy = server
            .mock("POST", "/v13/deployments")
            .with_status(200)
            .with_body(deployment_response("QUEUED"))
            .create();
        let unknown = mock_status(&mut server, "DELETED", 30);

        let (result, lines) = publish(&server, "my-cool-app");

        assert_eq!(result, Err(DeployError::Timeout { attempts: 30 }));
        unknown.assert();
        assert!(!lines.iter().any(|l| l.starts_with("Building")));
    }
}
