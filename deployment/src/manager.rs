use std::{
    collections::HashMap,
    sync::{
        mpsc::{channel, Receiver},
        Arc,
    },
    thread,
};

use crate::{
    deployer::{deployment_handle, DeploymentHandle, DeploymentLogs},
    sanitize, suggest_name, Credential, CredentialResolver, CredentialStore, DeployError,
    DeployRequest, Deployer, Platform, Slug,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeploymentOutcome {
    Success { url: String },
    NameConflict { existing_name: Slug, suggested_name: Slug },
    Failed(DeployError),
}

pub struct DeploymentManager {
    deployers: HashMap<Platform, Arc<dyn Deployer + Send + Sync>>,
    credentials: CredentialResolver,
}

pub struct DeploymentAttempt {
    logs: DeploymentLogs,
    outcome: Receiver<DeploymentOutcome>,
}

impl DeploymentAttempt {
    pub fn logs(&mut self) -> &mut DeploymentLogs {
        &mut self.logs
    }

    pub fn into_parts(self) -> (DeploymentLogs, Receiver<DeploymentOutcome>) {
        (self.logs, self.outcome)
    }

    pub fn wait(self) -> DeploymentOutcome {
        wait_for_outcome(&self.outcome)
    }
}

pub fn wait_for_outcome(outcome: &Receiver<DeploymentOutcome>) -> DeploymentOutcome {
    outcome.recv().unwrap_or_else(|_| {
        error!("Deployment worker exited without reporting an outcome, it most likely panicked");
        DeploymentOutcome::Failed(DeployError::Interrupted(
            "the deployment worker exited before reporting an outcome".to_owned(),
        ))
    })
}

struct PreparedAttempt {
    slug: Slug,
    deployer: Arc<dyn Deployer + Send + Sync>,
    credential: Credential,
}

impl PreparedAttempt {
    fn publish(&self, request: &DeployRequest, handle: &DeploymentHandle) -> Result<String, DeployError> {
        handle.info(format!(
            "Deploying {} to {}...",
            self.slug,
            request.config.platform.display_name()
        ));
        self.deployer.publish(
            &request.artifact,
            &self.slug,
            &request.config,
            &self.credential,
            handle,
        )
    }
}

impl DeploymentManager {
    pub fn new(credential_store: Box<dyn CredentialStore + Send + Sync>) -> DeploymentManager {
        DeploymentManager {
            deployers: HashMap::new(),
            credentials: CredentialResolver::new(credential_store),
        }
    }

    pub fn run(&self, request: &DeployRequest, handle: &DeploymentHandle) -> DeploymentOutcome {
        let result = self
            .prepare(request)
            .and_then(|prepared| prepared.publish(request, handle));
        conclude(result, handle)
    }

    // Not cancellable once provider calls are under way.
    pub fn deploy(&self, request: DeployRequest) -> DeploymentAttempt {
        let (handle, logs) = deployment_handle();
        let (sender, outcome) = channel();

        match self.prepare(&request) {
            Ok(prepared) => {
                thread::spawn(move || {
                    let result = prepared.publish(&request, &handle);
                    sender.send(conclude(result, &handle)).ok();
                });
            }
            Err(e) => {
                sender.send(conclude(Err(e), &handle)).ok();
            }
        }
        DeploymentAttempt { logs, outcome }
    }

    pub fn register_deployer<D: RegisterDeployment + Send + Sync + 'static>(
        &mut self,
        deployer: D,
    ) {
        self.insert_deployer(D::platform(), Arc::new(deployer));
    }

    pub fn insert_deployer(&mut self, platform: Platform, deployer: Arc<dyn Deployer + Send + Sync>) {
        self.deployers.insert(platform, deployer);
    }

    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.deployers.contains_key(p))
            .collect()
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    fn prepare(&self, request: &DeployRequest) -> Result<PreparedAttempt, DeployError> {
        let platform = request.config.platform;
        let slug = sanitize(&request.config.project_name)?;
        let deployer = self
            .deployers
            .get(&platform)
            .ok_or(DeployError::UnsupportedPlatform(platform))?
            .clone();

        let credential = match &request.token {
            Some(token) if !token.trim().is_empty() => Credential::new(token.trim()),
            _ => self
                .credentials
                .get_token(platform)
                .ok_or(DeployError::CredentialMissing { platform })?,
        };

        Ok(PreparedAttempt {
            slug,
            deployer,
            credential,
        })
    }
}

fn conclude(result: Result<String, DeployError>, handle: &DeploymentHandle) -> DeploymentOutcome {
    match result {
        Ok(url) => {
            info!("Deployment succeeded: {}", url);
            handle.info(format!("Deployment ready: {}", url));
            DeploymentOutcome::Success { url }
        }
        Err(DeployError::NameConflict(name)) => match sanitize(&name) {
            Ok(existing_name) => {
                let suggested_name = suggest_name(&existing_name);
                info!("Name {} is taken, suggesting {}", existing_name, suggested_name);
                handle.error(format!("A project named {} already exists", existing_name));
                handle.info(format!("Try {} instead", suggested_name));
                DeploymentOutcome::NameConflict {
                    existing_name,
                    suggested_name,
                }
            }
            Err(e) => conclude(Err(e), handle),
        },
        Err(e) => {
            error!("Deployment failed: {}", e);
            handle.error(format!("Deployment failed: {}", e));
            DeploymentOutcome::Failed(e)
        }
    }
}

pub trait RegisterDeployment: Deployer {
    fn platform() -> Platform;
}
