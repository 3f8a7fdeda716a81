use std::{collections::HashMap, error};

use figment::Figment;

use crate::{
    DeploymentManager, GithubPagesDeployer, InMemoryCredentialStore, NetlifyDeployer, PollPolicy,
    VercelDeployer,
};

#[derive(Debug)]
pub enum ConfigurationError {
    MissingConfigurationValue(String),
    Other(Box<dyn error::Error + Send + Sync>),
}

impl From<figment::Error> for ConfigurationError {
    fn from(error: figment::Error) -> Self {
        match error.kind {
            figment::error::Kind::MissingField(cow) => {
                Self::MissingConfigurationValue(cow.to_string())
            }
            _ => Self::Other(Box::new(error)),
        }
    }
}

const CREDENTIALS: &str = "credentials";

fn figment_default_values() -> Figment {
    VercelDeployer::figment_default_values()
        .join(NetlifyDeployer::figment_default_values())
        .join(GithubPagesDeployer::figment_default_values())
        .join(PollPolicy::figment_default_values())
}

pub fn manager(figment: &Figment) -> Result<DeploymentManager, ConfigurationError> {
    let figment = figment.clone().join(figment_default_values());
    let tokens: HashMap<String, String> = if figment.contains(CREDENTIALS) {
        figment.extract_inner(CREDENTIALS)?
    } else {
        HashMap::new()
    };
    debug!("Loaded {} stored credential(s)", tokens.len());

    let mut result = DeploymentManager::new(Box::new(InMemoryCredentialStore::new(tokens)));
    configure_default_deployers(&mut result, &figment)?;
    Ok(result)
}

fn configure_default_deployers(
    manager: &mut DeploymentManager,
    figment: &Figment,
) -> Result<(), ConfigurationError> {
    manager.register_deployer(VercelDeployer::configure(figment)?);
    manager.register_deployer(NetlifyDeployer::configure(figment)?);
    manager.register_deployer(GithubPagesDeployer::configure(figment)?);
    Ok(())
}
