use serde::Serialize;
use thiserror::Error;

use crate::Platform;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeployError {
    #[error("No API token stored for {platform}. Add a token before deploying.")]
    CredentialMissing { platform: Platform },
    #[error("API token contains characters that are not allowed in an HTTP header")]
    InvalidCredential,
    #[error("Project name {0:?} does not contain any usable characters")]
    InvalidName(String),
    #[error("A project named {0} already exists")]
    NameConflict(String),
    #[error("{0}")]
    ProviderRejected(String),
    #[error("Build failed: {0}")]
    BuildFailed(String),
    #[error("Deployment did not finish after {attempts} status checks")]
    Timeout { attempts: u32 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("No deployer registered for {0}")]
    UnsupportedPlatform(Platform),
    #[error("Could not build deployment bundle: {0}")]
    Packaging(String),
    #[error("Deployment stopped unexpectedly: {0}")]
    Interrupted(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CredentialMissing,
    InvalidCredential,
    InvalidName,
    NameConflict,
    ProviderRejected,
    BuildFailed,
    Timeout,
    NetworkError,
    UnsupportedPlatform,
    PackagingFailed,
    Interrupted,
}

impl DeployError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeployError::CredentialMissing { .. } => ErrorKind::CredentialMissing,
            DeployError::InvalidCredential => ErrorKind::InvalidCredential,
            DeployError::InvalidName(_) => ErrorKind::InvalidName,
            DeployError::NameConflict(_) => ErrorKind::NameConflict,
            DeployError::ProviderRejected(_) => ErrorKind::ProviderRejected,
            DeployError::BuildFailed(_) => ErrorKind::BuildFailed,
            DeployError::Timeout { .. } => ErrorKind::Timeout,
            DeployError::Network(_) => ErrorKind::NetworkError,
            DeployError::UnsupportedPlatform(_) => ErrorKind::UnsupportedPlatform,
            DeployError::Packaging(_) => ErrorKind::PackagingFailed,
            DeployError::Interrupted(_) => ErrorKind::Interrupted,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DeployError::CredentialMissing { .. }
                | DeployError::InvalidCredential
                | DeployError::InvalidName(_)
                | DeployError::NameConflict(_)
        )
    }
}

impl From<reqwest::Error> for DeployError {
    fn from(error: reqwest::Error) -> Self {
        DeployError::Network(error.to_string())
    }
}
