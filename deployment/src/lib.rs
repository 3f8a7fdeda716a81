#[macro_use]
extern crate log;

mod credentials;
mod deployer;
mod error;
mod helpers;
mod manager;
mod manifest;
mod package;
mod session;
mod slug;

pub mod config;

pub use credentials::{Credential, CredentialResolver, CredentialStore, InMemoryCredentialStore};
pub use deployer::deployment_handle;
pub use deployer::Deployer;
pub use deployer::{DeploymentHandle, DeploymentLogs, ProgressEvent, ProgressLevel};
pub use deployer::{GithubPagesDeployer, NetlifyDeployer, PollPolicy, VercelDeployer};
pub use error::{DeployError, ErrorKind};
pub use helpers::{decode_base64_utf8, encode_base64_utf8};
pub use manager::{
    wait_for_outcome, DeploymentAttempt, DeploymentManager, DeploymentOutcome, RegisterDeployment,
};
pub use manifest::{DeployConfig, DeployRequest, Platform, UnknownPlatform};
pub use package::{build_package, Bundle, Packager};
pub use session::{DeploymentSession, SessionError, SessionState};
pub use slug::{sanitize, suggest_name, Slug, MAX_SLUG_LENGTH};
