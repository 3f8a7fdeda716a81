pub(crate) mod handle;
pub use handle::deployment_handle;
pub use handle::{DeploymentHandle, DeploymentLogs, ProgressEvent, ProgressLevel};

#[cfg(test)]
use mockall::automock;

use crate::{Credential, DeployConfig, DeployError, Slug};

mod github_pages;
mod netlify;
pub(crate) mod poll;
mod vercel;

pub use github_pages::GithubPagesDeployer;
pub use netlify::NetlifyDeployer;
pub use poll::PollPolicy;
pub use vercel::VercelDeployer;

/// Returns the public URL of the site. A failure ends the attempt.
#[cfg_attr(test, automock)]
pub trait Deployer {
    fn publish(
        &self,
        artifact: &str,
        slug: &Slug,
        config: &DeployConfig,
        credential: &Credential,
        handle: &DeploymentHandle,
    ) -> Result<String, DeployError>;
}
