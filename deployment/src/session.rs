use std::{fmt, panic, sync::Arc, thread};

use thiserror::Error;

use crate::{
    build_package, deployer::deployment_handle, Bundle, DeployError, DeployRequest,
    DeploymentManager, DeploymentOutcome, ProgressEvent, Slug,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Config,
    Deploying,
    Success { url: String },
    NameConflict { existing_name: Slug, suggested_name: Slug },
    Error { error: DeployError },
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Config => "config",
            SessionState::Deploying => "deploying",
            SessionState::Success { .. } => "success",
            SessionState::NameConflict { .. } => "name_conflict",
            SessionState::Error { .. } => "error",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {action} while the session is in the {state} state")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("Nothing to package yet, start a deployment first")]
    NothingToPackage,
    #[error(transparent)]
    Package(#[from] DeployError),
}

pub struct DeploymentSession {
    manager: Arc<DeploymentManager>,
    state: SessionState,
    request: Option<DeployRequest>,
    log: Vec<ProgressEvent>,
    observer: Option<Box<dyn FnMut(&ProgressEvent)>>,
}

impl DeploymentSession {
    pub fn new(manager: Arc<DeploymentManager>) -> Self {
        DeploymentSession {
            manager,
            state: SessionState::Config,
            request: None,
            log: Vec::new(),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: impl FnMut(&ProgressEvent) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn log(&self) -> &[ProgressEvent] {
        &self.log
    }

    pub fn last_request(&self) -> Option<&DeployRequest> {
        self.request.as_ref()
    }

    pub fn start(&mut self, request: DeployRequest) -> Result<&SessionState, SessionError> {
        if self.state != SessionState::Config {
            return Err(self.invalid("start a deployment"));
        }
        self.run_attempt(request);
        Ok(&self.state)
    }

    pub fn retry_with_name(&mut self, project_name: &str) -> Result<&SessionState, SessionError> {
        let request = match (&self.state, &self.request) {
            (SessionState::NameConflict { .. }, Some(request)) => DeployRequest {
                config: request.config.with_project_name(project_name),
                ..request.clone()
            },
            _ => return Err(self.invalid("retry with a new name")),
        };
        self.run_attempt(request);
        Ok(&self.state)
    }

    pub fn accept_suggestion(&mut self) -> Result<&SessionState, SessionError> {
        let name = match &self.state {
            SessionState::NameConflict { suggested_name, .. } => suggested_name.to_string(),
            _ => return Err(self.invalid("accept the suggested name")),
        };
        self.retry_with_name(&name)
    }

    pub fn reset(&mut self) -> Result<&SessionState, SessionError> {
        if self.state == SessionState::Deploying {
            return Err(self.invalid("reset"));
        }
        self.state = SessionState::Config;
        Ok(&self.state)
    }

    pub fn package(&self) -> Result<Bundle, SessionError> {
        let request = self.request.as_ref().ok_or(SessionError::NothingToPackage)?;
        Ok(build_package(&request.artifact, &request.config)?)
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    fn run_attempt(&mut self, request: DeployRequest) {
        self.log.clear();
        self.state = SessionState::Deploying;
        self.request = Some(request.clone());
        info!("Starting deployment of {:?}", request.config);

        let (handle, logs) = deployment_handle();
        let manager = &self.manager;
        let log = &mut self.log;
        let observer = &mut self.observer;

        let outcome = thread::scope(|s| {
            let worker = s.spawn(move || manager.run(&request, &handle));
            for event in logs {
                if let Some(observer) = observer.as_mut() {
                    observer(&event);
                }
                log.push(event);
            }
            match worker.join() {
                Ok(outcome) => outcome,
                Err(e) => panic::resume_unwind(e),
            }
        });

        self.state = match outcome {
            DeploymentOutcome::Success { url } => SessionState::Success { url },
            DeploymentOutcome::NameConflict {
                existing_name,
                suggested_name,
            } => SessionState::NameConflict {
                existing_name,
                suggested_name,
            },
            DeploymentOutcome::Failed(error) => SessionState::Error { error },
        };
    }
}
