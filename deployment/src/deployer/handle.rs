use std::{
    fmt,
    sync::mpsc::{channel, Receiver, Sender},
};

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub level: ProgressLevel,
    pub message: String,
}

impl ProgressEvent {
    pub fn info(message: impl Into<String>) -> Self {
        ProgressEvent {
            level: ProgressLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ProgressEvent {
            level: ProgressLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            ProgressLevel::Info => write!(f, "[info] {}", self.message),
            ProgressLevel::Error => write!(f, "[error] {}", self.message),
        }
    }
}

#[derive(Clone)]
pub struct DeploymentHandle {
    sender: Sender<ProgressEvent>,
}

impl DeploymentHandle {
    pub fn info(&self, message: impl Into<String>) {
        self.send(ProgressEvent::info(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(ProgressEvent::error(message));
    }

    pub fn send(&self, event: ProgressEvent) {
        self.sender.send(event).ok();
    }
}

pub struct DeploymentLogs {
    receiver: Receiver<ProgressEvent>,
}

impl DeploymentLogs {
    pub fn drain(&mut self) -> Vec<ProgressEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Iterator for DeploymentLogs {
    type Item = ProgressEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

pub fn deployment_handle() -> (DeploymentHandle, DeploymentLogs) {
    let (sender, receiver) = channel();
    (DeploymentHandle { sender }, DeploymentLogs { receiver })
}
