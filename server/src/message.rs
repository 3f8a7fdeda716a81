use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
    thread,
};

use rocket::{
    http::ContentType,
    response::Responder,
    serde::Serialize,
    tokio::{
        io::{AsyncRead, ReadBuf},
        sync::mpsc::{unbounded_channel, UnboundedReceiver},
    },
    Response,
};
use skiff_deployment::{wait_for_outcome, DeploymentAttempt, DeploymentOutcome, ErrorKind};

pub const OUTCOME_PREFIX: &str = "outcome: ";

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    NameConflict,
    Error,
}

/// Last line of every deployment stream.
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct OutcomeMessage {
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&DeploymentOutcome> for OutcomeMessage {
    fn from(outcome: &DeploymentOutcome) -> Self {
        let empty = OutcomeMessage {
            status: OutcomeStatus::Error,
            url: None,
            existing_name: None,
            suggested_name: None,
            kind: None,
            message: None,
        };
        match outcome {
            DeploymentOutcome::Success { url } => OutcomeMessage {
                status: OutcomeStatus::Success,
                url: Some(url.clone()),
                ..empty
            },
            DeploymentOutcome::NameConflict {
                existing_name,
                suggested_name,
            } => OutcomeMessage {
                status: OutcomeStatus::NameConflict,
                existing_name: Some(existing_name.to_string()),
                suggested_name: Some(suggested_name.to_string()),
                ..empty
            },
            DeploymentOutcome::Failed(e) => OutcomeMessage {
                kind: Some(e.kind()),
                message: Some(e.to_string()),
                ..empty
            },
        }
    }
}

/// Streams progress lines as they are produced, then the outcome line.
pub struct AsyncLogStream {
    receiver: UnboundedReceiver<Vec<u8>>,
    pending: Vec<u8>,
    position: usize,
}

impl AsyncLogStream {
    pub fn from_attempt(attempt: DeploymentAttempt) -> Self {
        let (sender, receiver) = unbounded_channel();
        let (logs, outcome) = attempt.into_parts();

        thread::spawn(move || {
            for event in logs {
                if sender.send(format!("{}\n", event).into_bytes()).is_err() {
                    return;
                }
            }
            let outcome = OutcomeMessage::from(&wait_for_outcome(&outcome));
            match serde_json::to_string(&outcome) {
                Ok(json) => {
                    sender
                        .send(format!("{}{}\n", OUTCOME_PREFIX, json).into_bytes())
                        .ok();
                }
                Err(e) => error!("Failed to serialize deployment outcome: {}", e),
            }
        });

        Self {
            receiver,
            pending: Vec::new(),
            position: 0,
        }
    }
}

impl<'r> Responder<'r, 'r> for AsyncLogStream {
    fn respond_to(self, _request: &'r rocket::Request<'_>) -> rocket::response::Result<'r> {
        Ok(Response::build()
            .header(ContentType::Plain)
            .streamed_body(self)
            .finalize())
    }
}

impl AsyncRead for AsyncLogStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        while this.position >= this.pending.len() {
            match this.receiver.poll_recv(cx) {
                Poll::Ready(Some(chunk)) => {
                    this.pending = chunk;
                    this.position = 0;
                }
                Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }

        let available = &this.pending[this.position..];
        let len = available.len().min(buf.remaining());
        buf.put_slice(&available[..len]);
        this.position += len;
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc, thread, time::Duration};

    use rocket::tokio::{self, io::AsyncReadExt};
    use skiff_deployment::{
        Credential, DeployConfig, DeployError, DeployRequest, Deployer, DeploymentHandle,
        DeploymentManager, InMemoryCredentialStore, Platform, Slug,
    };

    use super::*;

    struct SlowDeployer;

    impl Deployer for SlowDeployer {
        fn publish(
            &self,
            _artifact: &str,
            slug: &Slug,
            _config: &DeployConfig,
            _credential: &Credential,
            handle: &DeploymentHandle,
        ) -> Result<String, DeployError> {
            handle.info("Uploading index.html...");
            thread::sleep(Duration::from_millis(200));
            handle.info("Building project...");
            Ok(format!("https://{}.vercel.app", slug))
        }
    }

    fn manager() -> DeploymentManager {
        let tokens = HashMap::from([("vercel".to_owned(), "vc_token".to_owned())]);
        let mut manager = DeploymentManager::new(Box::new(InMemoryCredentialStore::new(tokens)));
        manager.insert_deployer(Platform::Vercel, Arc::new(SlowDeployer));
        manager
    }

    #[tokio::test]
    async fn test_async_log_stream() {
        let attempt = manager().deploy(DeployRequest::new(
            DeployConfig::new(Platform::Vercel, "Blog"),
            "<html>",
        ));
        let mut stream = AsyncLogStream::from_attempt(attempt);
        let mut output = String::new();
        stream.read_to_string(&mut output).await.unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[info] Deploying blog to Vercel...",
                "[info] Uploading index.html...",
                "[info] Building project...",
                "[info] Deployment ready: https://blog.vercel.app",
                r#"outcome: {"status":"success","url":"https://blog.vercel.app"}"#,
            ]
        );
    }

    #[tokio::test]
    async fn test_small_reads_do_not_drop_bytes() {
        let attempt = manager().deploy(
            DeployRequest::new(DeployConfig::new(Platform::Vercel, "Blog"), "<html>")
                .with_token("explicit"),
        );
        let mut stream = AsyncLogStream::from_attempt(attempt);
        let mut collected = Vec::new();
        let mut buffer = [0u8; 3];
        loop {
            let bytes_read = stream.read(&mut buffer).await.unwrap();
            if bytes_read == 0 {
                break;
            }
            collected.extend_from_slice(&buffer[..bytes_read]);
        }
        let output = String::from_utf8(collected).unwrap();
        assert!(output.starts_with("[info] Deploying blog to Vercel...\n"));
        assert!(output.ends_with("\"url\":\"https://blog.vercel.app\"}\n"));
    }

    #[test]
    fn test_failed_outcome_message() {
        let outcome = DeploymentOutcome::Failed(DeployError::CredentialMissing {
            platform: Platform::Netlify,
        });
        let message = OutcomeMessage::from(&outcome);
        assert_eq!(message.status, OutcomeStatus::Error);
        assert_eq!(message.kind, Some(ErrorKind::CredentialMissing));
        assert!(message.url.is_none());
    }
}
