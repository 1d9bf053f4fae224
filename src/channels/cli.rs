//! Terminal channel: one traveler message per stdin line, replies on stdout.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse, StatusUpdate};
use crate::error::ChannelError;

const PROMPT: &str = "✈️  ";

#[derive(Debug, Default)]
pub struct CliChannel {
    started: AtomicBool,
}

impl CliChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ChannelError::AlreadyStarted {
                name: self.name().to_string(),
            });
        }

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            eprint!("{PROMPT}");
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => eprint!("{PROMPT}"),
                    Ok(Some(line)) => {
                        let msg = IncomingMessage::new("cli", "traveler", line.trim());
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let mut stdout = tokio::io::stdout();
        let text = format!("\n{}\n\n", response.content);
        stdout
            .write_all(text.as_bytes())
            .await
            .map_err(|source| ChannelError::Write {
                name: self.name().to_string(),
                source,
            })?;
        stdout.flush().await.map_err(|source| ChannelError::Write {
            name: self.name().to_string(),
            source,
        })?;
        eprint!("{PROMPT}");
        Ok(())
    }

    async fn send_status(
        &self,
        status: StatusUpdate,
        _metadata: &serde_json::Value,
    ) -> Result<(), ChannelError> {
        match status {
            StatusUpdate::Thinking(msg) => eprintln!("⏳ {}", msg),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_start_is_rejected() {
        let cli = CliChannel::new();
        let _stream = cli.start().await.unwrap();
        let err = cli.start().await.err().unwrap();
        assert!(matches!(err, ChannelError::AlreadyStarted { .. }));
    }
}
