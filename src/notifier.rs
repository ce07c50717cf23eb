use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::Result;
use crate::types::Alert;

/// Something that can voice an alert to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn speak(&self, message: &str) -> Result<()>;
}

/// Runs the OS speech command (`say` on macOS) with the message as its only argument.
pub struct SpeechNotifier {
    command: String,
}

impl SpeechNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }
}

#[async_trait]
impl Notifier for SpeechNotifier {
    /// Waits for the command to finish. Its exit status is ignored; failing to
    /// start it is an error.
    async fn speak(&self, message: &str) -> Result<()> {
        let status = Command::new(&self.command).arg(message).status().await?;
        debug!(command = %self.command, %status, "speech command finished");
        Ok(())
    }
}

/// Voice each alert in order.
pub async fn announce(notifier: &dyn Notifier, alerts: &[Alert]) -> Result<()> {
    for alert in alerts {
        info!(alert = %alert, message = alert.message(), "speaking alert");
        notifier.speak(alert.message()).await?;
    }
    Ok(())
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Collects spoken messages instead of playing them.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub spoken: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub fn messages(&self) -> Vec<String> {
            self.spoken.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn speak(&self, message: &str) -> Result<()> {
            self.spoken.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }
}
