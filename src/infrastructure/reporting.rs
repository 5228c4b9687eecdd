use std::sync::Mutex;

use crate::domain::reconciliation::{StatusLevel, StatusMessage, StatusReporter};

/// Forwards run status messages to the application log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatusReporter;

impl StatusReporter for TracingStatusReporter {
  fn report(&self, message: StatusMessage) {
    match message.level() {
      StatusLevel::Info | StatusLevel::Success => tracing::info!(status = %message),
      StatusLevel::Warning => tracing::warn!(status = %message),
      StatusLevel::Error => tracing::error!(status = %message),
    }
  }
}

/// Collects messages so they can be returned to the caller of a run.
#[derive(Debug, Default)]
pub struct BufferedStatusReporter {
  messages: Mutex<Vec<StatusMessage>>,
}

impl BufferedStatusReporter {
  pub fn messages(&self) -> Vec<StatusMessage> {
    self
      .messages
      .lock()
      .map(|messages| messages.clone())
      .unwrap_or_default()
  }

  pub fn rendered(&self) -> Vec<String> {
    self.messages().iter().map(ToString::to_string).collect()
  }
}

impl StatusReporter for BufferedStatusReporter {
  fn report(&self, message: StatusMessage) {
    TracingStatusReporter.report(message.clone());
    if let Ok(mut messages) = self.messages.lock() {
      messages.push(message);
    }
  }
}
