//! Warning diagnostics for definition validation
//!
//! Non-fatal anomalies found while validating node definitions are reported
//! through a [`WarningSink`] passed into the validation entry points. The
//! default sink forwards to the `log` facade; tests can inject a
//! [`CaptureSink`] and assert on the captured messages.

/// Receiver for non-fatal validation warnings
pub trait WarningSink {
    /// Report a single pre-formatted warning message
    fn warn(&mut self, message: &str);
}

/// Forwards warnings to `log::warn!`
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWarningSink;

impl WarningSink for LogWarningSink {
    fn warn(&mut self, message: &str) {
        log::warn!("{message}");
    }
}

/// Buffers warnings in memory for later inspection
#[derive(Clone, Debug, Default)]
pub struct CaptureSink {
    messages: Vec<String>,
}

impl CaptureSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured messages in emission order
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Check whether any captured message contains the given fragment
    pub fn contains(&self, fragment: &str) -> bool {
        self.messages.iter().any(|m| m.contains(fragment))
    }

    /// Number of captured messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check whether nothing was captured
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl WarningSink for CaptureSink {
    fn warn(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }
}
