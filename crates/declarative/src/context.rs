//! Apply context and the message collaborator
//!
//! Resources report what they do through a [`MessageSink`] handed to them
//! by the host, so the crate has no global logging or localization state.

use std::sync::{Mutex, PoisonError};

/// Severity of a resource message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Diagnostic detail, shown when the host asks for it
    Verbose,
    /// Something the operator should notice
    Warning,
}

/// Receiver for resource messages
pub trait MessageSink: Send + Sync {
    /// Emit a diagnostic message
    fn verbose(&self, message: &str);

    /// Emit a warning
    fn warning(&self, message: &str);
}

/// Sink that forwards to the `log` facade
pub struct LogSink;

impl MessageSink for LogSink {
    fn verbose(&self, message: &str) {
        log::info!("{message}");
    }

    fn warning(&self, message: &str) {
        log::warn!("{message}");
    }
}

/// Sink that drops everything
pub struct Silent;

impl MessageSink for Silent {
    fn verbose(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
}

/// Sink that keeps messages in memory, in emission order
#[derive(Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<(Level, String)>>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Warnings received so far
    pub fn warnings(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(level, _)| *level == Level::Warning)
            .map(|(_, text)| text)
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

impl MessageSink for CollectingSink {
    fn verbose(&self, message: &str) {
        self.push(Level::Verbose, message);
    }

    fn warning(&self, message: &str) {
        self.push(Level::Warning, message);
    }
}

/// Context passed to resource set operations
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyContext {
    /// Whether this is a what-if run (no actual changes)
    pub dry_run: bool,
}

impl ApplyContext {
    /// Context that applies changes
    pub fn new() -> Self {
        Self { dry_run: false }
    }

    /// Context that only reports what would change
    pub fn what_if() -> Self {
        Self { dry_run: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.verbose("one");
        sink.warning("two");
        sink.verbose("three");

        let messages = sink.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], (Level::Warning, "two".to_string()));
        assert_eq!(sink.warnings(), vec!["two".to_string()]);
    }

    #[test]
    fn test_apply_context_constructors() {
        assert!(!ApplyContext::new().dry_run);
        assert!(ApplyContext::what_if().dry_run);
        assert!(!ApplyContext::default().dry_run);
    }
}
