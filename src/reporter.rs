use async_trait::async_trait;

use crate::notify::Notifier;
use crate::types::RestockEvent;

/// Emit a restock event as a single JSON line to stdout.
pub fn report_event(event: &RestockEvent) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

/// Sink that writes every restock to stdout as JSON lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

#[async_trait]
impl Notifier for StdoutReporter {
    async fn notify(&self, event: &RestockEvent) {
        report_event(event);
    }
}
