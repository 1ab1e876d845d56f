//! AI chat console: query submission, remote completion, response reveal
//! and the system log.

pub mod client;
pub mod log;
pub mod typewriter;

pub use client::{ChatError, ClientSettings, GeminiClient};
pub use log::{LogEntry, Severity, SystemLog};
pub use typewriter::Typewriter;

use crate::utils::TextInput;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tokio::runtime::Handle;
use tracing::{error, info};

pub const SUCCESS_LOG: &str = "[AI_RESPONSE]: Query processed successfully.";
pub const FAILURE_LOG: &str = "[AI_RESPONSE]: API call failed.";

/// Text shown in place of a response when the call fails.
pub fn failure_message(err: &ChatError) -> String {
    format!(
        "ERROR: Unable to connect to the NeuroStream AI Core. Detail: {err}. \
         Please check system integrity and your API key."
    )
}

/// Chat state: input line, revealed response, processing flag and log.
#[derive(Debug)]
pub struct ChatPanel {
    input: TextInput,
    response: Option<Typewriter>,
    outcome: Option<Severity>,
    processing: bool,
    log: SystemLog,
    char_delay_ms: u64,
}

impl ChatPanel {
    pub fn new(log_capacity: usize, char_delay_ms: u64) -> Self {
        Self {
            input: TextInput::new(),
            response: None,
            outcome: None,
            processing: false,
            log: SystemLog::with_capacity(log_capacity),
            char_delay_ms,
        }
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut TextInput {
        &mut self.input
    }

    pub fn log(&self) -> &SystemLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut SystemLog {
        &mut self.log
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Response text revealed so far.
    pub fn response(&self) -> String {
        self.response
            .as_ref()
            .map(Typewriter::visible)
            .unwrap_or_default()
    }

    /// Submit the input line and clear it.
    pub fn submit_input(&mut self) -> Option<String> {
        let text = self.input.text().to_string();
        let query = self.submit(&text)?;
        self.input.clear();
        Some(query)
    }

    /// Accept a query for dispatch.
    ///
    /// Blank input is ignored: nothing is logged and `None` is returned.
    pub fn submit(&mut self, input: &str) -> Option<String> {
        let query = input.trim();
        if query.is_empty() || self.processing {
            return None;
        }
        self.log.append(format!("[USER]: {query}"), Severity::Info);
        self.response = None;
        self.outcome = None;
        self.processing = true;
        Some(query.to_string())
    }

    /// Start revealing the result of a dispatched query.
    pub fn receive(&mut self, result: Result<String, ChatError>, now_ms: u64) {
        let (text, outcome) = match result {
            Ok(text) => (text, Severity::Info),
            Err(e) => {
                error!("Chat query failed: {e}");
                (failure_message(&e), Severity::Critical)
            }
        };
        self.response = Some(Typewriter::start(&text, now_ms, self.char_delay_ms));
        self.outcome = Some(outcome);
    }

    /// Advance the reveal. Logs the outcome once the reveal completes.
    pub fn tick(&mut self, now_ms: u64) {
        let Some(typewriter) = self.response.as_mut() else {
            return;
        };
        if typewriter.tick(now_ms) {
            self.processing = false;
            match self.outcome.take() {
                Some(Severity::Critical) => self.log.append(FAILURE_LOG, Severity::Critical),
                Some(Severity::Info) => self.log.append(SUCCESS_LOG, Severity::Info),
                None => {}
            }
        }
    }
}

/// Runs completion calls on the tokio runtime and hands results back to the
/// UI loop without blocking it.
pub struct ChatDispatcher {
    client: GeminiClient,
    handle: Handle,
    tx: Sender<Result<String, ChatError>>,
    rx: Receiver<Result<String, ChatError>>,
}

impl ChatDispatcher {
    pub fn new(client: GeminiClient, handle: Handle) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client,
            handle,
            tx,
            rx,
        }
    }

    pub fn dispatch(&self, query: String) {
        info!(chars = query.len(), "Dispatching chat query");
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let result = client.complete(&query).await;
            // receiver gone means the app is shutting down
            let _ = tx.send(result);
        });
    }

    /// A finished result, if one has arrived.
    pub fn try_recv(&self) -> Option<Result<String, ChatError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> ChatPanel {
        ChatPanel::new(20, 30)
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut chat = panel();
        assert!(chat.submit("   \t ").is_none());
        assert!(chat.log().is_empty());
        assert!(!chat.is_processing());
    }

    #[test]
    fn test_submit_trims_and_logs() {
        let mut chat = panel();
        chat.input_mut().set_text("  status report ");
        assert_eq!(chat.submit_input().as_deref(), Some("status report"));
        assert_eq!(chat.input().text(), "");
        assert!(chat.is_processing());
        let entry = chat.log().entries().next().unwrap();
        assert_eq!(entry.message, "[USER]: status report");
    }

    #[test]
    fn test_success_logged_after_reveal() {
        let mut chat = panel();
        chat.submit("hi");
        chat.receive(Ok("ok".to_string()), 1000);
        chat.tick(1000);
        assert_eq!(chat.response(), "o");
        assert!(chat.is_processing());

        chat.tick(1060);
        assert_eq!(chat.response(), "ok");
        assert!(!chat.is_processing());
        assert_eq!(chat.log().entries().next().unwrap().message, SUCCESS_LOG);
        assert_eq!(chat.log().len(), 2);
    }

    #[test]
    fn test_failure_logs_exactly_one_critical_entry() {
        let mut chat = panel();
        chat.submit("hi");
        chat.receive(Err(ChatError::InvalidResponse), 0);
        for now in (0..20_000).step_by(30) {
            chat.tick(now);
        }
        assert_eq!(
            chat.response(),
            "ERROR: Unable to connect to the NeuroStream AI Core. Detail: Invalid API \
             response format. Please check system integrity and your API key."
        );
        let critical: Vec<&LogEntry> = chat.log().entries().filter(|e| e.is_critical()).collect();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].message, FAILURE_LOG);
    }
}
