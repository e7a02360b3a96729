//! AI autocomplete: one streaming request at a time, applied to the document
//! as its cumulative text grows.

pub mod bridge;
mod client;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::CompletionError;

pub use client::{CompletionClient, HttpCompletionClient};

/// The two characters that start a completion
pub const TRIGGER: &str = "++";

/// Marker shown at the cursor until the first chunk arrives
pub const PLACEHOLDER: &str = "🤖...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Everything received so far, not just the newest piece
    Chunk(String),
    Finished,
    Failed(CompletionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    pub session: u64,
    pub kind: EventKind,
}

/// Stops an in-flight request
#[derive(Debug, Default)]
pub struct RequestHandle {
    task: Option<tokio::task::AbortHandle>,
}

impl RequestHandle {
    pub fn new(task: tokio::task::AbortHandle) -> Self {
        Self { task: Some(task) }
    }

    /// A handle with nothing to stop
    #[cfg(test)]
    pub fn detached() -> Self {
        Self { task: None }
    }

    pub fn abort(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

#[derive(Debug)]
pub struct CompletionSession {
    pub id: u64,
    /// Cumulative completion text received so far
    pub completion: String,
    /// Chars of completion text inserted into the document
    pub inserted: usize,
    pub placeholder_pending: bool,
    handle: RequestHandle,
}

/// Owns the client and the single active session
pub struct Completion {
    client: Box<dyn CompletionClient>,
    events: UnboundedSender<CompletionEvent>,
    completion_id: String,
    next_id: u64,
    session: Option<CompletionSession>,
}

impl Completion {
    pub fn new(
        client: Box<dyn CompletionClient>,
        events: UnboundedSender<CompletionEvent>,
        completion_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            events,
            completion_id: completion_id.into(),
            next_id: 1,
            session: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CompletionSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut CompletionSession> {
        self.session.as_mut()
    }

    /// Start a request. Returns `None` while another session is active.
    pub fn start(&mut self, prompt: String) -> Option<u64> {
        if self.is_loading() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;

        let request = CompletionRequest {
            prompt,
            id: self.completion_id.clone(),
        };
        tracing::debug!(target: "completion", session = id, prompt_len = request.prompt.len(), "starting completion");
        let handle = self.client.complete(id, request, self.events.clone());
        self.session = Some(CompletionSession {
            id,
            completion: String::new(),
            inserted: 0,
            placeholder_pending: true,
            handle,
        });
        Some(id)
    }

    /// Abort the request and retire the session
    pub fn stop(&mut self) -> Option<CompletionSession> {
        let session = self.session.take()?;
        session.handle.abort();
        tracing::debug!(target: "completion", session = session.id, "completion stopped");
        Some(session)
    }

    /// Retire the session after the request ended on its own
    pub fn finish(&mut self) -> Option<CompletionSession> {
        self.session.take()
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.stop();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingClient;
    use super::*;
    use tokio::sync::mpsc;

    fn completion() -> (Completion, RecordingClient) {
        let client = RecordingClient::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        (Completion::new(Box::new(client.clone()), tx, "quill"), client)
    }

    #[test]
    fn start_sends_prompt_with_id() {
        let (mut completion, client) = completion();
        let id = completion.start("hello".to_string()).unwrap();
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, id);
        assert_eq!(
            requests[0].1,
            CompletionRequest {
                prompt: "hello".to_string(),
                id: "quill".to_string()
            }
        );
    }

    #[test]
    fn only_one_session_at_a_time() {
        let (mut completion, client) = completion();
        assert!(completion.start("a".to_string()).is_some());
        assert!(completion.start("b".to_string()).is_none());
        assert_eq!(client.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn session_ids_increase() {
        let (mut completion, _client) = completion();
        let first = completion.start("a".to_string()).unwrap();
        completion.stop();
        let second = completion.start("b".to_string()).unwrap();
        assert!(second > first);
    }

    #[test]
    fn stop_clears_loading() {
        let (mut completion, _client) = completion();
        completion.start("a".to_string());
        assert!(completion.is_loading());
        assert!(completion.stop().is_some());
        assert!(!completion.is_loading());
        assert!(completion.stop().is_none());
    }

    #[test]
    fn request_serializes_as_json_body() {
        let request = CompletionRequest {
            prompt: "p".to_string(),
            id: "quill".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"prompt": "p", "id": "quill"})
        );
    }
}
