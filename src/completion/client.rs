use futures::StreamExt;
use reqwest::StatusCode;
use tokio::sync::mpsc::UnboundedSender;

use super::{CompletionEvent, CompletionRequest, EventKind, RequestHandle};
use crate::error::CompletionError;

/// Something that can stream a completion for a prompt.
///
/// Implementations report progress for `session` through `events` and must
/// send exactly one `Finished` or `Failed` last.
pub trait CompletionClient: Send {
    fn complete(
        &self,
        session: u64,
        request: CompletionRequest,
        events: UnboundedSender<CompletionEvent>,
    ) -> RequestHandle;
}

/// POSTs the request as JSON and reads the response body as a text stream
pub struct HttpCompletionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpCompletionClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("quill/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(
        &self,
        session: u64,
        request: CompletionRequest,
        events: UnboundedSender<CompletionEvent>,
    ) -> RequestHandle {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        let task = tokio::spawn(async move {
            let kind = match stream_completion(&http, &endpoint, &request, session, &events).await
            {
                Ok(()) => EventKind::Finished,
                Err(e) => {
                    tracing::warn!(target: "completion", session, error = %e, "completion failed");
                    EventKind::Failed(e)
                }
            };
            let _ = events.send(CompletionEvent { session, kind });
        });
        RequestHandle::new(task.abort_handle())
    }
}

async fn stream_completion(
    http: &reqwest::Client,
    endpoint: &str,
    request: &CompletionRequest,
    session: u64,
    events: &UnboundedSender<CompletionEvent>,
) -> Result<(), CompletionError> {
    let response = http
        .post(endpoint)
        .json(request)
        .send()
        .await
        .map_err(|e| CompletionError::RequestFailed(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CompletionError::RateLimited);
    }
    if !status.is_success() {
        return Err(CompletionError::RequestFailed(format!(
            "endpoint returned {status}"
        )));
    }

    let mut body = response.bytes_stream();
    let mut text = Utf8Accumulator::default();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| CompletionError::RequestFailed(e.to_string()))?;
        if text.push(&chunk) {
            let _ = events.send(CompletionEvent {
                session,
                kind: EventKind::Chunk(text.as_str().to_string()),
            });
        }
    }
    if text.finish() {
        let _ = events.send(CompletionEvent {
            session,
            kind: EventKind::Chunk(text.as_str().to_string()),
        });
    }
    Ok(())
}

/// Decodes a byte stream into text, holding back a split multi-byte char
/// until the rest of it arrives.
#[derive(Debug, Default)]
struct Utf8Accumulator {
    text: String,
    pending: Vec<u8>,
}

impl Utf8Accumulator {
    /// Returns true if the decoded text grew
    fn push(&mut self, bytes: &[u8]) -> bool {
        let before = self.text.len();
        self.pending.extend_from_slice(bytes);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    self.text.push_str(s);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.text
                        .push_str(std::str::from_utf8(&self.pending[..valid]).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the end
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        self.text.len() > before
    }

    /// Flush a trailing incomplete sequence. Returns true if the text grew.
    fn finish(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        self.pending.clear();
        self.text.push(char::REPLACEMENT_CHARACTER);
        true
    }

    fn as_str(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    #[test]
    fn accumulator_joins_split_chars() {
        let mut text = Utf8Accumulator::default();
        let robot = "🤖".as_bytes();
        assert!(text.push(b"hi "));
        assert!(!text.push(&robot[..2]));
        assert!(text.push(&robot[2..]));
        assert_eq!(text.as_str(), "hi 🤖");
        assert!(!text.finish());
    }

    #[test]
    fn accumulator_replaces_invalid_bytes() {
        let mut text = Utf8Accumulator::default();
        assert!(text.push(&[b'a', 0xff, b'b']));
        assert_eq!(text.as_str(), "a\u{fffd}b");
    }

    #[test]
    fn accumulator_flushes_truncated_tail() {
        let mut text = Utf8Accumulator::default();
        text.push(&"é".as_bytes()[..1]);
        assert!(text.finish());
        assert_eq!(text.as_str(), "\u{fffd}");
    }

    /// Serve one canned HTTP response, returning the request body
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + length {
                        socket.write_all(response.as_bytes()).await.unwrap();
                        socket.shutdown().await.unwrap();
                        return text[header_end + 4..].to_string();
                    }
                }
                if n == 0 {
                    return String::new();
                }
            }
        });
        (format!("http://{addr}/api/generate"), server)
    }

    async fn collect(endpoint: String) -> Vec<EventKind> {
        let client = HttpCompletionClient::new(endpoint).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = CompletionRequest {
            prompt: "Once upon".to_string(),
            id: "quill".to_string(),
        };
        let _handle = client.complete(7, request, tx);
        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            assert_eq!(event.session, 7);
            let done = !matches!(event.kind, EventKind::Chunk(_));
            kinds.push(event.kind);
            if done {
                break;
            }
        }
        kinds
    }

    #[tokio::test]
    async fn streams_body_as_cumulative_chunks() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 11\r\nconnection: close\r\n\r\n a time, it",
        )
        .await;
        let kinds = collect(endpoint).await;
        assert_eq!(kinds.last(), Some(&EventKind::Finished));
        assert_eq!(
            kinds[kinds.len() - 2],
            EventKind::Chunk(" a time, it".to_string())
        );

        let body = server.await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["prompt"], "Once upon");
        assert_eq!(json["id"], "quill");
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let (endpoint, _server) = serve_once(
            "HTTP/1.1 429 Too Many Requests\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let kinds = collect(endpoint).await;
        assert_eq!(kinds, vec![EventKind::Failed(CompletionError::RateLimited)]);
    }

    #[tokio::test]
    async fn server_error_is_request_failed() {
        let (endpoint, _server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let kinds = collect(endpoint).await;
        assert!(matches!(
            kinds.as_slice(),
            [EventKind::Failed(CompletionError::RequestFailed(_))]
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_failed() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let kinds = collect(format!("http://{addr}/api/generate")).await;
        assert!(matches!(
            kinds.as_slice(),
            [EventKind::Failed(CompletionError::RequestFailed(_))]
        ));
    }
}
