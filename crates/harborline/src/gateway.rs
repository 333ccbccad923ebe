//! HTTP gateway to the language model server.
//!
//! Ollama-compatible servers have grown several generation endpoints over
//! time, and reverse proxies in front of them remap paths. Rather than
//! pinning one path, [`HttpGateway`] probes a fixed candidate list in
//! order and uses the first endpoint that yields usable text.
//!
//! Outcome mapping per endpoint:
//! - 2xx with extractable text — done.
//! - 404 — endpoint not present on this server, try the next.
//! - 429 or 503 — the server is overloaded; trying other paths of the
//!   same server would only add load, so abort the probe immediately.
//! - anything else (other statuses, transport errors, timeouts) — try
//!   the next candidate.
//!
//! Exhausting the list is [`GatewayError::Exhausted`]; an overload abort
//! is [`GatewayError::Overloaded`]. Callers decide how to degrade.

use std::time::Duration;

use serde_json::{json, Value};

use async_trait::async_trait;
use harborline_core::error::GatewayError;
use harborline_core::generate::Generator;

use crate::config::GatewayConfig;

const ENDPOINT_VARIANTS: [&str; 4] = ["/api/generate", "/generate", "/v1/completions", "/api/chat"];

pub struct HttpGateway {
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

enum ProbeOutcome {
    Success(String),
    TryNext,
    Abort,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|_| GatewayError::Exhausted)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    async fn probe(&self, endpoint: &str, prompt: &str) -> ProbeOutcome {
        let url = format!("{}{}", self.base_url, endpoint);
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens,
            },
        });

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(resp) => resp,
            Err(_) => return ProbeOutcome::TryNext,
        };

        let status = response.status().as_u16();
        match status {
            200..=299 => match response.json::<Value>().await {
                Ok(payload) => match extract_text(&payload) {
                    Some(text) => ProbeOutcome::Success(text),
                    None => ProbeOutcome::TryNext,
                },
                Err(_) => ProbeOutcome::TryNext,
            },
            429 | 503 => ProbeOutcome::Abort,
            _ => ProbeOutcome::TryNext,
        }
    }
}

/// Pull generated text out of the response body, whatever shape the
/// endpoint variant uses.
fn extract_text(payload: &Value) -> Option<String> {
    if let Some(text) = payload.get("response").and_then(|v| v.as_str()) {
        return Some(text.to_string());
    }
    if let Some(text) = payload.get("text").and_then(|v| v.as_str()) {
        return Some(text.to_string());
    }
    // /v1/completions shape
    if let Some(text) = payload
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("text"))
        .and_then(|v| v.as_str())
    {
        return Some(text.to_string());
    }
    // /api/chat shape
    if let Some(text) = payload
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
    {
        return Some(text.to_string());
    }
    None
}

#[async_trait]
impl Generator for HttpGateway {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        for endpoint in ENDPOINT_VARIANTS {
            match self.probe(endpoint, prompt).await {
                ProbeOutcome::Success(text) => return Ok(text),
                ProbeOutcome::TryNext => continue,
                ProbeOutcome::Abort => return Err(GatewayError::Overloaded),
            }
        }
        Err(GatewayError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};

    /// Minimal canned-response HTTP server: answers `responses[i]` to the
    /// i-th request, records the request paths, then closes.
    fn stub_server(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let paths = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&paths);

        std::thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = match listener.accept() {
                    Ok(pair) => pair,
                    Err(_) => return,
                };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = match stream.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => n,
                        Err(_) => break,
                    };
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(header_end) = find_header_end(&buf) {
                        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
                        let content_length = headers
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        if buf.len() >= header_end + 4 + content_length {
                            break;
                        }
                    }
                }
                let request_line = String::from_utf8_lossy(&buf);
                let path = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("")
                    .to_string();
                seen.lock().unwrap().push(path);

                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    429 => "Too Many Requests",
                    500 => "Internal Server Error",
                    503 => "Service Unavailable",
                    _ => "Unknown",
                };
                let response = format!(
                    "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        (format!("http://{}", addr), paths)
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    fn gateway(base_url: String) -> HttpGateway {
        HttpGateway::new(&GatewayConfig {
            base_url,
            model: "test-model".to_string(),
            temperature: 0.7,
            max_tokens: 64,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_overload_aborts_probe_immediately() {
        let (base, paths) = stub_server(vec![(429, "{}")]);
        let gw = gateway(base);
        let err = gw.generate("hello").await.unwrap_err();
        assert_eq!(err, GatewayError::Overloaded);
        assert_eq!(paths.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_404_falls_through_to_next_endpoint() {
        let (base, paths) = stub_server(vec![
            (404, "not found"),
            (200, r#"{"response": "hello there"}"#),
        ]);
        let gw = gateway(base);
        let text = gw.generate("hi").await.unwrap();
        assert_eq!(text, "hello there");
        let seen = paths.lock().unwrap();
        assert_eq!(seen.as_slice(), &["/api/generate", "/generate"]);
    }

    #[tokio::test]
    async fn test_all_endpoints_failing_is_exhausted() {
        let (base, paths) = stub_server(vec![
            (500, "err"),
            (500, "err"),
            (500, "err"),
            (500, "err"),
        ]);
        let gw = gateway(base);
        let err = gw.generate("hi").await.unwrap_err();
        assert_eq!(err, GatewayError::Exhausted);
        assert_eq!(paths.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_connection_refused_is_exhausted() {
        // Port 9 (discard) is not listening locally.
        let gw = gateway("http://127.0.0.1:9".to_string());
        let err = gw.generate("hi").await.unwrap_err();
        assert_eq!(err, GatewayError::Exhausted);
    }

    #[test]
    fn test_extract_text_variants() {
        assert_eq!(
            extract_text(&json!({"response": "a"})).as_deref(),
            Some("a")
        );
        assert_eq!(extract_text(&json!({"text": "b"})).as_deref(), Some("b"));
        assert_eq!(
            extract_text(&json!({"choices": [{"text": "c"}]})).as_deref(),
            Some("c")
        );
        assert_eq!(
            extract_text(&json!({"message": {"content": "d"}})).as_deref(),
            Some("d")
        );
        assert_eq!(extract_text(&json!({"other": 1})), None);
    }
}
