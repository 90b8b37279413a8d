use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;

const VISION_TIMEOUT: Duration = Duration::from_secs(60);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend failure classes. Callers react differently to each: a timeout may
/// warrant a retry with backoff, an empty reply does not.
#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("failed to connect to backend: {0}")]
    Unreachable(String),
    #[error("backend request timed out")]
    Timeout,
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend returned an empty message")]
    Empty,
    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

fn classify(err: reqwest::Error) -> OllamaError {
    if err.is_timeout() {
        OllamaError::Timeout
    } else {
        OllamaError::Unreachable(err.to_string())
    }
}

pub struct OllamaClient {
    client: Client,
    host: String,
    code_model: String,
    vision_model: String,
    request_timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: ResponseMessage,
}

#[derive(Deserialize, Default)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

impl OllamaClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            host: config.ollama_host.trim_end_matches('/').to_string(),
            code_model: config.code_model.clone(),
            vision_model: config.vision_model.clone(),
            request_timeout: config.request_timeout,
        }
    }

    async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
        timeout: Duration,
    ) -> Result<String, OllamaError> {
        let url = format!("{}/api/chat", self.host);
        let body = ChatRequest { model, messages, stream: false, options };

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ Ollama API error: {} - {}", status, body);
            return Err(OllamaError::Status { status: status.as_u16(), body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| if e.is_timeout() { OllamaError::Timeout } else { OllamaError::Decode(e.to_string()) })?;

        let content = parsed.message.content.trim().to_string();
        if content.is_empty() {
            return Err(OllamaError::Empty);
        }
        Ok(content)
    }

    /// Main code-generation call: non-streaming chat with a fixed system
    /// instruction and the rendered site prompt.
    pub async fn generate_site(&self, system: &str, prompt: &str) -> Result<String, OllamaError> {
        info!("📤 Sending request to Ollama with model {}", self.code_model);
        let messages = vec![
            ChatMessage { role: "system", content: system.to_string(), images: None },
            ChatMessage { role: "user", content: prompt.to_string(), images: None },
        ];
        let options = ChatOptions { temperature: 0.7, top_p: 0.9, num_predict: Some(8192) };
        self.chat(&self.code_model, messages, options, self.request_timeout).await
    }

    /// Secondary vision call used for design-hint extraction. The reference
    /// image travels base64-encoded in the message's `images` field.
    pub async fn analyze_image(
        &self,
        prompt: &str,
        image_b64: String,
    ) -> Result<String, OllamaError> {
        info!("📤 Sending image analysis request with model {}", self.vision_model);
        let messages = vec![ChatMessage {
            role: "user",
            content: prompt.to_string(),
            images: Some(vec![image_b64]),
        }];
        let options = ChatOptions { temperature: 0.7, top_p: 0.9, num_predict: None };
        self.chat(&self.vision_model, messages, options, VISION_TIMEOUT).await
    }

    /// Lightweight reachability probe against the model-listing endpoint.
    pub async fn health(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                error!("Ollama health check failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client_for(host: String, timeout: Duration) -> OllamaClient {
        let mut config = Config::default();
        config.ollama_host = host;
        config.request_timeout = timeout;
        OllamaClient::new(&config)
    }

    /// Accepts one connection, reads the full request, answers with `body`.
    async fn serve_once(listener: TcpListener, body: &'static str) {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length: ").or_else(|| l.strip_prefix("Content-Length: ")))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.flush().await.unwrap();
    }

    #[tokio::test]
    async fn generate_site_returns_message_content() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(
            listener,
            r#"{"model":"qwen2.5-coder:7b","message":{"role":"assistant","content":"{\"index.html\":\"<html>\"}"},"done":true}"#,
        ));

        let client = client_for(format!("http://{addr}"), Duration::from_secs(5));
        let content = client.generate_site("system", "prompt").await.unwrap();
        assert_eq!(content, r#"{"index.html":"<html>"}"#);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn empty_content_is_its_own_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(
            listener,
            r#"{"message":{"role":"assistant","content":"  "},"done":true}"#,
        ));

        let client = client_for(format!("http://{addr}"), Duration::from_secs(5));
        let err = client.generate_site("system", "prompt").await.unwrap_err();
        assert!(matches!(err, OllamaError::Empty));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn slow_backend_classifies_as_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept the connection but never respond.
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let client = client_for(format!("http://{addr}"), Duration::from_millis(200));
        let err = client.generate_site("system", "prompt").await.unwrap_err();
        assert!(matches!(err, OllamaError::Timeout), "{err:?}");
        server.abort();
    }

    #[tokio::test]
    async fn refused_connection_classifies_as_unreachable() {
        // Bind then drop to obtain a port with no listener.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}"), Duration::from_secs(2));
        let err = client.generate_site("system", "prompt").await.unwrap_err();
        assert!(matches!(err, OllamaError::Unreachable(_)), "{err:?}");
    }
}
