//! Client for the external text-generation service
//!
//! Speaks the OpenAI-style chat completions dialect served by local inference
//! servers: `{messages, mode, instruction_template}` in, `{choices: [{message: {content}}]}` out.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::TextGenerationConfig;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TextGenerationError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Text generation service returned {status}")]
    Status { status: u16, body: String },

    #[error("Unexpected response shape: {message}")]
    InvalidResponse { message: String, body: String },
}

impl TextGenerationError {
    /// Raw response body, when the service answered at all
    pub fn body(&self) -> Option<&str> {
        match self {
            TextGenerationError::HttpError(_) => None,
            TextGenerationError::Status { body, .. }
            | TextGenerationError::InvalidResponse { body, .. } => Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub mode: String,
    pub instruction_template: String,
}

impl ChatRequest {
    /// Single user-turn request in instruct mode
    pub fn user_prompt(content: impl Into<String>, mode: &str, instruction_template: &str) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: content.into(),
            }],
            mode: mode.to_string(),
            instruction_template: instruction_template.to_string(),
        }
    }

    /// Content of the first message, used for logging and by test fakes
    pub fn prompt(&self) -> &str {
        self.messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Seam between the claim pipeline and the text-generation backend
#[async_trait]
pub trait TextGeneration: Send + Sync {
    /// Send one request and return the generated text of the first choice
    async fn complete(&self, request: &ChatRequest) -> Result<String, TextGenerationError>;
}

/// HTTP client for the text-generation endpoint
#[derive(Clone)]
pub struct TextGenerationClient {
    client: Client,
    url: String,
}

impl TextGenerationClient {
    pub fn new(config: &TextGenerationConfig) -> Result<Self, TextGenerationError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        tracing::info!(
            url = %config.url,
            timeout_secs = config.timeout_secs,
            "Text generation client initialized"
        );

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

/// Pull the generated text out of a response body
fn parse_completion(body: String) -> Result<String, TextGenerationError> {
    let parsed: ChatResponse = match serde_json::from_str(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Err(TextGenerationError::InvalidResponse {
                message: e.to_string(),
                body,
            });
        }
    };

    match parsed.choices.into_iter().next() {
        Some(choice) => Ok(choice.message.content),
        None => Err(TextGenerationError::InvalidResponse {
            message: "no choices in response".to_string(),
            body,
        }),
    }
}

#[async_trait]
impl TextGeneration for TextGenerationClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, TextGenerationError> {
        let start_time = std::time::Instant::now();

        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = start_time.elapsed().as_millis(),
            prompt_length = request.prompt().len(),
            "Text generation call returned"
        );

        if !status.is_success() {
            return Err(TextGenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return the endpoint URL
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}/v1/chat/completions")
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn local_client(url: String) -> TextGenerationClient {
        TextGenerationClient {
            client: Client::builder()
                .no_proxy()
                .timeout(std::time::Duration::from_secs(5))
                .build()
                .unwrap(),
            url,
        }
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_body() {
        let url = serve_once(http_response("503 Service Unavailable", "model loading")).await;
        let request = ChatRequest::user_prompt("Extract this", "instruct", "Alpaca");

        let err = local_client(url).complete(&request).await.unwrap_err();

        assert!(matches!(err, TextGenerationError::Status { status: 503, .. }));
        assert_eq!(err.body(), Some("model loading"));
    }

    #[tokio::test]
    async fn test_success_returns_first_choice_content() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": "{}"}}]}).to_string();
        let url = serve_once(http_response("200 OK", &body)).await;
        let request = ChatRequest::user_prompt("Extract this", "instruct", "Alpaca");

        let content = local_client(url).complete(&request).await.unwrap();
        assert_eq!(content, "{}");
    }

    #[test]
    fn test_request_wire_format() {
        let request = ChatRequest::user_prompt("Extract this", "instruct", "Alpaca");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "messages": [{"role": "user", "content": "Extract this"}],
                "mode": "instruct",
                "instruction_template": "Alpaca"
            })
        );
        assert_eq!(request.prompt(), "Extract this");
    }

    #[test]
    fn test_parse_completion_takes_first_choice() {
        let body = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "{\"Claim Amount\": 10}"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        })
        .to_string();
        assert_eq!(parse_completion(body).unwrap(), "{\"Claim Amount\": 10}");
    }

    #[test]
    fn test_parse_completion_keeps_body_on_bad_shape() {
        let err = parse_completion(r#"{"choices": []}"#.to_string()).unwrap_err();
        assert_eq!(err.body(), Some(r#"{"choices": []}"#));

        let err = parse_completion("<html>bad gateway</html>".to_string()).unwrap_err();
        assert!(matches!(err, TextGenerationError::InvalidResponse { .. }));
        assert_eq!(err.body(), Some("<html>bad gateway</html>"));
    }
}
