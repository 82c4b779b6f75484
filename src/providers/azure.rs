use crate::core::error::ChatError;
use crate::credentials::ModelCredential;
use crate::providers::{Message, ModelClient, TokenStream};
use async_trait::async_trait;
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatRequest {
    messages: Vec<WireMessage>,
    temperature: f64,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_api_str().to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// One parsed line of the SSE response body.
#[derive(Debug)]
enum SseLine {
    Token(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> Result<SseLine, ChatError> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }
    if let Ok(chunk) = serde_json::from_str::<StreamResponse>(data) {
        if let Some(content) = chunk.choices.first().and_then(|c| c.delta.content.as_ref()) {
            if !content.is_empty() {
                return Ok(SseLine::Token(content.clone()));
            }
        }
        return Ok(SseLine::Skip);
    }
    // Anything else on a data line is the service reporting a problem
    // mid-stream, e.g. {"error":{"message":...}}.
    Err(ChatError::ModelInvocation(summarize_api_error(data)))
}

fn summarize_api_error(payload: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }
    let mut summary: String = payload.chars().take(200).collect();
    if payload.chars().count() > 200 {
        summary.push_str("...");
    }
    summary
}

/// Turn the raw response body into a stream of content fragments.
fn sse_token_stream(response: reqwest::Response) -> TokenStream {
    parse_sse_stream(
        response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ChatError::from)),
    )
}

/// Parse an SSE body arriving in arbitrary chunks.
///
/// Bytes are buffered until a full line is available, so events split
/// across network chunks are reassembled before parsing. The stream
/// ends at the `[DONE]` marker; a transport failure or an error
/// payload yields one final `Err` item.
fn parse_sse_stream<S>(chunks: S) -> TokenStream
where
    S: Stream<Item = Result<Vec<u8>, ChatError>> + Send + 'static,
{
    chunks
        .scan(
            (Vec::<u8>::new(), false),
            |(buffer, finished), chunk| {
                if *finished {
                    return future::ready(None);
                }
                let tokens = match chunk {
                    Ok(bytes) => {
                        buffer.extend_from_slice(&bytes);
                        let mut tokens = Vec::new();
                        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                            let line_bytes: Vec<u8> = buffer.drain(..=newline).collect();
                            let Ok(line) = std::str::from_utf8(&line_bytes) else {
                                tracing::warn!("skipping non-UTF-8 line in response stream");
                                continue;
                            };
                            match parse_sse_line(line) {
                                Ok(SseLine::Token(token)) => tokens.push(Ok(token)),
                                Ok(SseLine::Done) => {
                                    *finished = true;
                                    break;
                                }
                                Ok(SseLine::Skip) => {}
                                Err(err) => {
                                    tokens.push(Err(err));
                                    *finished = true;
                                    break;
                                }
                            }
                        }
                        tokens
                    }
                    Err(err) => {
                        *finished = true;
                        vec![Err(err)]
                    }
                };
                future::ready(Some(stream::iter(tokens)))
            },
        )
        .flatten()
        .boxed()
}

/// Client for one Azure OpenAI deployment. The deployment name doubles
/// as the model name, so switching models means building a new client
/// from freshly resolved credentials.
pub struct AzureClient {
    http: reqwest::Client,
    credential: ModelCredential,
}

impl AzureClient {
    pub fn new(credential: ModelCredential) -> Self {
        Self {
            http: reqwest::Client::new(),
            credential,
        }
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.credential.endpoint.trim_end_matches('/'),
            self.credential.model,
            self.credential.api_version
        )
    }
}

#[async_trait]
impl ModelClient for AzureClient {
    async fn stream_chat(
        &self,
        messages: &[Message],
        temperature: f64,
    ) -> Result<TokenStream, ChatError> {
        let payload = ChatRequest {
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature,
            stream: true,
        };

        tracing::debug!(model = %self.credential.model, "requesting chat completion");
        let response = self
            .http
            .post(self.chat_url())
            .header("api-key", &self.credential.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::ModelInvocation(format!(
                "API returned {}: {}",
                status,
                summarize_api_error(&body)
            )));
        }

        Ok(sse_token_stream(response))
    }
}
