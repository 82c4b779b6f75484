use crate::core::error::ChatError;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Role tag on a conversation message. Message order is chronological
/// and defines the context window sent on every model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name used in chat-completions payloads.
    pub fn as_api_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Reply fragments from one model invocation, in arrival order.
pub type TokenStream = BoxStream<'static, Result<String, ChatError>>;

/// Boundary to the hosted model: given the full message history, yields
/// the reply incrementally.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn stream_chat(
        &self,
        messages: &[Message],
        temperature: f64,
    ) -> Result<TokenStream, ChatError>;
}

pub mod azure;
