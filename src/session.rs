use crate::config::AppConfig;
use crate::core::error::ChatError;
use crate::providers::{Message, ModelClient, Role};

/// All state for one conversation. Nothing lives outside this struct;
/// dropping the session drops the conversation.
pub struct Session {
    pub config: AppConfig,
    pub system_prompt: String,
    pub messages: Vec<Message>,
    pub conversation_started: bool,
    pub model: String,
    pub temperature: f64,
    pub client: Box<dyn ModelClient>,
    pub active: bool,
}

impl Session {
    pub fn new(
        config: AppConfig,
        system_prompt: String,
        model: String,
        temperature: f64,
        client: Box<dyn ModelClient>,
    ) -> Self {
        let messages = vec![Message::new(Role::System, system_prompt.clone())];
        Self {
            config,
            system_prompt,
            messages,
            conversation_started: false,
            model,
            temperature,
            client,
            active: true,
        }
    }

    /// On the first call of a conversation, append the configured
    /// greeting and return it so the caller can print it. Later calls
    /// do nothing.
    pub fn ensure_started(&mut self) -> Option<&Message> {
        if self.conversation_started {
            return None;
        }
        self.conversation_started = true;
        self.messages
            .push(Message::new(Role::Assistant, self.config.start_message.clone()));
        self.messages.last()
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::new(Role::User, content));
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::new(Role::Assistant, content));
    }

    /// Restart the conversation: re-read the system prompt file and
    /// drop everything else. The file is read before any state is
    /// touched, so a read failure leaves the session as it was.
    pub fn reset(&mut self) -> Result<(), ChatError> {
        self.system_prompt = self.config.read_system_prompt()?;
        self.messages = vec![Message::new(Role::System, self.system_prompt.clone())];
        self.conversation_started = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::TokenStream;
    use futures::StreamExt;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::NamedTempFile;

    struct NullClient;

    #[async_trait::async_trait]
    impl ModelClient for NullClient {
        async fn stream_chat(
            &self,
            _messages: &[Message],
            _temperature: f64,
        ) -> Result<TokenStream, ChatError> {
            Ok(futures::stream::empty().boxed())
        }
    }

    fn test_config(prompt_path: &Path) -> AppConfig {
        AppConfig {
            app_name: "Natter".to_string(),
            app_icon: "💬".to_string(),
            app_descr: "test".to_string(),
            system_prompt_filename: prompt_path.to_path_buf(),
            api_config_file: PathBuf::from("api_config.json"),
            start_message: "HI".to_string(),
            max_words_per_query: 200,
        }
    }

    fn test_session(prompt_path: &Path) -> Session {
        Session::new(
            test_config(prompt_path),
            "SYS".to_string(),
            "GPT4".to_string(),
            0.0,
            Box::new(NullClient),
        )
    }

    #[test]
    fn new_session_holds_only_the_system_message() {
        let session = test_session(Path::new("unused.txt"));
        assert_eq!(session.messages, vec![Message::new(Role::System, "SYS")]);
        assert!(!session.conversation_started);
        assert!(session.active);
    }

    #[test]
    fn greeting_is_appended_exactly_once() {
        let mut session = test_session(Path::new("unused.txt"));
        let greeting = session.ensure_started().cloned();
        assert_eq!(greeting, Some(Message::new(Role::Assistant, "HI")));
        for _ in 0..4 {
            assert!(session.ensure_started().is_none());
        }
        assert_eq!(session.messages.len(), 2);
    }

    #[test]
    fn reset_rereads_the_prompt_file() {
        let mut prompt = NamedTempFile::new().expect("create temp file");
        prompt.write_all(b"first").expect("write prompt");
        let mut session = test_session(prompt.path());
        session.ensure_started();
        session.append_user("hello");
        session.append_assistant("hi there");
        assert_eq!(session.messages.len(), 4);

        fs::write(prompt.path(), "second").expect("rewrite prompt");
        session.reset().expect("reset should succeed");

        assert_eq!(session.system_prompt, "second");
        assert_eq!(session.messages, vec![Message::new(Role::System, "second")]);
        assert!(!session.conversation_started);
    }

    #[test]
    fn failed_reset_leaves_the_session_untouched() {
        let mut session = test_session(Path::new("/nope/system_message.txt"));
        session.ensure_started();
        session.append_user("hello");
        let before = session.messages.clone();

        assert!(session.reset().is_err());
        assert_eq!(session.messages, before);
        assert!(session.conversation_started);
        assert_eq!(session.system_prompt, "SYS");
    }
}
