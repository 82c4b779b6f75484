use crate::core::error::ChatError;
use crate::providers::{Message, ModelClient, Role};
use crate::session::Session;
use crate::utils::text::truncate_to_word_limit;
use futures::StreamExt;

/// Where a turn's live output goes. The relay re-renders the whole
/// accumulated reply on every fragment, so implementations overwrite
/// rather than append.
pub trait TurnView {
    fn show_query(&mut self, query: &str);
    fn show_response(&mut self, partial: &str);
}

/// Outcome of a committed turn: what was sent, after truncation, and
/// what came back. The shell renders the permanent transcript entries
/// from this.
pub struct TurnReport {
    pub query: String,
    pub reply: String,
    pub truncated: bool,
}

/// Drive one model invocation, mirroring each fragment into the view.
/// Returns the complete reply once the stream ends.
pub async fn stream_reply(
    client: &dyn ModelClient,
    messages: &[Message],
    temperature: f64,
    view: &mut dyn TurnView,
) -> Result<String, ChatError> {
    let query = match messages.last() {
        Some(message) if message.role == Role::User => message.content.as_str(),
        _ => "",
    };
    // The query shows up as soon as the turn is submitted, before the
    // first fragment arrives.
    view.show_query(query);

    let mut stream = client.stream_chat(messages, temperature).await?;
    let mut reply = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        if fragment.is_empty() {
            continue;
        }
        reply.push_str(&fragment);
        view.show_query(query);
        view.show_response(&reply);
    }
    Ok(reply)
}

/// Run one full user turn against the session's model.
///
/// The outbound context is assembled without touching session state;
/// the user message and the reply are committed together only after
/// the stream completes, so a failed turn leaves the transcript
/// exactly as it was.
pub async fn take_turn(
    session: &mut Session,
    raw_input: &str,
    view: &mut dyn TurnView,
) -> Result<TurnReport, ChatError> {
    let (query, truncated) = truncate_to_word_limit(raw_input, session.config.max_words_per_query);
    if truncated {
        tracing::debug!(
            limit = session.config.max_words_per_query,
            "query truncated to the word limit"
        );
    }

    let mut outbound = session.messages.clone();
    outbound.push(Message::new(Role::User, query.clone()));

    tracing::debug!(model = %session.model, messages = outbound.len(), "sending turn");
    let reply = stream_reply(
        session.client.as_ref(),
        &outbound,
        session.temperature,
        view,
    )
    .await?;

    session.append_user(query.clone());
    session.append_assistant(reply.clone());
    Ok(TurnReport {
        query,
        reply,
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::providers::TokenStream;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct FakeClient {
        script: Arc<Mutex<Vec<Result<String, ChatError>>>>,
        sent: Arc<Mutex<Vec<Message>>>,
    }

    impl FakeClient {
        fn scripted(fragments: Vec<Result<String, ChatError>>) -> Self {
            Self {
                script: Arc::new(Mutex::new(fragments)),
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn sent_messages(&self) -> Vec<Message> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ModelClient for FakeClient {
        async fn stream_chat(
            &self,
            messages: &[Message],
            _temperature: f64,
        ) -> Result<TokenStream, ChatError> {
            *self.sent.lock().unwrap() = messages.to_vec();
            let fragments = std::mem::take(&mut *self.script.lock().unwrap());
            Ok(futures::stream::iter(fragments).boxed())
        }
    }

    #[derive(Default)]
    struct RecordingView {
        queries: Vec<String>,
        responses: Vec<String>,
    }

    impl TurnView for RecordingView {
        fn show_query(&mut self, query: &str) {
            self.queries.push(query.to_string());
        }

        fn show_response(&mut self, partial: &str) {
            self.responses.push(partial.to_string());
        }
    }

    fn fake_session(client: FakeClient, max_words: usize) -> Session {
        let config = AppConfig {
            app_name: "Natter".to_string(),
            app_icon: "💬".to_string(),
            app_descr: "test".to_string(),
            system_prompt_filename: PathBuf::from("unused.txt"),
            api_config_file: PathBuf::from("api_config.json"),
            start_message: "HI".to_string(),
            max_words_per_query: max_words,
        };
        Session::new(
            config,
            "SYS".to_string(),
            "GPT4".to_string(),
            0.0,
            Box::new(client),
        )
    }

    fn ok_fragments(parts: &[&str]) -> Vec<Result<String, ChatError>> {
        parts.iter().map(|p| Ok(p.to_string())).collect()
    }

    #[tokio::test]
    async fn each_emission_is_the_accumulated_reply() {
        let client = FakeClient::scripted(ok_fragments(&["Hel", "lo", " world"]));
        let messages = vec![
            Message::new(Role::System, "SYS"),
            Message::new(Role::User, "hi"),
        ];
        let mut view = RecordingView::default();

        let reply = stream_reply(&client, &messages, 0.0, &mut view)
            .await
            .expect("stream");

        assert_eq!(reply, "Hello world");
        assert_eq!(view.responses, vec!["Hel", "Hello", "Hello world"]);
        // Once at submission, then re-emitted with every fragment.
        assert_eq!(view.queries, vec!["hi", "hi", "hi", "hi"]);
    }

    #[tokio::test]
    async fn empty_fragments_do_not_emit() {
        let client = FakeClient::scripted(ok_fragments(&["a", "", "b"]));
        let messages = vec![Message::new(Role::User, "hi")];
        let mut view = RecordingView::default();

        let reply = stream_reply(&client, &messages, 0.0, &mut view)
            .await
            .expect("stream");

        assert_eq!(reply, "ab");
        assert_eq!(view.responses, vec!["a", "ab"]);
    }

    #[tokio::test]
    async fn mid_stream_error_propagates() {
        let client = FakeClient::scripted(vec![
            Ok("partial".to_string()),
            Err(ChatError::ModelInvocation("boom".to_string())),
        ]);
        let messages = vec![Message::new(Role::User, "hi")];
        let mut view = RecordingView::default();

        let result = stream_reply(&client, &messages, 0.0, &mut view).await;

        assert!(matches!(result, Err(ChatError::ModelInvocation(_))));
        assert_eq!(view.responses, vec!["partial"]);
    }

    #[tokio::test]
    async fn committed_turn_appends_user_and_assistant() {
        let client = FakeClient::scripted(ok_fragments(&["Hi ", "there"]));
        let mut session = fake_session(client.clone(), 50);
        let mut view = RecordingView::default();

        let report = take_turn(&mut session, "hello", &mut view)
            .await
            .expect("turn");

        assert_eq!(report.query, "hello");
        assert_eq!(report.reply, "Hi there");
        assert!(!report.truncated);
        assert_eq!(session.messages.len(), 3);
        assert_eq!(session.messages[1], Message::new(Role::User, "hello"));
        assert_eq!(
            session.messages[2],
            Message::new(Role::Assistant, "Hi there")
        );
    }

    #[tokio::test]
    async fn outbound_context_carries_the_full_history() {
        let client = FakeClient::scripted(ok_fragments(&["ok"]));
        let mut session = fake_session(client.clone(), 50);
        session.ensure_started();
        let mut view = RecordingView::default();

        take_turn(&mut session, "hello", &mut view)
            .await
            .expect("turn");

        let sent = client.sent_messages();
        assert_eq!(
            sent,
            vec![
                Message::new(Role::System, "SYS"),
                Message::new(Role::Assistant, "HI"),
                Message::new(Role::User, "hello"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_turn_leaves_the_transcript_unchanged() {
        let client = FakeClient::scripted(vec![
            Ok("par".to_string()),
            Err(ChatError::ModelInvocation("boom".to_string())),
        ]);
        let mut session = fake_session(client.clone(), 50);
        let before = session.messages.clone();
        let mut view = RecordingView::default();

        let result = take_turn(&mut session, "hello", &mut view).await;

        assert!(result.is_err());
        assert_eq!(session.messages, before);
        // The request itself did carry the user message.
        let sent = client.sent_messages();
        assert_eq!(
            sent.last(),
            Some(&Message::new(Role::User, "hello"))
        );
    }

    #[tokio::test]
    async fn over_limit_query_is_truncated_before_sending() {
        let client = FakeClient::scripted(ok_fragments(&["ok"]));
        let mut session = fake_session(client.clone(), 3);
        let mut view = RecordingView::default();

        let report = take_turn(&mut session, "one two three four five", &mut view)
            .await
            .expect("turn");

        assert!(report.truncated);
        assert_eq!(report.query, "one two three");
        let sent = client.sent_messages();
        assert_eq!(
            sent.last().map(|m| m.content.as_str()),
            Some("one two three")
        );
        assert_eq!(
            session.messages[1],
            Message::new(Role::User, "one two three")
        );
    }
}
