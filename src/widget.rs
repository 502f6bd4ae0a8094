//! The chat widget and its submission lifecycle.
//!
//! A submission moves through [`SubmissionState`]:
//!
//! ```text
//! Idle ──non-empty input──▶ UserEchoed ──placeholder──▶ AwaitingReply ──reply/error──▶ Resolved
//! ```
//!
//! Everything up to `AwaitingReply` happens synchronously in
//! [`ChatWidget::begin_submission`]. The only suspension point is the request
//! awaited by [`PendingReply::resolve`]. Submissions are independent: several
//! may be in flight and each one updates only its own placeholder, in
//! whatever order the replies arrive.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use crate::client::ChatClient;
use crate::dom::{InputField, MessageContainer, MessageElement, Sender, SubmitEvent};
use crate::error::{ChatError, Result};
use crate::protocol::{ChatRequest, ChatResponse};

/// Placeholder shown while a reply is pending.
pub const THINKING_TEXT: &str = "Thinking...";
/// Shown when the endpoint answered without a usable `result`.
pub const NO_RESPONSE_TEXT: &str = "Sorry, no response received.";
/// Shown on HTTP, transport or decoding failure.
pub const FAILURE_TEXT: &str = "Failed to get response from server.";

/// Lifecycle of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    /// No submission in progress; empty input leaves the widget here.
    Idle,
    /// The user's message is in the transcript and the input is cleared.
    UserEchoed,
    /// The placeholder is in the transcript and the request is pending.
    AwaitingReply,
    Resolved,
}

/// Terminal outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The endpoint returned a reply.
    Reply(String),
    /// The endpoint succeeded but sent no usable `result`.
    NoResponse,
    /// Non-2xx status, transport failure or undecodable body.
    Failed,
}

impl Resolution {
    /// Text the placeholder ends up showing.
    pub fn text(&self) -> &str {
        match self {
            Self::Reply(text) => text,
            Self::NoResponse => NO_RESPONSE_TEXT,
            Self::Failed => FAILURE_TEXT,
        }
    }

    fn from_result(result: Result<ChatResponse>) -> Self {
        match result {
            Ok(ChatResponse {
                result: Some(text),
            }) => Self::Reply(text),
            Ok(ChatResponse { result: None }) => {
                debug!("Chat response carried no result");
                Self::NoResponse
            }
            Err(ChatError::Status { status, reason }) => {
                error!(status, reason = %reason, "Server error");
                Self::Failed
            }
            Err(err) => {
                error!(error = %err, "Chat request failed");
                Self::Failed
            }
        }
    }
}

/// Chat widget mounted on an input field and a message container.
///
/// # Example
///
/// ```rust,no_run
/// use chat_widget::client::HttpChatClient;
/// use chat_widget::dom::SubmitEvent;
/// use chat_widget::transcript::{TextInput, Transcript};
/// use chat_widget::widget::ChatWidget;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let input = TextInput::new();
/// let transcript = Transcript::new();
/// let client = HttpChatClient::new("http://localhost:3000", "/api/chat")?;
/// let widget = ChatWidget::new(input.clone(), transcript.clone(), client);
///
/// input.set_value("Hello!");
/// let resolution = widget.submit(&mut SubmitEvent::new()).await;
/// println!("{:?}", resolution);
/// # Ok(())
/// # }
/// ```
pub struct ChatWidget<I, C, A> {
    input: I,
    container: C,
    client: Arc<A>,
}

impl<I, C, A> fmt::Debug for ChatWidget<I, C, A>
where
    I: fmt::Debug,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatWidget")
            .field("input", &self.input)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl<I, C, A> ChatWidget<I, C, A>
where
    I: InputField,
    C: MessageContainer,
    A: ChatClient + 'static,
{
    pub fn new(input: I, container: C, client: A) -> Self {
        Self::with_shared_client(input, container, Arc::new(client))
    }

    /// Create a widget that shares its client with other widgets.
    pub fn with_shared_client(input: I, container: C, client: Arc<A>) -> Self {
        Self {
            input,
            container,
            client,
        }
    }

    /// Append a message and scroll it into view.
    ///
    /// The returned handle updates the message in place.
    pub fn append_message(&self, sender: Sender, text: &str, is_pending: bool) -> C::Element {
        let element = self.container.append(sender, text, is_pending);
        self.container.scroll_to_bottom();
        element
    }

    /// Handle a submit event up to the point where the request is pending.
    ///
    /// Returns `None` for empty or whitespace-only input, leaving the
    /// transcript and the input untouched. The default action of `event` is
    /// prevented in every case.
    pub fn begin_submission(&self, event: &mut SubmitEvent) -> Option<PendingReply<C, A>> {
        event.prevent_default();

        let raw = self.input.value();
        let text = raw.trim();
        if text.is_empty() {
            debug!(state = ?SubmissionState::Idle, "Empty input ignored");
            return None;
        }

        self.append_message(Sender::User, text, false);
        self.input.clear();
        debug!(state = ?SubmissionState::UserEchoed, "Submission echoed");

        let placeholder = self.append_message(Sender::Bot, THINKING_TEXT, true);
        debug!(state = ?SubmissionState::AwaitingReply, "Awaiting reply");

        Some(PendingReply {
            client: Arc::clone(&self.client),
            container: self.container.clone(),
            placeholder,
            request: ChatRequest::single_turn(text),
            state: SubmissionState::AwaitingReply,
        })
    }

    /// Handle a submit event to completion.
    pub async fn submit(&self, event: &mut SubmitEvent) -> Option<Resolution> {
        let pending = self.begin_submission(event)?;
        Some(pending.resolve().await)
    }
}

/// A submission whose placeholder is waiting for the endpoint.
///
/// Owns everything it needs, so it can be moved into a spawned task.
pub struct PendingReply<C: MessageContainer, A> {
    client: Arc<A>,
    container: C,
    placeholder: C::Element,
    request: ChatRequest,
    state: SubmissionState,
}

impl<C: MessageContainer, A> fmt::Debug for PendingReply<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingReply")
            .field("request", &self.request)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C, A> PendingReply<C, A>
where
    C: MessageContainer,
    A: ChatClient + 'static,
{
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Handle to the "Thinking..." placeholder.
    pub fn placeholder(&self) -> &C::Element {
        &self.placeholder
    }

    /// Payload that will be posted.
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    /// Send the request and settle the placeholder.
    ///
    /// Never fails: errors become [`Resolution::Failed`] and are logged.
    pub async fn resolve(mut self) -> Resolution {
        let result = self.client.send(&self.request).await;

        self.placeholder.clear_pending();
        let resolution = Resolution::from_result(result);
        self.placeholder.set_text(resolution.text());
        self.container.scroll_to_bottom();

        self.state = SubmissionState::Resolved;
        debug!(state = ?self.state, outcome = ?resolution, "Submission resolved");
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{TextInput, Transcript};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted client returning canned outcomes and recording requests.
    struct FakeClient {
        reply: fn() -> Result<ChatResponse>,
        delay: Option<Duration>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl FakeClient {
        fn new(reply: fn() -> Result<ChatResponse>) -> Self {
            Self {
                reply,
                delay: None,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for FakeClient {
        async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.reply)()
        }
    }

    /// Echoes the text back after a delay encoded in the text itself.
    struct EchoAfterDelay;

    #[async_trait]
    impl ChatClient for EchoAfterDelay {
        async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
            let text = &request.conversation[0].text;
            let millis: u64 = text.parse().unwrap();
            tokio::time::sleep(Duration::from_millis(millis)).await;
            Ok(ChatResponse::reply(format!("echo {text}")))
        }
    }

    fn widget(
        reply: fn() -> Result<ChatResponse>,
    ) -> (ChatWidget<TextInput, Transcript, FakeClient>, TextInput, Transcript) {
        let input = TextInput::new();
        let transcript = Transcript::new();
        let widget = ChatWidget::new(input.clone(), transcript.clone(), FakeClient::new(reply));
        (widget, input, transcript)
    }

    fn hi() -> Result<ChatResponse> {
        Ok(ChatResponse::reply("hi"))
    }

    #[test]
    fn test_append_message_scrolls() {
        let (widget, _input, transcript) = widget(hi);

        let node = widget.append_message(Sender::User, "first", false);
        assert_eq!(node.index(), 0);
        assert!(transcript.is_at_bottom());

        widget.append_message(Sender::Bot, "multi\nline", true);
        assert_eq!(transcript.scroll_top(), 3);
        assert!(transcript.is_at_bottom());
        assert!(transcript.messages()[1].is_pending);
    }

    #[tokio::test]
    async fn test_submit_reply() {
        let (widget, input, transcript) = widget(hi);
        input.set_value("  hello there  ");

        let mut event = SubmitEvent::new();
        let resolution = widget.submit(&mut event).await;

        assert!(event.default_prevented());
        assert_eq!(resolution, Some(Resolution::Reply("hi".into())));
        assert_eq!(input.value(), "");

        let messages = transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "hello there");
        assert!(!messages[0].is_pending);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].text, "hi");
        assert!(!messages[1].is_pending);
        assert!(transcript.is_at_bottom());
    }

    #[tokio::test]
    async fn test_request_carries_trimmed_text() {
        let (widget, input, _transcript) = widget(hi);
        input.set_value("\tping\n");

        widget.submit(&mut SubmitEvent::new()).await;

        let requests = widget.client.requests.lock().unwrap();
        assert_eq!(requests.as_slice(), &[ChatRequest::single_turn("ping")]);
    }

    #[tokio::test]
    async fn test_empty_input_is_ignored() {
        for raw in ["", "   ", "\n\t "] {
            let (widget, input, transcript) = widget(hi);
            input.set_value(raw);

            let mut event = SubmitEvent::new();
            assert_eq!(widget.submit(&mut event).await, None);

            assert!(event.default_prevented());
            assert!(transcript.is_empty());
            assert_eq!(input.value(), raw);
            assert!(widget.client.requests.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_no_response() {
        let (widget, input, transcript) = widget(|| Ok(ChatResponse::default()));
        input.set_value("hello");

        let resolution = widget.submit(&mut SubmitEvent::new()).await;

        assert_eq!(resolution, Some(Resolution::NoResponse));
        let bot = &transcript.messages()[1];
        assert_eq!(bot.text, NO_RESPONSE_TEXT);
        assert!(!bot.is_pending);
    }

    #[tokio::test]
    async fn test_status_failure() {
        let (widget, input, transcript) = widget(|| {
            Err(ChatError::Status {
                status: 500,
                reason: "Internal Server Error".into(),
            })
        });
        input.set_value("hello");

        let resolution = widget.submit(&mut SubmitEvent::new()).await;

        assert_eq!(resolution, Some(Resolution::Failed));
        let bot = &transcript.messages()[1];
        assert_eq!(bot.text, FAILURE_TEXT);
        assert!(!bot.is_pending);
        assert!(transcript.is_at_bottom());
    }

    #[tokio::test]
    async fn test_decode_failure() {
        let (widget, input, transcript) = widget(|| {
            let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
            Err(ChatError::Decode(err))
        });
        input.set_value("hello");

        widget.submit(&mut SubmitEvent::new()).await;

        assert_eq!(transcript.messages()[1].text, FAILURE_TEXT);
    }

    #[tokio::test]
    async fn test_placeholder_pending_while_in_flight() {
        let input = TextInput::new();
        let transcript = Transcript::new();
        let mut client = FakeClient::new(hi);
        client.delay = Some(Duration::from_millis(50));
        let widget = ChatWidget::new(input.clone(), transcript.clone(), client);

        input.set_value("hello");
        let pending = widget.begin_submission(&mut SubmitEvent::new()).unwrap();

        assert_eq!(pending.state(), SubmissionState::AwaitingReply);
        assert_eq!(input.value(), "");
        let placeholder = pending.placeholder().snapshot();
        assert_eq!(placeholder.text, THINKING_TEXT);
        assert!(placeholder.is_pending);
        assert!(transcript.is_at_bottom());

        let node = pending.placeholder().clone();
        let resolution = pending.resolve().await;
        assert_eq!(resolution.text(), "hi");
        assert!(!node.snapshot().is_pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replies_resolve_out_of_order() {
        let input = TextInput::new();
        let transcript = Transcript::new();
        let widget = ChatWidget::new(input.clone(), transcript.clone(), EchoAfterDelay);

        input.set_value("200");
        let slow = widget.begin_submission(&mut SubmitEvent::new()).unwrap();
        input.set_value("10");
        let fast = widget.begin_submission(&mut SubmitEvent::new()).unwrap();

        let slow = tokio::spawn(slow.resolve());
        let fast = tokio::spawn(fast.resolve());

        assert_eq!(fast.await.unwrap(), Resolution::Reply("echo 10".into()));
        // The slow placeholder is still pending after the fast one settled.
        assert!(transcript.messages()[1].is_pending);
        assert_eq!(transcript.messages()[3].text, "echo 10");

        assert_eq!(slow.await.unwrap(), Resolution::Reply("echo 200".into()));

        let texts: Vec<_> = transcript.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, ["200", "echo 200", "10", "echo 10"]);
        assert!(transcript.messages().iter().all(|m| !m.is_pending));
        assert!(transcript.is_at_bottom());
    }

    #[test]
    fn test_resolution_text() {
        assert_eq!(Resolution::Reply("x".into()).text(), "x");
        assert_eq!(Resolution::NoResponse.text(), NO_RESPONSE_TEXT);
        assert_eq!(Resolution::Failed.text(), FAILURE_TEXT);
    }
}
