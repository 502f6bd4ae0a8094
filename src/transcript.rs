//! In-memory document: text input and transcript container.
//!
//! Both types are handles onto shared state, so the host and the widget can
//! hold clones of the same input or transcript. Locks are only held for the
//! duration of a single read or write.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::dom::{InputField, MessageContainer, MessageElement, Sender};
use crate::render;

/// Capacity of the change-notification channel.
const EVENT_CAPACITY: usize = 256;

/// Snapshot of one transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub is_pending: bool,
}

impl Message {
    /// Rendered height in rows: one per text line, at least one.
    fn rows(&self) -> usize {
        self.text.lines().count().max(1)
    }
}

/// Change notification emitted by a [`Transcript`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// A message was appended at `index`.
    Appended { index: usize, message: Message },
    /// The message at `index` changed text or pending state.
    Updated { index: usize, message: Message },
}

// ─────────────────────────────────────────────────────────────────────────────
// Text input
// ─────────────────────────────────────────────────────────────────────────────

/// Single-line text input.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: Arc<Mutex<String>>,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current value, as typing would.
    pub fn set_value(&self, value: impl Into<String>) {
        *lock(&self.value) = value.into();
    }
}

impl InputField for TextInput {
    fn value(&self) -> String {
        lock(&self.value).clone()
    }

    fn clear(&self) {
        lock(&self.value).clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transcript
// ─────────────────────────────────────────────────────────────────────────────

/// Append-only message container with a scroll position.
#[derive(Debug, Clone)]
pub struct Transcript {
    inner: Arc<TranscriptInner>,
}

#[derive(Debug)]
struct TranscriptInner {
    state: Mutex<TranscriptState>,
    events: broadcast::Sender<TranscriptEvent>,
}

#[derive(Debug, Default)]
struct TranscriptState {
    messages: Vec<Message>,
    scroll_top: usize,
}

impl TranscriptState {
    fn scroll_height(&self) -> usize {
        self.messages.iter().map(Message::rows).sum()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(TranscriptInner {
                state: Mutex::new(TranscriptState::default()),
                events,
            }),
        }
    }

    /// Receive a [`TranscriptEvent`] for every append and update from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.inner.events.subscribe()
    }

    /// Snapshot of all messages in insertion order.
    pub fn messages(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.state().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().messages.is_empty()
    }

    /// Current scroll offset in rows.
    pub fn scroll_top(&self) -> usize {
        self.state().scroll_top
    }

    /// Total content height in rows.
    pub fn scroll_height(&self) -> usize {
        self.state().scroll_height()
    }

    /// Whether the view is scrolled to the newest entry.
    pub fn is_at_bottom(&self) -> bool {
        let state = self.state();
        state.scroll_top == state.scroll_height()
    }

    /// Render the transcript as HTML markup.
    pub fn to_html(&self) -> String {
        render::render_transcript(&self.messages())
    }

    fn state(&self) -> MutexGuard<'_, TranscriptState> {
        lock(&self.inner.state)
    }

    fn update(&self, index: usize, apply: impl FnOnce(&mut Message)) {
        let message = {
            let mut state = self.state();
            let Some(message) = state.messages.get_mut(index) else {
                return;
            };
            apply(message);
            message.clone()
        };
        // No receivers is not an error.
        let _ = self
            .inner
            .events
            .send(TranscriptEvent::Updated { index, message });
    }
}

impl MessageContainer for Transcript {
    type Element = MessageNode;

    fn append(&self, sender: Sender, text: &str, is_pending: bool) -> MessageNode {
        let message = Message {
            sender,
            text: text.to_owned(),
            is_pending,
        };
        let index = {
            let mut state = self.state();
            state.messages.push(message.clone());
            state.messages.len() - 1
        };
        let _ = self
            .inner
            .events
            .send(TranscriptEvent::Appended { index, message });

        MessageNode {
            transcript: self.clone(),
            index,
        }
    }

    fn scroll_to_bottom(&self) {
        let mut state = self.state();
        state.scroll_top = state.scroll_height();
    }
}

/// Handle to one message inside a [`Transcript`].
#[derive(Debug, Clone)]
pub struct MessageNode {
    transcript: Transcript,
    index: usize,
}

impl MessageNode {
    /// Position in the transcript.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current state of the message.
    pub fn snapshot(&self) -> Message {
        self.transcript.state().messages[self.index].clone()
    }
}

impl MessageElement for MessageNode {
    fn set_text(&self, text: &str) {
        self.transcript.update(self.index, |message| {
            message.text = text.to_owned();
        });
    }

    fn clear_pending(&self) {
        self.transcript.update(self.index, |message| {
            message.is_pending = false;
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
