//! Document collaborators the widget is mounted on.
//!
//! The widget never looks anything up globally: the host hands it an input
//! field and a message container. [`crate::transcript`] provides in-memory
//! implementations.

use std::fmt;

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Tag used in class names (`user-message`, `bot-message`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text input with a readable and clearable value.
pub trait InputField: Send + Sync {
    fn value(&self) -> String;
    fn clear(&self);
}

/// Handle to a rendered message, used to update it in place.
pub trait MessageElement: Send + Sync + 'static {
    fn set_text(&self, text: &str);
    /// Remove the pending ("thinking") marker.
    fn clear_pending(&self);
}

/// Container holding rendered messages.
///
/// Implementations are cheap handles onto shared state; clones refer to the
/// same container.
pub trait MessageContainer: Clone + Send + Sync + 'static {
    type Element: MessageElement;

    /// Create a message element and append it as the last child.
    fn append(&self, sender: Sender, text: &str, is_pending: bool) -> Self::Element;

    /// Scroll so that the newest child is visible.
    fn scroll_to_bottom(&self);
}

/// A form-submit interaction.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the host's default handling (navigation for an HTML form).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
