//! HTML rendering of the transcript.
//!
//! Produces the markup a browser document would hold for the chat box:
//! one `div.chat-message` per entry, tagged `user-message` or `bot-message`,
//! plus `thinking` while a reply is pending.

use std::fmt::Write;

use crate::transcript::Message;

/// Render a single message element.
pub fn render_message(message: &Message) -> String {
    let mut class = format!("chat-message {}-message", message.sender);
    if message.is_pending {
        class.push_str(" thinking");
    }
    format!(
        r#"<div class="{class}">{text}</div>"#,
        text = escape_html(&message.text)
    )
}

/// Render the whole chat box.
pub fn render_transcript(messages: &[Message]) -> String {
    let mut html = String::from("<div id=\"chat-box\">\n");
    for message in messages {
        // Writing to a String cannot fail.
        let _ = writeln!(html, "  {}", render_message(message));
    }
    html.push_str("</div>\n");
    html
}

/// Escape text for use as element content or a quoted attribute value.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Sender;

    fn message(sender: Sender, text: &str, is_pending: bool) -> Message {
        Message {
            sender,
            text: text.to_string(),
            is_pending,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_message_classes() {
        assert_eq!(
            render_message(&message(Sender::User, "hi", false)),
            r#"<div class="chat-message user-message">hi</div>"#
        );
        assert_eq!(
            render_message(&message(Sender::Bot, "Thinking...", true)),
            r#"<div class="chat-message bot-message thinking">Thinking...</div>"#
        );
    }

    #[test]
    fn test_transcript_markup_is_text_only() {
        let html = render_transcript(&[
            message(Sender::User, "<script>alert(1)</script>", false),
            message(Sender::Bot, "**bold**", false),
        ]);
        assert!(html.starts_with("<div id=\"chat-box\">"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(">**bold**<"));
        assert_eq!(html.matches("chat-message").count(), 2);
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(render_transcript(&[]), "<div id=\"chat-box\">\n</div>\n");
    }
}
