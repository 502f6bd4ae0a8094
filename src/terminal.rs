//! Terminal host for the widget.
//!
//! Each stdin line is one form submission. Transcript changes are printed to
//! stdout as they happen; replies may arrive in any order.

use std::collections::HashMap;
use std::future::Future;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use anyhow::Context;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tracing::{info, warn};

use crate::client::{ChatClient, HttpChatClient};
use crate::config::AppConfig;
use crate::dom::SubmitEvent;
use crate::transcript::{TextInput, Transcript, TranscriptEvent};
use crate::widget::{ChatWidget, Resolution};

/// Lines buffered between the reader thread and the submit loop.
const LINE_BUFFER: usize = 16;

/// Run the widget against stdin until EOF or Ctrl-C.
///
/// On EOF, in-flight replies are awaited before returning. On Ctrl-C they
/// are abandoned. If `html_out` is set, the final transcript is written
/// there as HTML.
pub async fn run(config: &AppConfig, html_out: Option<&Path>) -> anyhow::Result<()> {
    let client = HttpChatClient::new(&config.endpoint.base_url, &config.endpoint.chat_path)
        .context("Invalid chat endpoint")?;
    info!(endpoint = %client.endpoint(), "Chat widget ready");

    let input = TextInput::new();
    let transcript = Transcript::new();
    let widget = ChatWidget::new(input.clone(), transcript.clone(), client);

    let printer = tokio::spawn(print_events(transcript.subscribe()));

    let lines = spawn_line_reader(io::stdin()).context("Failed to start stdin reader")?;
    drive(&widget, &input, lines, tokio::signal::ctrl_c()).await?;

    if let Some(path) = html_out {
        tokio::fs::write(path, transcript.to_html())
            .await
            .with_context(|| format!("Failed to write transcript to {}", path.display()))?;
        info!(path = %path.display(), "Transcript written");
    }

    // The printer stops once every transcript handle is gone.
    drop(widget);
    drop(transcript);
    printer.await.context("Transcript printer panicked")?;
    Ok(())
}

/// Read lines on a dedicated OS thread and forward them over a channel.
///
/// A blocking read cannot be cancelled, so it must not live on the runtime's
/// blocking pool: the runtime would wait for it on shutdown. The thread is
/// detached and ends with the process, or once the receiver is dropped and
/// the next line arrives.
pub fn spawn_line_reader<R>(reader: R) -> io::Result<mpsc::Receiver<io::Result<String>>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in BufReader::new(reader).lines() {
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Feed `lines` into the widget until the channel closes or `shutdown`
/// completes.
///
/// When the input ends, in-flight replies are awaited unless `shutdown`
/// fires first; on shutdown they are aborted.
pub async fn drive<A, F>(
    widget: &ChatWidget<TextInput, Transcript, A>,
    input: &TextInput,
    mut lines: mpsc::Receiver<io::Result<String>>,
    shutdown: F,
) -> anyhow::Result<()>
where
    A: ChatClient + 'static,
    F: Future<Output = io::Result<()>>,
{
    let mut in_flight: JoinSet<Resolution> = JoinSet::new();
    tokio::pin!(shutdown);
    let mut interrupted = false;

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    break;
                };
                input.set_value(line.context("Failed to read input")?);
                if let Some(pending) = widget.begin_submission(&mut SubmitEvent::new()) {
                    in_flight.spawn(pending.resolve());
                }
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                settled(joined);
            }
            _ = &mut shutdown => {
                interrupted = true;
                break;
            }
        }
    }

    if !interrupted {
        tokio::select! {
            () = drain(&mut in_flight) => {}
            _ = &mut shutdown => interrupted = true,
        }
    }
    if interrupted {
        info!(abandoned = in_flight.len(), "Interrupted");
        in_flight.shutdown().await;
    }
    Ok(())
}

async fn drain(in_flight: &mut JoinSet<Resolution>) {
    while let Some(joined) = in_flight.join_next().await {
        settled(joined);
    }
}

/// Outcome of a finished submission task; a task that panicked is logged.
fn settled(joined: Result<Resolution, JoinError>) -> Option<Resolution> {
    joined
        .inspect_err(|err| warn!(error = %err, "Submission task failed"))
        .ok()
}

async fn print_events(mut events: broadcast::Receiver<TranscriptEvent>) {
    let mut view = EventView::default();
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(line) = view.line_for(&event) {
                    println!("{line}");
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Transcript output lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

/// Turns transcript events into output lines, skipping updates that do not
/// change a message's visible text.
#[derive(Debug, Default)]
struct EventView {
    shown: HashMap<usize, String>,
}

impl EventView {
    fn line_for(&mut self, event: &TranscriptEvent) -> Option<String> {
        let (index, message) = match event {
            TranscriptEvent::Appended { index, message }
            | TranscriptEvent::Updated { index, message } => (*index, message),
        };
        if self.shown.get(&index) == Some(&message.text) {
            return None;
        }
        self.shown.insert(index, message.text.clone());
        Some(format!("[{index}] {}> {}", message.sender, message.text))
    }
}
