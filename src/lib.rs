//! Chat widget
//!
//! A minimal chat widget: it echoes what the user submits into a transcript,
//! shows a "Thinking..." placeholder, posts the message to a chat endpoint and
//! replaces the placeholder with the reply or a fixed error text.
//!
//! # Architecture
//!
//! - **Widget**: submission lifecycle over injected document collaborators
//! - **Client**: `POST /api/chat` over reqwest behind the [`client::ChatClient`] trait
//! - **Document**: in-memory input and transcript with scroll tracking and HTML rendering
//! - **Host**: terminal front end driving the widget from stdin
//!
//! # Modules
//!
//! - [`widget`]: [`widget::ChatWidget`] and the submission state machine
//! - [`dom`]: collaborator traits and the submit event
//! - [`transcript`]: in-memory implementations of the collaborators
//! - [`client`]: chat endpoint client
//! - [`protocol`]: request and response bodies
//! - [`render`]: transcript to HTML

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod client;
pub mod config;
pub mod dom;
pub mod error;
pub mod protocol;
pub mod render;
pub mod telemetry;
pub mod terminal;
pub mod transcript;
pub mod widget;

pub use error::ChatError;
pub use widget::{ChatWidget, Resolution};
