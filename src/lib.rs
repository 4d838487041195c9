#![deny(missing_docs)]

//! A Rust client library for the Prompt Library Protocol (PLP).
//!
//! This library stores and retrieves versioned prompt templates on a Prompt Library
//! server. Prompts are identified by a path-like key (e.g. `marketing/welcome-email`)
//! and their content is either plain text or a list of text and image parts.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod transport;

pub use client::PromptLibraryClient;
pub use config::ClientConfig;
pub use error::PromptLibraryError;
pub use models::{
    is_multi_modal, normalize_content, text_content, ContentPart, ImageDetail, ImageUrl,
    PromptContent, PromptEnvelope, PromptInput,
};
