//! Data structures for the Prompt Library requests and responses.

mod content;
mod prompt;

pub use content::{
    is_multi_modal, normalize_content, text_content, ContentPart, DecodeError, ImageDetail,
    ImageSourceError, ImageUrl, PromptContent,
};
pub use prompt::{Meta, PromptEnvelope, PromptInput};
