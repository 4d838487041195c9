//! Prompt records exchanged with the Prompt Library service.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::PromptContent;
use crate::error::PromptLibraryError;

/// Free-form prompt metadata.
pub type Meta = Map<String, Value>;

/// A prompt as stored by the service, including its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptEnvelope {
    /// The prompt identifier (e.g. "marketing/welcome-email")
    pub id: String,
    /// The prompt content
    pub content: PromptContent,
    /// Metadata attached to the prompt
    pub meta: Meta,
}

impl PromptEnvelope {
    /// Creates an envelope from its parts.
    pub fn new(id: impl Into<String>, content: impl Into<PromptContent>, meta: Meta) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            meta,
        }
    }

    /// Decodes an envelope returned by the service.
    ///
    /// # Errors
    ///
    /// Returns [`PromptLibraryError::MalformedResponse`] if `id` or `content` is missing
    /// or `meta` is not an object, and [`PromptLibraryError::Decode`] if the content does
    /// not match the content model.
    pub fn decode(value: &Value) -> Result<Self, PromptLibraryError> {
        let object = value
            .as_object()
            .ok_or_else(|| PromptLibraryError::malformed("expected a prompt envelope object"))?;

        let id = object
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| PromptLibraryError::malformed("prompt envelope is missing `id`"))?;

        let content = match object.get("content") {
            None | Some(Value::Null) => {
                return Err(PromptLibraryError::malformed(
                    "prompt envelope is missing `content`",
                ))
            }
            Some(content) => PromptContent::decode(content)?,
        };

        let meta = match object.get("meta") {
            None | Some(Value::Null) => Meta::new(),
            Some(Value::Object(meta)) => meta.clone(),
            Some(_) => {
                return Err(PromptLibraryError::malformed(
                    "prompt envelope `meta` must be an object",
                ))
            }
        };

        Ok(Self {
            id: id.to_string(),
            content,
            meta,
        })
    }

    /// Encodes the envelope into its wire representation.
    pub fn encode(&self) -> Value {
        json!({
            "id": self.id,
            "content": self.content.encode(),
            "meta": self.meta,
        })
    }

    /// Returns the `version` metadata entry, if the service set one.
    pub fn version(&self) -> Option<&str> {
        self.meta.get("version").and_then(Value::as_str)
    }

    /// Returns `true` if the content contains at least one image part.
    pub fn is_multi_modal(&self) -> bool {
        self.content.is_multi_modal()
    }
}

impl AsRef<PromptContent> for PromptEnvelope {
    fn as_ref(&self) -> &PromptContent {
        &self.content
    }
}

impl fmt::Display for PromptEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PromptEnvelope(id='{}', version={})",
            self.id,
            self.version().unwrap_or("latest")
        )
    }
}

impl Serialize for PromptEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PromptEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::decode(&value).map_err(de::Error::custom)
    }
}

/// Content and metadata for creating or updating a prompt.
///
/// The identifier is not part of the input; it is the target of the write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptInput {
    /// The prompt content
    pub content: PromptContent,
    /// Metadata to store with the prompt
    pub meta: Meta,
}

impl PromptInput {
    /// Creates an input with empty metadata.
    pub fn new(content: impl Into<PromptContent>) -> Self {
        Self::with_meta(content, Meta::new())
    }

    /// Creates an input with the given metadata.
    pub fn with_meta(content: impl Into<PromptContent>, meta: Meta) -> Self {
        Self {
            content: content.into(),
            meta,
        }
    }

    /// Adds a single metadata entry.
    pub fn meta_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Encodes the input into the request body of a write.
    pub fn encode(&self) -> Value {
        json!({
            "content": self.content.encode(),
            "meta": self.meta,
        })
    }
}

impl AsRef<PromptContent> for PromptInput {
    fn as_ref(&self) -> &PromptContent {
        &self.content
    }
}
