//! Prompt content model shared by requests and responses.
//!
//! Content is either a plain string or an ordered list of [`ContentPart`]s. The wire
//! shape follows the OpenAI-style `{"type": "text" | "image_url", ...}` convention.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use base64::Engine;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use thiserror::Error;

const TEXT_TAG: &str = "text";
const IMAGE_URL_TAG: &str = "image_url";

/// Errors raised when JSON does not match the content part contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The `type` tag named a content part this client does not know.
    #[error("Unknown content part type: {tag}")]
    UnknownContentType {
        /// The offending tag value
        tag: String,
    },
    /// A required field was absent.
    #[error("Missing field `{field}` in {context}")]
    MissingField {
        /// Where the field was expected
        context: &'static str,
        /// Name of the missing field
        field: &'static str,
    },
    /// A field was present but had the wrong JSON type.
    #[error("Expected {expected} for {context}")]
    InvalidType {
        /// What was being decoded
        context: &'static str,
        /// The JSON type that was expected
        expected: &'static str,
    },
}

/// Errors that can occur when building an image reference from a local file.
#[derive(Debug, Error)]
pub enum ImageSourceError {
    /// Failed to read the image from disk
    #[error("Failed to read image: {0}")]
    FileReadError(#[from] std::io::Error),
    /// The file does not look like an image
    #[error("Invalid MIME type: {0}")]
    MimeTypeError(String),
}

/// Resolution hint attached to an image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    /// Let the consumer pick the resolution
    Auto,
    /// Low resolution
    Low,
    /// High resolution
    High,
    /// Any other value, kept verbatim
    #[serde(untagged)]
    Other(String),
}

impl ImageDetail {
    /// Returns the wire representation of the detail level.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::Low => "low",
            Self::High => "high",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for ImageDetail {
    fn from(value: &str) -> Self {
        match value {
            "auto" => Self::Auto,
            "low" => Self::Low,
            "high" => Self::High,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ImageDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image reference with an optional detail level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// URL of the image; may be a `data:` URL
    pub url: String,
    /// Optional resolution hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ImageDetail>,
}

impl ImageUrl {
    /// Creates an image reference without a detail level.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            detail: None,
        }
    }

    /// Sets the detail level.
    pub fn with_detail(mut self, detail: impl Into<ImageDetail>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Builds a `data:` URL image reference from a local image file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its MIME type is not an image type.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageSourceError> {
        let path = path.as_ref();
        let mime_type = mime_guess::from_path(path)
            .first()
            .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
            .ok_or_else(|| {
                ImageSourceError::MimeTypeError(format!("Unknown image type for {:?}", path))
            })?;

        let bytes = std::fs::read(path)?;
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Self::new(format!("data:{};base64,{}", mime_type, data)))
    }

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let object = value.as_object().ok_or(DecodeError::InvalidType {
            context: "image_url",
            expected: "an object",
        })?;

        let url = required_str(object, "image_url", "url")?;
        let detail = match object.get("detail") {
            None | Some(Value::Null) => None,
            Some(Value::String(detail)) => Some(ImageDetail::from(detail.as_str())),
            Some(_) => {
                return Err(DecodeError::InvalidType {
                    context: "image_url.detail",
                    expected: "a string",
                })
            }
        };

        Ok(Self {
            url: url.to_string(),
            detail,
        })
    }

    fn encode(&self) -> Value {
        let mut object = Map::new();
        object.insert("url".into(), Value::String(self.url.clone()));
        if let Some(detail) = &self.detail {
            object.insert("detail".into(), Value::String(detail.as_str().to_string()));
        }
        Value::Object(object)
    }
}

/// One discriminated unit of prompt content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// A text part
    Text {
        /// The text of the part
        text: String,
    },
    /// An image reference part
    Image {
        /// The referenced image
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates an image part.
    pub fn image(image_url: impl Into<ImageUrl>) -> Self {
        Self::Image {
            image_url: image_url.into(),
        }
    }

    /// Returns the wire tag of this part.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Text { .. } => TEXT_TAG,
            Self::Image { .. } => IMAGE_URL_TAG,
        }
    }

    /// Decodes a single content part from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownContentType`] for unrecognised tags, and
    /// [`DecodeError::MissingField`] or [`DecodeError::InvalidType`] when the part is
    /// not shaped as its tag requires.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        let object = value.as_object().ok_or(DecodeError::InvalidType {
            context: "content part",
            expected: "an object",
        })?;

        match required_str(object, "content part", "type")? {
            TEXT_TAG => {
                let text = required_str(object, "text content part", "text")?;
                Ok(Self::text(text))
            }
            IMAGE_URL_TAG => {
                let image_url = object.get("image_url").ok_or(DecodeError::MissingField {
                    context: "image content part",
                    field: "image_url",
                })?;
                Ok(Self::Image {
                    image_url: ImageUrl::decode(image_url)?,
                })
            }
            other => Err(DecodeError::UnknownContentType {
                tag: other.to_string(),
            }),
        }
    }

    /// Encodes this part into its wire representation.
    pub fn encode(&self) -> Value {
        match self {
            Self::Text { text } => json!({ "type": TEXT_TAG, "text": text }),
            Self::Image { image_url } => {
                json!({ "type": IMAGE_URL_TAG, "image_url": image_url.encode() })
            }
        }
    }
}

impl From<ImageUrl> for ContentPart {
    fn from(image_url: ImageUrl) -> Self {
        Self::Image { image_url }
    }
}

impl From<&str> for ImageUrl {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for ImageUrl {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl Serialize for ContentPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContentPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::decode(&value).map_err(de::Error::custom)
    }
}

/// The content of a prompt: a plain string or an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptContent {
    /// Shorthand for a single text part
    Text(String),
    /// Parts in presentation order
    Parts(Vec<ContentPart>),
}

impl PromptContent {
    /// Decodes content from a JSON string or array.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither a string nor an array, or if any
    /// element of the array is not a valid content part.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        match value {
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(ContentPart::decode)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Parts),
            _ => Err(DecodeError::InvalidType {
                context: "prompt content",
                expected: "a string or an array of content parts",
            }),
        }
    }

    /// Encodes content into a JSON string or array.
    pub fn encode(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Parts(parts) => Value::Array(parts.iter().map(ContentPart::encode).collect()),
        }
    }

    /// Returns `true` if the content contains at least one image part.
    pub fn is_multi_modal(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Parts(parts) => parts
                .iter()
                .any(|part| matches!(part, ContentPart::Image { .. })),
        }
    }

    /// Returns the content as a list of parts.
    ///
    /// String content is wrapped in a single text part; part lists are borrowed as-is.
    pub fn normalize(&self) -> Cow<'_, [ContentPart]> {
        match self {
            Self::Text(text) => Cow::Owned(vec![ContentPart::text(text.as_str())]),
            Self::Parts(parts) => Cow::Borrowed(parts.as_slice()),
        }
    }

    /// Returns the text of the content, joining text parts with newlines.
    ///
    /// Useful for token counting; image parts are skipped.
    pub fn text_only(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text.as_str()),
            Self::Parts(parts) => Cow::Owned(
                parts
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::Text { text } => Some(text.as_str()),
                        ContentPart::Image { .. } => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }
}

impl AsRef<PromptContent> for PromptContent {
    fn as_ref(&self) -> &PromptContent {
        self
    }
}

impl From<&str> for PromptContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PromptContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<ContentPart>> for PromptContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

impl Serialize for PromptContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PromptContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::decode(&value).map_err(de::Error::custom)
    }
}

/// Returns `true` if the prompt (envelope, input or bare content) contains an image.
pub fn is_multi_modal(prompt: impl AsRef<PromptContent>) -> bool {
    prompt.as_ref().is_multi_modal()
}

/// Normalizes content to a list of parts. See [`PromptContent::normalize`].
pub fn normalize_content(content: &PromptContent) -> Cow<'_, [ContentPart]> {
    content.normalize()
}

/// Extracts the text of the content. See [`PromptContent::text_only`].
pub fn text_content(content: &PromptContent) -> Cow<'_, str> {
    content.text_only()
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    context: &'static str,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(DecodeError::MissingField { context, field }),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(DecodeError::InvalidType {
            context,
            expected: "a string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str) -> ContentPart {
        ContentPart::image(ImageUrl::new(url))
    }

    #[test]
    fn text_part_encodes_with_tag() {
        assert_eq!(
            ContentPart::text("Hello").encode(),
            json!({ "type": "text", "text": "Hello" })
        );
    }

    #[test]
    fn image_part_omits_missing_detail() {
        let encoded = image("https://example.com/img.png").encode();
        assert_eq!(
            encoded,
            json!({ "type": "image_url", "image_url": { "url": "https://example.com/img.png" } })
        );
        assert!(encoded["image_url"].get("detail").is_none());
    }

    #[test]
    fn image_part_keeps_detail() {
        let part = ContentPart::decode(&json!({
            "type": "image_url",
            "image_url": { "url": "https://example.com/img.png", "detail": "low" }
        }))
        .unwrap();

        assert_eq!(
            part,
            ContentPart::image(ImageUrl::new("https://example.com/img.png").with_detail("low"))
        );
        assert_eq!(part.encode()["image_url"]["detail"], "low");
    }

    #[test]
    fn unknown_detail_passes_through() {
        let value = json!({
            "type": "image_url",
            "image_url": { "url": "u", "detail": "ultra" }
        });
        let part = ContentPart::decode(&value).unwrap();
        match &part {
            ContentPart::Image { image_url } => {
                assert_eq!(image_url.detail, Some(ImageDetail::Other("ultra".into())))
            }
            other => panic!("unexpected part: {:?}", other),
        }
        assert_eq!(part.encode(), value);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = ContentPart::decode(&json!({ "type": "bogus" })).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownContentType {
                tag: "bogus".into()
            }
        );
    }

    #[test]
    fn missing_fields_are_rejected() {
        assert_eq!(
            ContentPart::decode(&json!({ "type": "text" })).unwrap_err(),
            DecodeError::MissingField {
                context: "text content part",
                field: "text"
            }
        );
        assert_eq!(
            ContentPart::decode(&json!({ "text": "no tag" })).unwrap_err(),
            DecodeError::MissingField {
                context: "content part",
                field: "type"
            }
        );
        assert!(matches!(
            ContentPart::decode(&json!({ "type": "image_url", "image_url": {} })),
            Err(DecodeError::MissingField { field: "url", .. })
        ));
        assert!(matches!(
            ContentPart::decode(&json!({ "type": "image_url" })),
            Err(DecodeError::MissingField {
                field: "image_url",
                ..
            })
        ));
    }

    #[test]
    fn content_round_trips_in_order() {
        let content = PromptContent::Parts(vec![
            ContentPart::text("Analyze this image:"),
            ContentPart::image(ImageUrl::new("https://example.com/a.png").with_detail(ImageDetail::High)),
            image("https://example.com/b.png"),
            ContentPart::text("Thanks"),
        ]);

        let decoded = PromptContent::decode(&content.encode()).unwrap();
        assert_eq!(decoded, content);

        let text = PromptContent::from("Hello {{name}}");
        assert_eq!(text.encode(), json!("Hello {{name}}"));
        assert_eq!(PromptContent::decode(&text.encode()).unwrap(), text);
    }

    #[test]
    fn content_rejects_other_json_types() {
        assert!(matches!(
            PromptContent::decode(&json!(42)),
            Err(DecodeError::InvalidType { .. })
        ));
        assert!(matches!(
            PromptContent::decode(&json!([{ "type": "text", "text": "ok" }, { "type": "audio" }])),
            Err(DecodeError::UnknownContentType { .. })
        ));
    }

    #[test]
    fn serde_uses_the_same_wire_shape() {
        let content: PromptContent = serde_json::from_str(
            r#"[{"type":"text","text":"Describe:"},{"type":"image_url","image_url":{"url":"u","detail":"auto"}}]"#,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!([
                { "type": "text", "text": "Describe:" },
                { "type": "image_url", "image_url": { "url": "u", "detail": "auto" } }
            ])
        );

        let err = serde_json::from_str::<ContentPart>(r#"{"type":"bogus"}"#).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn multi_modal_detection() {
        assert!(!is_multi_modal(PromptContent::from("Hello {{name}}")));
        assert!(!is_multi_modal(PromptContent::from(vec![
            ContentPart::text("First part"),
            ContentPart::text("Second part"),
        ])));
        assert!(is_multi_modal(PromptContent::from(vec![
            ContentPart::text("Look at this:"),
            image("https://example.com/img.png"),
        ])));
        assert!(!is_multi_modal(PromptContent::Parts(Vec::new())));
    }

    #[test]
    fn normalize_wraps_strings_and_borrows_parts() {
        let text = PromptContent::from("hi");
        let normalized = normalize_content(&text);
        assert!(matches!(normalized, Cow::Owned(_)));
        assert_eq!(normalized.as_ref(), [ContentPart::text("hi")].as_slice());

        let parts = PromptContent::from(vec![
            ContentPart::text("Part 1"),
            image("https://example.com/img.png"),
        ]);
        let normalized = normalize_content(&parts);
        match (&parts, &normalized) {
            (PromptContent::Parts(original), Cow::Borrowed(slice)) => {
                assert!(std::ptr::eq(original.as_slice(), *slice))
            }
            _ => panic!("expected borrowed parts"),
        }
    }

    #[test]
    fn text_only_joins_text_parts() {
        assert_eq!(text_content(&"Hello {{name}}".into()), "Hello {{name}}");

        let content = PromptContent::from(vec![
            ContentPart::text("First"),
            image("https://example.com/img.png"),
            ContentPart::text("Second"),
        ]);
        assert_eq!(text_content(&content), "First\nSecond");

        let images_only = PromptContent::from(vec![image("https://example.com/img.png")]);
        assert_eq!(text_content(&images_only), "");
    }

    #[test]
    fn image_from_path_builds_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let image_url = ImageUrl::from_path(&path).unwrap();
        assert_eq!(image_url.url, "data:image/png;base64,iVBORw==");
        assert_eq!(image_url.detail, None);
    }

    #[test]
    fn image_from_path_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        assert!(matches!(
            ImageUrl::from_path(&path),
            Err(ImageSourceError::MimeTypeError(_))
        ));
    }
}
