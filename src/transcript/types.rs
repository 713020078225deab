//! Transcript record types.
//!
//! Each line of a transcript is one [`Message`], discriminated by its `type`
//! field (`user`, `assistant` or `file-snapshot`):
//!
//! ```json
//! {"type":"user","id":"m1","streamId":"s1","timestamp":"2025-01-20T10:00:00Z","parentId":null,"message":{"role":"user","content":"hi"},"workingDirectory":"/home/me/proj","clientVersion":"1.0.0"}
//! ```
//!
//! Assistant records come in two layouts that are told apart by which
//! container is present, never by a version tag:
//!
//! - `snapshot`: a single `reasoning` blob plus flat `{role, text}` entries
//! - `response`: model/usage metadata plus a list of tagged content blocks
//!
//! [`detect_representation`] runs once at decode time and the result is kept
//! as [`AssistantContent`], so downstream code matches on an enum instead of
//! probing fields again. Fields this crate does not know about are carried in
//! `extra` maps and written back unchanged.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire key of the legacy assistant container.
pub const LEGACY_KEY: &str = "snapshot";
/// Wire key of the block-based assistant container.
pub const BLOCKS_KEY: &str = "response";

/// The three record kinds found in a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    User,
    Assistant,
    Snapshot,
}

impl RecordKind {
    /// Wire value of the `type` discriminator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Snapshot => "file-snapshot",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "file-snapshot" => Ok(Self::Snapshot),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

/// Reasons a parsed JSON object is not a usable record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing or non-string `{0}` field")]
    MissingField(&'static str),

    #[error("unknown record type `{0}`")]
    UnknownKind(String),

    #[error("assistant record {id} has neither `snapshot` nor `response` content")]
    MissingRepresentation { id: String },

    #[error("assistant record {id} has both `snapshot` and `response` content")]
    AmbiguousRepresentation { id: String },

    #[error("invalid {kind} record {id}: {message}")]
    Shape {
        kind: RecordKind,
        id: String,
        message: String,
    },
}

// ============================================
// Common envelope
// ============================================

/// Fields shared by every record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub id: String,
    pub stream_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_branch: Option<bool>,
}

// ============================================
// User records
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContent {
    #[serde(default = "default_user_role")]
    pub role: String,
    pub content: String,
}

fn default_user_role() -> String {
    "user".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub message: UserContent,
    pub working_directory: String,
    #[serde(default)]
    pub client_version: String,
    /// Name of the side conversation this record belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================
// Assistant records
// ============================================

/// Which container an assistant record stores its content in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// `snapshot`: one reasoning blob plus flat entries.
    Legacy,
    /// `response`: tagged content blocks.
    Blocks,
}

/// Decide which content layout an assistant object uses.
///
/// # Errors
///
/// Returns [`ModelError::MissingRepresentation`] when neither container is
/// present and [`ModelError::AmbiguousRepresentation`] when both are.
pub fn detect_representation(
    object: &Map<String, Value>,
    id: &str,
) -> Result<Representation, ModelError> {
    match (object.contains_key(LEGACY_KEY), object.contains_key(BLOCKS_KEY)) {
        (true, false) => Ok(Representation::Legacy),
        (false, true) => Ok(Representation::Blocks),
        (false, false) => Err(ModelError::MissingRepresentation { id: id.to_string() }),
        (true, true) => Err(ModelError::AmbiguousRepresentation { id: id.to_string() }),
    }
}

/// One `{role, text}` pair of a legacy assistant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyEntry {
    pub role: String,
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Legacy layout: a single reasoning blob plus flat entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyContent {
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub entries: Vec<LegacyEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Current layout: model response metadata plus tagged blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
    pub blocks: Vec<ContentBlock>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Free text carried by a `text` or `reasoning` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tagged content block.
///
/// Only `text` and `reasoning` blocks are interpreted. Every other tag
/// (tool invocations, tool results, images, ...) is kept as the raw JSON
/// value so it is written back exactly as it was read.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(TextBlock),
    Reasoning(TextBlock),
    Other(Value),
}

impl ContentBlock {
    pub const TEXT_TAG: &'static str = "text";
    pub const REASONING_TAG: &'static str = "reasoning";

    /// The block's `tag` value, if it has one.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Text(_) => Some(Self::TEXT_TAG),
            Self::Reasoning(_) => Some(Self::REASONING_TAG),
            Self::Other(value) => value.get("tag").and_then(Value::as_str),
        }
    }

    /// Build a text block with no extra fields.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextBlock {
            text: text.into(),
            extra: Map::new(),
        })
    }

    /// Build a reasoning block with no extra fields.
    #[must_use]
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::Reasoning(TextBlock {
            text: text.into(),
            extra: Map::new(),
        })
    }
}

#[derive(Serialize)]
struct TaggedBlock<'a> {
    tag: &'static str,
    #[serde(flatten)]
    block: &'a TextBlock,
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(block) => TaggedBlock {
                tag: Self::TEXT_TAG,
                block,
            }
            .serialize(serializer),
            Self::Reasoning(block) => TaggedBlock {
                tag: Self::REASONING_TAG,
                block,
            }
            .serialize(serializer),
            Self::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let tag = value.get("tag").and_then(Value::as_str).map(str::to_owned);

        let text_block = |mut value: Value| -> Result<TextBlock, D::Error> {
            if let Some(object) = value.as_object_mut() {
                object.remove("tag");
            }
            serde_json::from_value(value).map_err(de::Error::custom)
        };

        match tag.as_deref() {
            Some(Self::TEXT_TAG) => text_block(value).map(Self::Text),
            Some(Self::REASONING_TAG) => text_block(value).map(Self::Reasoning),
            _ => Ok(Self::Other(value)),
        }
    }
}

/// Assistant content in one of its two layouts.
///
/// Serialized as the single container key (`snapshot` or `response`) it
/// was read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AssistantContent {
    #[serde(rename = "snapshot")]
    Legacy(LegacyContent),
    #[serde(rename = "response")]
    Blocks(BlockResponse),
}

impl AssistantContent {
    #[must_use]
    pub const fn representation(&self) -> Representation {
        match self {
            Self::Legacy(_) => Representation::Legacy,
            Self::Blocks(_) => Representation::Blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantRecord {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(flatten)]
    pub content: AssistantContent,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope and unknown fields of an assistant record, decoded after the
/// content container has been taken out.
#[derive(Deserialize)]
struct AssistantRest {
    #[serde(flatten)]
    envelope: Envelope,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

// ============================================
// File snapshot records
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFile {
    pub path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSnapshot {
    #[serde(default)]
    pub entries: Vec<TrackedFile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub snapshot: FileSnapshot,
    /// `true` when this record updates an earlier snapshot instead of
    /// replacing it.
    #[serde(default)]
    pub is_update: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================
// Message
// ============================================

/// Tagged union for transcript records.
///
/// The serde tag attribute makes each line look like
/// `{"type":"assistant","id":"m2",...}`. Decoding goes through
/// [`Message::from_value`], which validates the common fields and picks the
/// assistant layout before any typed decoding happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "user")]
    User(UserRecord),
    #[serde(rename = "assistant")]
    Assistant(AssistantRecord),
    #[serde(rename = "file-snapshot")]
    Snapshot(SnapshotRecord),
}

impl Message {
    /// Decode one parsed JSON line into a record.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] if the value is not an object, lacks `id`,
    /// `streamId` or a known `type`, has no (or two) assistant content
    /// containers, or has fields of the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        let Value::Object(mut object) = value else {
            return Err(ModelError::NotAnObject);
        };

        let id = match object.get("id") {
            Some(Value::String(id)) => id.clone(),
            _ => return Err(ModelError::MissingField("id")),
        };
        if !matches!(object.get("streamId"), Some(Value::String(_))) {
            return Err(ModelError::MissingField("streamId"));
        }
        let kind: RecordKind = match object.remove("type") {
            Some(Value::String(tag)) => tag.parse()?,
            _ => return Err(ModelError::MissingField("type")),
        };

        let shape = |err: serde_json::Error| ModelError::Shape {
            kind,
            id: id.clone(),
            message: err.to_string(),
        };

        match kind {
            RecordKind::User => serde_json::from_value(Value::Object(object))
                .map(Self::User)
                .map_err(shape),
            RecordKind::Snapshot => serde_json::from_value(Value::Object(object))
                .map(Self::Snapshot)
                .map_err(shape),
            RecordKind::Assistant => {
                let content = match detect_representation(&object, &id)? {
                    Representation::Legacy => {
                        let raw = object.remove(LEGACY_KEY).unwrap_or(Value::Null);
                        AssistantContent::Legacy(serde_json::from_value(raw).map_err(shape)?)
                    }
                    Representation::Blocks => {
                        let raw = object.remove(BLOCKS_KEY).unwrap_or(Value::Null);
                        AssistantContent::Blocks(serde_json::from_value(raw).map_err(shape)?)
                    }
                };
                let rest: AssistantRest =
                    serde_json::from_value(Value::Object(object)).map_err(shape)?;
                Ok(Self::Assistant(AssistantRecord {
                    envelope: rest.envelope,
                    content,
                    extra: rest.extra,
                }))
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::User(_) => RecordKind::User,
            Self::Assistant(_) => RecordKind::Assistant,
            Self::Snapshot(_) => RecordKind::Snapshot,
        }
    }

    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        match self {
            Self::User(record) => &record.envelope,
            Self::Assistant(record) => &record.envelope,
            Self::Snapshot(record) => &record.envelope,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.envelope().id
    }

    #[must_use]
    pub fn stream_id(&self) -> &str {
        &self.envelope().stream_id
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.envelope().parent_id.as_deref()
    }

    /// A copy of this message with its envelope replaced.
    #[must_use]
    pub fn with_envelope(&self, envelope: Envelope) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            Self::User(record) => record.envelope = envelope,
            Self::Assistant(record) => record.envelope = envelope,
            Self::Snapshot(record) => record.envelope = envelope,
        }
        copy
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}
