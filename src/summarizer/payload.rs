//! Structured post payloads produced by the generation backend.

use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The value of one labeled section in a structured summary.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionValue {
    Text(String),
    Items(Vec<String>),
}

/// Body of a post: either free text or an ordered list of labeled sections.
/// Generation backends return either shape; the formatter and the scorer
/// both match on the tag instead of inspecting types at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryBody {
    Plain(String),
    Sections(Vec<(String, SectionValue)>),
}

impl Default for SummaryBody {
    fn default() -> Self {
        SummaryBody::Plain(String::new())
    }
}

impl SummaryBody {
    /// Flattens the body into a single searchable string. Labels, texts and
    /// list items are joined with spaces; used for keyword matching.
    pub fn flatten_text(&self) -> String {
        match self {
            SummaryBody::Plain(text) => text.clone(),
            SummaryBody::Sections(sections) => {
                let mut parts = Vec::new();
                for (label, value) in sections {
                    parts.push(label.clone());
                    match value {
                        SectionValue::Text(text) => parts.push(text.clone()),
                        SectionValue::Items(items) => parts.extend(items.iter().cloned()),
                    }
                }
                parts.join(" ")
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SummaryBody::Plain(text) => text.trim().is_empty(),
            SummaryBody::Sections(sections) => sections.is_empty(),
        }
    }

    /// Converts a JSON value into a body. Strings map to `Plain`; objects map
    /// to ordered `Sections` where each value is text, a list of strings, or
    /// a nested object (flattened into its values as list items).
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(text) => Ok(SummaryBody::Plain(text.clone())),
            Value::Object(map) => {
                let mut sections = Vec::with_capacity(map.len());
                for (label, val) in map {
                    sections.push((label.clone(), section_value(val)));
                }
                Ok(SummaryBody::Sections(sections))
            }
            other => Err(format!("unsupported summary shape: {}", other)),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn section_value(value: &Value) -> SectionValue {
    match value {
        Value::Array(items) => SectionValue::Items(items.iter().map(scalar_text).collect()),
        Value::Object(map) => {
            // Nested objects collapse into their leaf values.
            let mut items = Vec::new();
            for val in map.values() {
                match val {
                    Value::Array(inner) => items.extend(inner.iter().map(scalar_text)),
                    other => items.push(scalar_text(other)),
                }
            }
            SectionValue::Items(items)
        }
        other => SectionValue::Text(scalar_text(other)),
    }
}

impl<'de> Deserialize<'de> for SummaryBody {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        SummaryBody::from_value(&value).map_err(D::Error::custom)
    }
}

impl Serialize for SummaryBody {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            SummaryBody::Plain(text) => serializer.serialize_str(text),
            SummaryBody::Sections(sections) => {
                let mut map = serializer.serialize_map(Some(sections.len()))?;
                for (label, value) in sections {
                    match value {
                        SectionValue::Text(text) => map.serialize_entry(label, text)?,
                        SectionValue::Items(items) => map.serialize_entry(label, items)?,
                    }
                }
                map.end()
            }
        }
    }
}

/// Content ready for formatting: produced by the summarizer, consumed by the
/// message formatter.
#[derive(Debug, Clone, Serialize)]
pub struct PostPayload {
    pub title: String,
    pub body: SummaryBody,
    pub hashtags: String,
    /// Link to the original article; educational posts have none.
    pub link: Option<String>,
    pub image_url: Option<String>,
}

/// Raw shape of a generation response, before it becomes a payload.
#[derive(Debug, Deserialize)]
pub struct GeneratedPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: SummaryBody,
    #[serde(default)]
    pub hashtags: String,
}
