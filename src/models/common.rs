use serde::{Deserialize, Serialize};

use crate::error::{MediaError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}

impl ModelList {
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|model| model.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Name of the response field carrying this kind of media.
    pub fn field(&self) -> &'static str {
        match self {
            MediaKind::Image => "b64_json",
            MediaKind::Video => "video",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            MediaKind::Image => "/v1/images/generations",
            MediaKind::Video => "/v1/video/generations",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl MediaItem {
    pub fn payload(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Image => self.b64_json.as_deref(),
            MediaKind::Video => self.video.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub data: Vec<MediaItem>,
}

impl GenerationResponse {
    /// The first item's media payload. Further items are ignored.
    pub fn first_payload(&self, kind: MediaKind) -> Result<&str> {
        let item = self.data.first().ok_or_else(|| {
            MediaError::UnexpectedResponse("response contains no data items".into())
        })?;

        item.payload(kind).ok_or_else(|| {
            MediaError::UnexpectedResponse(format!("data[0] has no '{}' field", kind.field()))
        })
    }
}
