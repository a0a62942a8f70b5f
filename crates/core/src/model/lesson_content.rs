use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonContentError {
    #[error("video url is not a valid absolute url: {0}")]
    InvalidVideoUrl(String),

    #[error("article content cannot be empty")]
    EmptyArticle,

    #[error("duration cannot be negative")]
    NegativeDuration,

    #[error("unknown media type: {0}")]
    UnknownMediaType(String),
}

//
// ─── MEDIA TYPES ───────────────────────────────────────────────────────────────
//

/// The kinds of media a lesson can be made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonMediaType {
    Video,
    Article,
}

impl LessonMediaType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LessonMediaType::Video => "video",
            LessonMediaType::Article => "article",
        }
    }
}

impl fmt::Display for LessonMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonMediaType {
    type Err = LessonContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "article" => Ok(Self::Article),
            other => Err(LessonContentError::UnknownMediaType(other.to_owned())),
        }
    }
}

//
// ─── CONTENT ITEMS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoValue {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMeta {
    /// Length of the video in seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleValue {
    /// Markdown source of the article.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMeta {
    /// Estimated reading time in seconds.
    pub estimated_duration: f64,
}

/// One media block of a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LessonContentItem {
    Video { value: VideoValue, meta: VideoMeta },
    Article { value: ArticleValue, meta: ArticleMeta },
}

/// All media blocks of a lesson, in display order.
pub type LessonContent = Vec<LessonContentItem>;

impl LessonContentItem {
    #[must_use]
    pub fn media_type(&self) -> LessonMediaType {
        match self {
            LessonContentItem::Video { .. } => LessonMediaType::Video,
            LessonContentItem::Article { .. } => LessonMediaType::Article,
        }
    }

    /// Checks the item's values.
    ///
    /// # Errors
    ///
    /// Returns `LessonContentError` for an unparsable video url, an empty
    /// article or a negative duration.
    pub fn validate(&self) -> Result<(), LessonContentError> {
        match self {
            LessonContentItem::Video { value, meta } => {
                Url::parse(value.url.trim())
                    .map_err(|_| LessonContentError::InvalidVideoUrl(value.url.clone()))?;
                check_duration(meta.duration)
            }
            LessonContentItem::Article { value, meta } => {
                if value.content.trim().is_empty() {
                    return Err(LessonContentError::EmptyArticle);
                }
                check_duration(meta.estimated_duration)
            }
        }
    }
}

fn check_duration(seconds: f64) -> Result<(), LessonContentError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(())
    } else {
        Err(LessonContentError::NegativeDuration)
    }
}

/// Returns the first item of the given media type and its index.
#[must_use]
pub fn find_content_type(
    media_type: LessonMediaType,
    content: &[LessonContentItem],
) -> Option<(usize, &LessonContentItem)> {
    content
        .iter()
        .enumerate()
        .find(|(_, item)| item.media_type() == media_type)
}

/// Parses `raw` as a media type and reports whether it is one of `allowed`.
///
/// Returns `None` when `raw` does not name a media type at all.
#[must_use]
pub fn includes_media_type(
    allowed: &[LessonMediaType],
    raw: &str,
) -> Option<(bool, LessonMediaType)> {
    let media_type = raw.parse::<LessonMediaType>().ok()?;
    Some((allowed.contains(&media_type), media_type))
}
