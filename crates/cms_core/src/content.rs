use std::io::Read;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nullable::Nullable;
use crate::Result;

/// Location of a media asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub url: String,
}

impl MediaReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// One article as returned by the content API.
///
/// `published_date` is kept exactly as the upstream source wrote it; see
/// [`Article::published_at`] for a parsed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub hero_image: Nullable<MediaReference>,
}

impl Article {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            subtitle: None,
            published_date: None,
            hero_image: Nullable::Absent,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_published_date(mut self, published_date: impl Into<String>) -> Self {
        self.published_date = Some(published_date.into());
        self
    }

    pub fn with_hero_image(mut self, hero_image: impl Into<Nullable<MediaReference>>) -> Self {
        self.hero_image = hero_image.into();
        self
    }

    pub fn hero_image_url(&self) -> Option<&str> {
        self.hero_image.as_option().map(|image| image.url.as_str())
    }

    /// Reads `publishedDate` as an RFC 3339 timestamp.
    ///
    /// Returns `None` when the field is missing or in some other format.
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.published_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw.trim()).ok()
    }
}

impl From<MediaReference> for Nullable<MediaReference> {
    fn from(value: MediaReference) -> Self {
        Nullable::Present(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticlesCollection {
    pub docs: Vec<Article>,
}

/// Envelope of a list-of-articles query.
///
/// The outer key is `Articles`, capitalized, exactly as the API sends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticlesQueryResponse {
    #[serde(rename = "Articles")]
    pub articles: ArticlesCollection,
}

impl ArticlesQueryResponse {
    pub fn new(docs: Vec<Article>) -> Self {
        Self {
            articles: ArticlesCollection { docs },
        }
    }

    pub fn from_json(payload: &str) -> Result<Self> {
        Self::from_slice(payload.as_bytes())
    }

    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        let response: Self = serde_json::from_slice(payload)?;
        debug!("Decoded {} articles", response.len());
        Ok(response)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let response: Self = serde_json::from_reader(reader)?;
        debug!("Decoded {} articles", response.len());
        Ok(response)
    }

    /// Articles in the order the query returned them.
    pub fn docs(&self) -> &[Article] {
        &self.articles.docs
    }

    pub fn into_docs(self) -> Vec<Article> {
        self.articles.docs
    }

    pub fn len(&self) -> usize {
        self.articles.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.docs.is_empty()
    }

    /// First article with the given slug.
    pub fn find_by_slug(&self, slug: &str) -> Option<&Article> {
        self.articles.docs.iter().find(|article| article.slug == slug)
    }
}
