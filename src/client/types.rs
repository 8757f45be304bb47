//! Catalog API records.
//!
//! Only the fields the client reads are modeled; unknown fields are
//! ignored and missing optional ones default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Locale preference for titles and descriptions.
const LOCALE_FALLBACK: [&str; 3] = ["en", "ja-ro", "ja"];

/// Locale → text, in the order upstream sent them.
pub type LocalizedString = Map<String, Value>;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaList {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub data: Vec<Manga>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Entity<T> {
    #[serde(default)]
    pub result: String,
    pub data: T,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Manga {
    pub id: String,
    #[serde(default)]
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MangaAttributes {
    pub title: LocalizedString,
    pub alt_titles: Vec<LocalizedString>,
    pub description: LocalizedString,
    pub status: Option<String>,
    pub year: Option<u32>,
    pub content_rating: Option<String>,
    pub last_chapter: Option<String>,
    pub tags: Vec<Tag>,
    pub available_translated_languages: Vec<Option<String>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tag {
    pub id: String,
    #[serde(default)]
    pub attributes: TagAttributes,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TagAttributes {
    pub name: LocalizedString,
    pub group: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<Value>,
}

impl Relationship {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.as_ref()?.get(name)?.as_str()
    }
}

impl Manga {
    /// Title in the preferred locale, falling back to any title.
    pub fn display_title(&self) -> &str {
        localized(&self.attributes.title).unwrap_or("Unknown Title")
    }

    pub fn display_description(&self) -> &str {
        localized(&self.attributes.description).unwrap_or("No description available")
    }

    /// File name of the expanded `cover_art` relationship.
    pub fn cover_file_name(&self) -> Option<&str> {
        self.relationships
            .iter()
            .filter(|rel| rel.kind == "cover_art")
            .find_map(|rel| rel.attribute("fileName"))
    }

    pub fn authors(&self) -> Vec<&str> {
        self.related_names("author")
    }

    pub fn artists(&self) -> Vec<&str> {
        self.related_names("artist")
    }

    fn related_names(&self, kind: &str) -> Vec<&str> {
        self.relationships
            .iter()
            .filter(|rel| rel.kind == kind)
            .filter_map(|rel| rel.attribute("name"))
            .collect()
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.attributes
            .tags
            .iter()
            .filter_map(|tag| localized(&tag.attributes.name))
            .collect()
    }
}

/// First non-empty preferred locale, else the first locale upstream listed.
fn localized<'a>(values: &'a LocalizedString) -> Option<&'a str> {
    let text = |value: &'a Value| -> Option<&'a str> { value.as_str().filter(|text| !text.is_empty()) };

    LOCALE_FALLBACK
        .iter()
        .find_map(|locale| values.get(*locale).and_then(text))
        .or_else(|| values.values().next().and_then(text))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChapterList {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub data: Vec<Chapter>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chapter {
    pub id: String,
    #[serde(default)]
    pub attributes: ChapterAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterAttributes {
    pub title: Option<String>,
    pub volume: Option<String>,
    pub chapter: Option<String>,
    pub pages: u32,
    pub translated_language: Option<String>,
    pub external_url: Option<String>,
    pub publish_at: Option<String>,
}

impl Chapter {
    /// Short label such as `Vol. 2 Ch. 13 - Title`.
    pub fn label(&self) -> String {
        let attrs = &self.attributes;
        let mut parts = Vec::new();
        if let Some(volume) = &attrs.volume {
            parts.push(format!("Vol. {volume}"));
        }
        match &attrs.chapter {
            Some(chapter) => parts.push(format!("Ch. {chapter}")),
            None => parts.push("Oneshot".to_string()),
        }
        let mut label = parts.join(" ");
        if let Some(title) = attrs.title.as_deref().filter(|t| !t.is_empty()) {
            label.push_str(" - ");
            label.push_str(title);
        }
        label
    }

    pub fn scanlation_group(&self) -> Option<&str> {
        self.relationships
            .iter()
            .filter(|rel| rel.kind == "scanlation_group")
            .find_map(|rel| rel.attribute("name"))
    }
}

/// Response of `at-home/server/{chapterId}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHome {
    #[serde(default)]
    pub result: String,
    pub base_url: String,
    pub chapter: AtHomeChapter,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeChapter {
    pub hash: String,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub data_saver: Vec<String>,
}
