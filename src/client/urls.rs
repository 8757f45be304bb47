//! Image URL conventions of the upstream image host.
//!
//! Covers: `/covers/<mangaId>/<fileName>.<size>.jpg`
//! Chapter pages: `<baseUrl>/<data|data-saver>/<chapterHash>/<fileName>`

use std::fmt;

use url::Url;

use crate::image::handler::URL_PARAM;

/// Default image host for covers.
pub const UPLOADS_BASE: &str = "https://uploads.mangadex.org";

/// Thumbnail sizes served by the image host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CoverSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl CoverSize {
    pub fn pixels(self) -> u32 {
        match self {
            CoverSize::Small => 256,
            CoverSize::Medium => 512,
            CoverSize::Large => 1024,
        }
    }
}

impl fmt::Display for CoverSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pixels())
    }
}

/// Thumbnail URL for a cover file.
pub fn cover_url(manga_id: &str, file_name: &str, size: CoverSize) -> String {
    format!("{UPLOADS_BASE}/covers/{manga_id}/{file_name}.{size}.jpg")
}

/// Cover URLs to try in order: the sized thumbnail, then the original in
/// the common formats.
pub fn cover_url_candidates(manga_id: &str, file_name: &str, size: CoverSize) -> Vec<String> {
    let base = format!("{UPLOADS_BASE}/covers/{manga_id}/{file_name}");
    vec![
        format!("{base}.{size}.jpg"),
        format!("{base}.jpg"),
        format!("{base}.png"),
        format!("{base}.webp"),
    ]
}

/// URL of a chapter page served by an at-home node.
pub fn chapter_page_url(
    base_url: &str,
    chapter_hash: &str,
    file_name: &str,
    data_saver: bool,
) -> String {
    let quality = if data_saver { "data-saver" } else { "data" };
    format!(
        "{}/{quality}/{chapter_hash}/{file_name}",
        base_url.trim_end_matches('/')
    )
}

/// Wrap an image URL so it is fetched through the relay's image proxy.
pub fn image_proxy_url(proxy_endpoint: &str, target: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(proxy_endpoint)?;
    url.query_pairs_mut().clear().append_pair(URL_PARAM, target);
    Ok(url)
}
