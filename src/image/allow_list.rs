//! Image host allow-list.
//!
//! Hostnames are compared by exact string equality. No suffix, subdomain
//! or wildcard matching.

use std::collections::HashSet;

use url::Url;

use crate::image::error::ImageError;

/// Immutable set of hostnames images may be fetched from.
#[derive(Debug, Clone)]
pub struct AllowList {
    hosts: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|host| host.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    /// Validate a raw `url` parameter, in order: present, absolute URL,
    /// allow-listed host.
    pub fn check(&self, raw: Option<&str>) -> Result<Url, ImageError> {
        let raw = raw
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(ImageError::MissingUrl)?;

        let url = Url::parse(raw).map_err(|_| ImageError::InvalidUrl)?;

        match url.host_str() {
            Some(host) if self.contains(host) => Ok(url),
            host => Err(ImageError::HostNotAllowed(host.unwrap_or_default().to_string())),
        }
    }
}
