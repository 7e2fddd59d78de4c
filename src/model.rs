// Local records built from the LMS "direct" JSON endpoints, plus the serde
// shapes of those endpoints. Deserialization fails on a missing key, and the
// error names the key.

use percent_encoding::percent_decode_str;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{PandaError, Result};

/// Number of leading container segments that do not belong to the local
/// directory layout.
///
/// PANDA containers look like `/content/group/<site>/<folder>/...`, so the
/// first folder below the site is dropped too. Files with the same name in
/// two such folders map to the same local path and the later one overwrites
/// the earlier; the downloader reports these in `DownloadReport::overwritten`.
pub const CONTAINER_PREFIX_SEGMENTS: usize = 4;

/// A course or project workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub site_id: String,
    pub name: String,
    /// "course", "project", "portfolio", ...
    pub site_type: String,
}

/// A downloadable file: a site resource or an assignment attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PandaFile {
    pub filename: String,
    /// Target directory relative to the download root.
    pub directory: String,
    pub size: Option<u64>,
    /// URL path used to fetch the content.
    pub path: String,
}

impl PandaFile {
    pub fn ext(&self) -> Option<&str> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
    }

    pub fn local_path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.filename)
    }
}

#[derive(Deserialize, Debug)]
pub struct SiteRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub site_type: String,
    pub title: String,
}

/// Body of `direct/site/{id}.json`; the id is taken from the request.
#[derive(Deserialize, Debug)]
pub struct SiteDetail {
    #[serde(rename = "type")]
    pub site_type: String,
    pub title: String,
}

#[derive(Deserialize, Debug)]
pub struct SiteCollection {
    pub site_collection: Vec<SiteRecord>,
}

#[derive(Deserialize, Debug)]
pub struct ContentRecord {
    pub container: String,
    pub url: String,
    #[serde(deserialize_with = "integer_or_string")]
    pub size: u64,
}

#[derive(Deserialize, Debug)]
pub struct ContentCollection {
    pub content_collection: Vec<ContentRecord>,
}

#[derive(Deserialize, Debug)]
pub struct AttachmentRecord {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize, Debug)]
pub struct AssignmentRecord {
    pub title: String,
    pub attachments: Vec<AttachmentRecord>,
}

#[derive(Deserialize, Debug)]
pub struct AssignmentCollection {
    pub assignment_collection: Vec<AssignmentRecord>,
}

fn integer_or_string<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Int(u64),
        Text(String),
    }

    match Size::deserialize(deserializer)? {
        Size::Int(n) => Ok(n),
        Size::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

impl From<SiteRecord> for Site {
    fn from(record: SiteRecord) -> Self {
        Site {
            site_id: record.id,
            name: record.title,
            site_type: record.site_type,
        }
    }
}

impl Site {
    pub fn from_detail(site_id: &str, detail: SiteDetail) -> Self {
        Site {
            site_id: site_id.to_string(),
            name: detail.title,
            site_type: detail.site_type,
        }
    }
}

/// Path component of an absolute or relative URL, without query or fragment.
pub fn url_path(raw: &str) -> Result<String> {
    match Url::parse(raw) {
        Ok(url) => Ok(url.path().to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Ok(raw.split(['?', '#']).next().unwrap_or_default().to_string())
        }
        Err(source) => Err(PandaError::InvalidUrl {
            url: raw.to_string(),
            source,
        }),
    }
}

fn container_directory(container: &str) -> String {
    container
        .split('/')
        .filter(|s| !s.is_empty())
        .skip(CONTAINER_PREFIX_SEGMENTS)
        .collect::<Vec<_>>()
        .join("/")
}

impl PandaFile {
    pub fn from_content(record: &ContentRecord) -> Result<Self> {
        let path = url_path(&record.url)?;
        let last = path.rsplit('/').next().unwrap_or_default();
        let filename = percent_decode_str(last).decode_utf8_lossy().into_owned();
        Ok(PandaFile {
            filename,
            directory: container_directory(&record.container),
            size: Some(record.size),
            path,
        })
    }

    pub fn from_assignment(assignment: &AssignmentRecord) -> Result<Vec<Self>> {
        assignment
            .attachments
            .iter()
            .map(|attachment| {
                Ok(PandaFile {
                    filename: attachment.name.clone(),
                    directory: format!("assignments/{}", assignment.title),
                    size: None,
                    path: url_path(&attachment.url)?,
                })
            })
            .collect()
    }
}
