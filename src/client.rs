// Blocking client for the PANDA "direct" REST endpoints and for file content.
// Every request carries the session cookie; nothing else is stateful.

use reqwest::blocking::Client;
use reqwest::header::COOKIE;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{PandaError, Result};
use crate::model::{
    AssignmentCollection, ContentCollection, PandaFile, Site, SiteCollection, SiteDetail,
};
use crate::page::{PageScraper, PandaScraper};
use crate::session::Session;

/// Anything that can produce the bytes behind a file path.
pub trait ContentSource {
    fn download_content(&self, path: &str) -> Result<Vec<u8>>;
}

pub struct PandaClient<S = PandaScraper> {
    client: Client,
    config: Config,
    session: Session,
    scraper: S,
}

impl PandaClient<PandaScraper> {
    pub fn new(config: Config, session: Session) -> Result<Self> {
        Self::with_scraper(config, session, PandaScraper::new())
    }
}

impl<S: PageScraper> PandaClient<S> {
    pub fn with_scraper(config: Config, session: Session, scraper: S) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| PandaError::http(config.base_url.as_str(), e))?;
        Ok(PandaClient {
            client,
            config,
            session,
            scraper,
        })
    }

    fn url(&self, relative: &str) -> Result<Url> {
        self.config
            .base_url
            .join(relative)
            .map_err(|source| PandaError::InvalidUrl {
                url: relative.to_string(),
                source,
            })
    }

    /// GET a path relative to the LMS root and return the raw body.
    fn get(&self, relative: &str) -> Result<Vec<u8>> {
        let url = self.url(relative)?;
        debug!(url = %url, "GET");
        let res = self
            .client
            .get(url.clone())
            .header(COOKIE, self.session.header_value())
            .send()
            .map_err(|e| PandaError::http(url.as_str(), e))?;
        if !res.status().is_success() {
            return Err(PandaError::Status {
                url: url.to_string(),
                status: res.status(),
            });
        }
        let body = res.bytes().map_err(|e| PandaError::http(url.as_str(), e))?;
        Ok(body.to_vec())
    }

    fn get_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T> {
        let body = self.get(relative)?;
        serde_json::from_slice(&body).map_err(|source| PandaError::Json {
            what: relative.to_string(),
            source,
        })
    }

    pub fn fetch_site(&self, site_id: &str) -> Result<Site> {
        let detail: SiteDetail = self.get_json(&format!("direct/site/{site_id}.json"))?;
        Ok(Site::from_detail(site_id, detail))
    }

    pub fn fetch_sites(&self) -> Result<Vec<Site>> {
        let sites: SiteCollection = self.get_json("direct/site.json")?;
        Ok(sites.site_collection.into_iter().map(Site::from).collect())
    }

    pub fn fetch_resources(&self, site_id: &str) -> Result<Vec<PandaFile>> {
        let contents: ContentCollection =
            self.get_json(&format!("direct/content/site/{site_id}.json"))?;
        contents
            .content_collection
            .iter()
            .map(PandaFile::from_content)
            .collect()
    }

    pub fn fetch_assignment_attachments(&self, site_id: &str) -> Result<Vec<PandaFile>> {
        let assignments: AssignmentCollection =
            self.get_json(&format!("direct/assignment/site/{site_id}.json"))?;
        let mut files = Vec::new();
        for assignment in &assignments.assignment_collection {
            files.extend(PandaFile::from_assignment(assignment)?);
        }
        Ok(files)
    }
}

impl<S: PageScraper> ContentSource for PandaClient<S> {
    /// Fetch file content, clicking through the copyright notice if PANDA
    /// shows one instead of the file.
    fn download_content(&self, path: &str) -> Result<Vec<u8>> {
        let body = self.get(path)?;
        if !self.scraper.is_copyright_notice(&body) {
            return Ok(body);
        }
        let link = self.scraper.copyright_link(&body)?;
        let target = self.url(&link)?;
        let relative = match target.query() {
            Some(query) => format!("{}?{}", target.path(), query),
            None => target.path().to_string(),
        };
        debug!(path = %relative, "accepting copyright notice");
        self.get(&relative)
    }
}
