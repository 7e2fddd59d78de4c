// Endpoint configuration. Both hosts can be overridden from the environment,
// which is how the integration tests point the client at a mock server.

use url::Url;

use crate::error::{PandaError, Result};

pub const DEFAULT_BASE_URL: &str = "https://panda.ecs.kyoto-u.ac.jp";
pub const DEFAULT_CAS_URL: &str = "https://cas.ecs.kyoto-u.ac.jp";

pub const BASE_URL_ENV: &str = "PANDA_BASE_URL";
pub const CAS_URL_ENV: &str = "PANDA_CAS_URL";

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the LMS; REST and content paths are resolved against it.
    pub base_url: Url,
    /// Root of the CAS single-sign-on host.
    pub cas_url: Url,
}

fn parse(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|source| PandaError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

impl Config {
    pub fn new(base_url: &str, cas_url: &str) -> Result<Self> {
        Ok(Config {
            base_url: parse(base_url)?,
            cas_url: parse(cas_url)?,
        })
    }

    /// Read `PANDA_BASE_URL` and `PANDA_CAS_URL`, falling back to the
    /// production hosts.
    pub fn from_env() -> Result<Self> {
        let base = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let cas = std::env::var(CAS_URL_ENV).unwrap_or_else(|_| DEFAULT_CAS_URL.into());
        Self::new(&base, &cas)
    }

    /// Service URL CAS redirects back to after a successful login.
    pub fn service_url(&self) -> Result<Url> {
        self.base_url
            .join("sakai-login-tool/container")
            .map_err(|source| PandaError::InvalidUrl {
                url: self.base_url.to_string(),
                source,
            })
    }

    pub fn login_page_url(&self) -> Result<Url> {
        let mut url = self
            .cas_url
            .join("cas/login")
            .map_err(|source| PandaError::InvalidUrl {
                url: self.cas_url.to_string(),
                source,
            })?;
        url.query_pairs_mut()
            .append_pair("service", self.service_url()?.as_str());
        Ok(url)
    }
}
