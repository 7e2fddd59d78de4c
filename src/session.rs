// CAS login and the session cookie it yields.
//
// The login flow is the same one a browser goes through: fetch the CAS
// login page, copy its login ticket into the credential form, post it, and
// follow the redirects back to PANDA. A successful login redirects exactly
// twice; the second hop sets the LMS session cookie.

use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PandaError, Result};
use crate::page::{PageScraper, PandaScraper};

/// Redirect hops of a successful login.
pub const EXPECTED_HOPS: usize = 2;

/// Give up following redirects after this many hops.
pub const MAX_HOPS: usize = 10;

/// Cookie file used when none is given on the command line.
pub const DEFAULT_COOKIE_FILE: &str = ".cookies";

/// Session cookie(s) sent with every LMS request.
///
/// Persisted as `name=value;` pairs, the format the login step prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cookies: Vec<(String, String)>,
}

impl Session {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Session {
            cookies: vec![(name.into(), value.into())],
        }
    }

    /// Parse a persisted cookie string such as `JSESSIONID=abc;`.
    pub fn parse(raw: &str) -> Result<Self> {
        let cookies: Vec<(String, String)> = raw
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        if cookies.is_empty() {
            return Err(PandaError::EmptyCookie);
        }
        Ok(Session { cookies })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| PandaError::CookieFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| PandaError::io(dir, e))?;
        }
        std::fs::write(path, self.to_string()).map_err(|e| PandaError::io(path, e))
    }

    /// Value for the `Cookie` request header.
    pub fn header_value(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Log in with the default page scraper.
    pub fn login(config: &Config, username: &str, password: &str) -> Result<Self> {
        Self::login_with(&PandaScraper::new(), config, username, password)
    }

    pub fn login_with(
        scraper: &impl PageScraper,
        config: &Config,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .cookie_store(true)
            .build()
            .map_err(|e| PandaError::http(config.cas_url.as_str(), e))?;

        let login_page = config.login_page_url()?;
        debug!(url = %login_page, "fetching CAS login page");
        let html = client
            .get(login_page.clone())
            .send()
            .and_then(|r| r.text())
            .map_err(|e| PandaError::http(login_page.as_str(), e))?;
        let form = scraper.login_form(&html)?;

        let action = config
            .cas_url
            .join(&form.action)
            .map_err(|source| PandaError::InvalidUrl {
                url: form.action.clone(),
                source,
            })?;
        let fields = [
            ("lt", form.login_ticket.as_str()),
            ("password", password),
            ("username", username),
            ("execution", "e1s1"),
            ("_eventId", "submit"),
            ("submit", "LOGIN"),
        ];
        debug!(url = %action, "posting credentials");
        let mut response = client
            .post(action.clone())
            .form(&fields)
            .send()
            .map_err(|e| PandaError::http(action.as_str(), e))?;

        // Cookies set by each redirect response, in order.
        let mut hops: Vec<Vec<(String, String)>> = Vec::new();
        let mut current = action;
        while response.status().is_redirection() {
            let Some(location) = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
            else {
                break;
            };
            hops.push(
                response
                    .cookies()
                    .map(|c| (c.name().to_string(), c.value().to_string()))
                    .collect(),
            );
            if hops.len() > MAX_HOPS {
                return Err(PandaError::LoginFailed);
            }
            let next = current
                .join(&location)
                .map_err(|source| PandaError::InvalidUrl {
                    url: location.clone(),
                    source,
                })?;
            debug!(hop = hops.len(), url = %next, "following redirect");
            response = client
                .get(next.clone())
                .send()
                .map_err(|e| PandaError::http(next.as_str(), e))?;
            current = next;
        }

        if hops.len() != EXPECTED_HOPS {
            debug!(hops = hops.len(), "unexpected redirect chain");
            return Err(PandaError::LoginFailed);
        }
        let (name, value) = hops
            .swap_remove(1)
            .into_iter()
            .next()
            .ok_or(PandaError::LoginFailed)?;
        info!(cookie = %name, "logged in");
        Ok(Session::new(name, value))
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.cookies {
            write!(f, "{k}={v};")?;
        }
        Ok(())
    }
}
