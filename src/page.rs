// Extraction of fields from the two HTML pages the client has to read:
// the CAS login form and the "confirm copyright" interstitial that PANDA
// serves in front of some resources.
//
// Both pages are matched on literal markup. If the remote side changes its
// templates, swap in another `PageScraper` instead of touching the callers.

use regex::Regex;
use thiserror::Error;

/// Doctype that only the copyright interstitial starts with.
pub const COPYRIGHT_DOCTYPE: &str =
    r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN""#;

/// Inline style carried by the "accept" link of the interstitial.
pub const COPYRIGHT_LINK_STYLE: &str =
    "background-color:#EEE;border:1px solid #4A5573;color:#4A5573;padding:3px;text-decoration:none";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("login page has no form action")]
    MissingFormAction,
    #[error("login page has no login ticket (lt)")]
    MissingLoginTicket,
    #[error("copyright page has no accept link")]
    MissingCopyrightLink,
}

/// Fields needed to submit the CAS login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Value of the form's `action` attribute, usually a path on the CAS host.
    pub action: String,
    pub login_ticket: String,
}

pub trait PageScraper {
    fn login_form(&self, html: &str) -> Result<LoginForm, ScrapeError>;

    fn is_copyright_notice(&self, body: &[u8]) -> bool;

    /// The link the user would click to accept the copyright notice.
    fn copyright_link(&self, body: &[u8]) -> Result<String, ScrapeError>;
}

/// Scraper for the markup currently served by PANDA and its CAS.
#[derive(Debug, Clone)]
pub struct PandaScraper {
    form_action: Regex,
    login_ticket: Regex,
    copyright_link: Regex,
}

fn pattern(src: &str) -> Regex {
    Regex::new(src).expect("static pattern compiles")
}

impl Default for PandaScraper {
    fn default() -> Self {
        PandaScraper {
            form_action: pattern(
                r#"<form id="fm1" class="fm-v clearfix" action="([^"]+)" method="post">"#,
            ),
            login_ticket: pattern(r#"<input type="hidden" name="lt" value="([a-zA-Z0-9 \-]+)" />"#),
            copyright_link: pattern(&format!(
                r#"<a href="([^"]*)" style="{}">"#,
                regex::escape(COPYRIGHT_LINK_STYLE)
            )),
        }
    }
}

impl PandaScraper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageScraper for PandaScraper {
    fn login_form(&self, html: &str) -> Result<LoginForm, ScrapeError> {
        let action = self
            .form_action
            .captures(html)
            .map(|c| c[1].to_string())
            .ok_or(ScrapeError::MissingFormAction)?;
        let login_ticket = self
            .login_ticket
            .captures(html)
            .map(|c| c[1].to_string())
            .ok_or(ScrapeError::MissingLoginTicket)?;
        Ok(LoginForm {
            action: action.replace("&amp;", "&"),
            login_ticket,
        })
    }

    fn is_copyright_notice(&self, body: &[u8]) -> bool {
        body.starts_with(COPYRIGHT_DOCTYPE.as_bytes())
    }

    fn copyright_link(&self, body: &[u8]) -> Result<String, ScrapeError> {
        let html = String::from_utf8_lossy(body);
        self.copyright_link
            .captures(&html)
            .map(|c| c[1].replace("&amp;", "&"))
            .ok_or(ScrapeError::MissingCopyrightLink)
    }
}
