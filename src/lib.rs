// Library root
// -----------
// The binary (`main.rs`) only parses arguments and calls `commands::run`;
// everything else lives here so it can be tested without a terminal.
//
// Module responsibilities:
// - `config`: LMS and CAS endpoints, overridable from the environment.
// - `page`: literal-markup extraction from the CAS login page and the
//   copyright notice page.
// - `session`: CAS login and the persisted session cookie.
// - `model`: sites and files, and the JSON shapes they are read from.
// - `client`: REST calls and file content fetches with the session cookie.
// - `download`: batch download with extension filtering and per-file
//   failure reporting.
// - `cli` / `commands`: argument definitions and their handlers.
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod model;
pub mod page;
pub mod session;

pub use client::{ContentSource, PandaClient};
pub use config::Config;
pub use error::{PandaError, Result};
pub use model::{PandaFile, Site};
pub use session::Session;
