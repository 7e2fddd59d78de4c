// Command handlers: turn parsed arguments into client calls and print the
// results. Output goes through `Write` so the listing can be tested.

use anyhow::{Context, Result};
use clap::CommandFactory;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, Command, CookieArgs, DownloadArgs};
use crate::client::PandaClient;
use crate::config::Config;
use crate::download::BatchDownloader;
use crate::model::{PandaFile, Site};
use crate::session::Session;

/// Dispatch a parsed command line. Without a subcommand, print help.
pub fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };
    let config = Config::from_env().context("invalid endpoint configuration")?;
    match command {
        Command::Login {
            username,
            password,
            output,
        } => login(&config, &username, password, output.as_deref()),
        Command::Sites {
            cookies,
            site_type,
            only_site_id,
        } => {
            let client = open_client(config, &cookies)?;
            let sites = client.fetch_sites().context("fetching site list")?;
            list_sites(&sites, site_type.as_deref(), only_site_id, &mut io::stdout())
        }
        Command::Resources(args) => download(config, args, |client, site_id| {
            client.fetch_resources(site_id)
        }),
        Command::Assignments(args) => download(config, args, |client, site_id| {
            client.fetch_assignment_attachments(site_id)
        }),
    }
}

fn login(
    config: &Config,
    username: &str,
    password: Option<String>,
    output: Option<&Path>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => Password::new().with_prompt("Password").interact()?,
    };
    let session = Session::login(config, username, &password)?;
    match output {
        None => println!("{session}"),
        Some(path) => session
            .save(path)
            .with_context(|| format!("saving cookie to {}", path.display()))?,
    }
    Ok(())
}

fn open_client(config: Config, cookies: &CookieArgs) -> Result<PandaClient> {
    let session = Session::load(&cookies.path)?;
    Ok(PandaClient::new(config, session)?)
}

/// Sites to print for an optional type filter. The listing stops at the
/// first site of another type instead of skipping it.
pub fn sites_to_list<'a>(
    sites: &'a [Site],
    site_type: Option<&'a str>,
) -> impl Iterator<Item = &'a Site> {
    sites
        .iter()
        .take_while(move |site| site_type.map_or(true, |t| t == site.site_type))
}

pub fn list_sites<W: Write>(
    sites: &[Site],
    site_type: Option<&str>,
    only_site_id: bool,
    out: &mut W,
) -> Result<()> {
    for site in sites_to_list(sites, site_type) {
        if only_site_id {
            writeln!(out, "{}", site.site_id)?;
        } else {
            writeln!(out, "{}: {}", site.site_id, site.name)?;
        }
    }
    Ok(())
}

fn download<F>(config: Config, args: DownloadArgs, fetch: F) -> Result<()>
where
    F: Fn(&PandaClient, &str) -> crate::error::Result<Vec<PandaFile>>,
{
    let client = open_client(config, &args.cookies)?;
    let site = client
        .fetch_site(&args.site_id)
        .with_context(|| format!("fetching site {}", args.site_id))?;
    let files = fetch(&client, &args.site_id)
        .with_context(|| format!("fetching file list of {}", args.site_id))?;
    let base_dir = args
        .directory
        .unwrap_or_else(|| PathBuf::from(&site.name));

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(ProgressStyle::with_template("{msg} {pos}/{len} [{elapsed_precise}]")?);

    BatchDownloader::new(base_dir, args.exclude)
        .with_progress(progress)
        .run(&client, &files, &mut io::stderr());
    Ok(())
}
