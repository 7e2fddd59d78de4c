use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::session::DEFAULT_COOKIE_FILE;

#[derive(Parser, Debug)]
#[command(author, version, about = "cli tools for panda")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in through CAS and print or save the session cookie.
    Login {
        /// ecs-id
        #[arg(short, long)]
        username: String,
        /// If not given, prompt for it.
        #[arg(short, long)]
        password: Option<String>,
        /// Cookie output file. Without a value, saved in '.cookies'.
        #[arg(
            short,
            long,
            value_name = "FILE",
            num_args = 0..=1,
            default_missing_value = DEFAULT_COOKIE_FILE
        )]
        output: Option<PathBuf>,
    },
    /// List the sites visible to the logged-in user.
    Sites {
        #[command(flatten)]
        cookies: CookieArgs,
        /// course, project, portfolio etc. Listing stops at the first site
        /// of another type.
        #[arg(long)]
        site_type: Option<String>,
        #[arg(long)]
        only_site_id: bool,
    },
    /// Download the resource files of a site.
    Resources(DownloadArgs),
    /// Download the attachments of a site's assignments.
    Assignments(DownloadArgs),
}

#[derive(Args, Debug)]
pub struct CookieArgs {
    /// Cookie file written by `login -o`.
    #[arg(short = 'c', long = "cookies", value_name = "COOKIE_FILE", default_value = DEFAULT_COOKIE_FILE)]
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub cookies: CookieArgs,
    /// Site id, as printed by `sites`.
    #[arg(short, long)]
    pub site_id: String,
    /// Directory to save contents. Default: the site's name.
    #[arg(short, long)]
    pub directory: Option<PathBuf>,
    /// Exclude by extension, ex) '-e m4a mp4'
    #[arg(short, long, value_name = "EXT", num_args = 0..)]
    pub exclude: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_output_defaults_to_cookie_file() {
        let cli = Cli::parse_from(["clipanda", "login", "-u", "me", "-o"]);
        match cli.command {
            Some(Command::Login { output, password, .. }) => {
                assert_eq!(output, Some(PathBuf::from(".cookies")));
                assert_eq!(password, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn login_without_output_prints() {
        let cli = Cli::parse_from(["clipanda", "login", "-u", "me", "-p", "pw"]);
        assert!(matches!(
            cli.command,
            Some(Command::Login { output: None, .. })
        ));
    }

    #[test]
    fn resources_take_several_excludes() {
        let cli = Cli::parse_from([
            "clipanda", "resources", "-s", "site-1", "-e", "m4a", "mp4", "-c", "my.cookies",
        ]);
        match cli.command {
            Some(Command::Resources(args)) => {
                assert_eq!(args.site_id, "site-1");
                assert_eq!(args.exclude, vec!["m4a", "mp4"]);
                assert_eq!(args.cookies.path, PathBuf::from("my.cookies"));
                assert_eq!(args.directory, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sites_default_cookie_file() {
        let cli = Cli::parse_from(["clipanda", "sites", "--site-type", "course", "--only-site-id"]);
        match cli.command {
            Some(Command::Sites {
                cookies,
                site_type,
                only_site_id,
            }) => {
                assert_eq!(cookies.path, PathBuf::from(".cookies"));
                assert_eq!(site_type.as_deref(), Some("course"));
                assert!(only_site_id);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_is_allowed() {
        assert!(Cli::parse_from(["clipanda"]).command.is_none());
    }
}
