// CLI module for argument parsing and configuration

use crate::domain::DiscoveryOptions;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Digisort - sort images into a folder tree by typing digit sequences
///
/// Each subfolder of the destination is numbered 1-9 under its parent.
/// Type the digits of the path to a folder to queue the current image for it,
/// then commit to copy every queued image at once.
#[derive(Parser, Debug, Clone)]
#[command(name = "digisort")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing the images to sort
    ///
    /// If not specified, defaults to the current directory.
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Destination root whose subfolders are the targets
    ///
    /// Defaults to the image directory.
    #[arg(short = 'd', long = "dest")]
    pub dest: Option<PathBuf>,

    /// Select the next image after each assignment and after a commit
    #[arg(short = 'a', long = "auto-advance", action = ArgAction::SetTrue)]
    pub auto_advance: bool,

    /// Include hidden images and hidden destination folders
    #[arg(long = "hidden", action = ArgAction::SetTrue)]
    pub show_hidden: bool,

    /// Dry run mode - log the copies a commit would make without writing anything
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Reverse the image order
    #[arg(short = 'r', long = "reverse", action = ArgAction::SetTrue)]
    pub reverse: bool,

    /// Show the welcome screen even if it was dismissed before
    #[arg(long = "welcome", action = ArgAction::SetTrue)]
    pub welcome: bool,

    /// Milliseconds to wait for another digit before an ambiguous sequence resolves
    #[arg(long = "debounce-ms")]
    pub debounce_ms: Option<u64>,

    /// Write debug-level records to the log file
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        check_directory("Directory", &self.directory)?;
        if let Some(dest) = &self.dest {
            check_directory("Destination", dest)?;
        }

        if self.debounce_ms == Some(0) {
            return Err("debounce-ms must be greater than zero".to_string());
        }

        Ok(())
    }
}

fn check_directory(what: &str, path: &PathBuf) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("{} does not exist: {}", what, path.display()));
    }
    if !path.is_dir() {
        return Err(format!("{} is not a directory: {}", what, path.display()));
    }
    Ok(())
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub images_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// `Some` only when the flag was given; otherwise the saved preference applies.
    pub auto_advance: Option<bool>,
    pub show_hidden: bool,
    pub dry_run: bool,
    pub reverse: bool,
    pub force_welcome: bool,
    pub debounce: Option<Duration>,
    pub verbose: bool,
}

impl AppConfig {
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            show_hidden: self.show_hidden,
            reverse: self.reverse,
        }
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let dest_dir = args.dest.unwrap_or_else(|| args.directory.clone());
        AppConfig {
            images_dir: args.directory,
            dest_dir,
            auto_advance: args.auto_advance.then_some(true),
            show_hidden: args.show_hidden,
            dry_run: args.dry_run,
            reverse: args.reverse,
            force_welcome: args.welcome,
            debounce: args.debounce_ms.map(Duration::from_millis),
            verbose: args.verbose,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            images_dir: PathBuf::from("."),
            dest_dir: PathBuf::from("."),
            auto_advance: None,
            show_hidden: false,
            dry_run: false,
            reverse: false,
            force_welcome: false,
            debounce: None,
            verbose: false,
        }
    }
}
