//! Configuration management

use crate::remote::DEFAULT_ENDPOINT;
use crate::types::BunError;
use clap::{ArgAction, Parser, Subcommand};
use serde::Deserialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "buncli")]
#[command(version, about = "List, upload, download, delete and sync files in a Bunny storage zone")]
pub struct Cli {
    /// Storage zone name
    #[arg(short = 'z', long, env = "BUN_ZONE", global = true)]
    pub zone: Option<String>,

    /// Storage zone access key (password)
    #[arg(short = 'k', long, env = "BUN_KEY", global = true, hide_env_values = true)]
    pub key: Option<String>,

    /// Storage API endpoint [default: https://storage.bunnycdn.com]
    #[arg(long, env = "BUN_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// TOML file with `zone`, `key` and `endpoint` defaults
    #[arg(long = "config", env = "BUN_CONFIG", global = true)]
    pub config_file: Option<PathBuf>,

    /// Increase diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// List every file and directory in the zone
    #[command(visible_alias = "l")]
    List,

    /// Upload a file, or stdin when no path is given
    #[command(visible_alias = "u")]
    Upload {
        /// File on disk to upload
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Remote name (defaults to the file name of --path)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Download a file to stdout
    #[command(visible_alias = "g")]
    Get {
        /// Remote name
        #[arg(short, long)]
        name: String,

        /// Write to a file of the same name in the current directory
        #[arg(short, long)]
        direct: bool,
    },

    /// Delete a file
    #[command(visible_alias = "r")]
    Remove {
        /// Remote name
        #[arg(short, long)]
        name: String,
    },

    /// Synchronize a local directory with the zone
    #[command(visible_alias = "s")]
    Sync {
        /// `up` (local to zone) or `down` (zone to local)
        #[arg(short, long)]
        direction: String,

        /// Local root directory
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Glob patterns to leave out of the sync, on both sides
        #[arg(long)]
        exclude: Vec<String>,

        /// Show the plan without transferring anything
        #[arg(long)]
        dry_run: bool,
    },
}

/// Optional settings file
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub zone: Option<String>,
    pub key: Option<String>,
    pub endpoint: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, BunError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BunError::Config(format!("Cannot read config file {:?}: {}", path, e))
        })?;
        toml::from_str(&raw)
            .map_err(|e| BunError::Config(format!("Invalid config file {:?}: {}", path, e)))
    }
}

/// Where upload bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    File(PathBuf),
    Stdin,
}

/// Options of one sync run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    /// Unvalidated direction string
    pub direction: String,
    pub root: PathBuf,
    pub exclude: Vec<String>,
    pub dry_run: bool,
}

/// Resolved verb
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Upload { source: UploadSource, name: String },
    Get { name: String, direct: bool },
    Remove { name: String },
    Sync(SyncOptions),
}

/// Global configuration for buncli
#[derive(Debug, Clone)]
pub struct Config {
    pub zone: String,

    /// Access key sent with every request
    pub key: String,

    pub endpoint: String,

    pub verbose: u8,

    pub command: Command,
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), BunError> {
        if let Command::Sync(options) = &self.command {
            if !options.root.exists() {
                return Err(BunError::Config(format!(
                    "Sync root does not exist: {:?}",
                    options.root
                )));
            }
            if !options.root.is_dir() {
                return Err(BunError::Config(format!(
                    "Sync root is not a directory: {:?}",
                    options.root
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<Cli> for Config {
    type Error = BunError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let file = match &cli.config_file {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let zone = first_non_empty(cli.zone, file.zone).ok_or_else(|| {
            BunError::Config(
                "Zone not defined. Either pass the zone as an argument or set the BUN_ZONE environment variable."
                    .to_string(),
            )
        })?;
        let key = first_non_empty(cli.key, file.key).ok_or_else(|| {
            BunError::Config(
                "Key not defined. Either pass the key as an argument or set the BUN_KEY environment variable."
                    .to_string(),
            )
        })?;
        let endpoint = first_non_empty(cli.endpoint, file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let command = resolve_command(cli.command, std::io::stdin().is_terminal())?;

        let config = Config {
            zone,
            key,
            endpoint,
            verbose: cli.verbose,
            command,
        };
        config.validate()?;
        Ok(config)
    }
}

fn first_non_empty(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.filter(|v| !v.trim().is_empty()))
}

fn resolve_command(command: CliCommand, stdin_is_terminal: bool) -> Result<Command, BunError> {
    Ok(match command {
        CliCommand::List => Command::List,
        CliCommand::Upload { path, name } => resolve_upload(path, name, stdin_is_terminal)?,
        CliCommand::Get { name, direct } => Command::Get { name, direct },
        CliCommand::Remove { name } => Command::Remove { name },
        CliCommand::Sync {
            direction,
            path,
            exclude,
            dry_run,
        } => Command::Sync(SyncOptions {
            direction,
            root: path,
            exclude,
            dry_run,
        }),
    })
}

fn resolve_upload(
    path: Option<PathBuf>,
    name: Option<String>,
    stdin_is_terminal: bool,
) -> Result<Command, BunError> {
    match path {
        Some(path) => {
            let name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        BunError::Config(format!(
                            "Cannot derive a remote name from {:?}; pass --name",
                            path
                        ))
                    })?,
            };
            Ok(Command::Upload {
                source: UploadSource::File(path),
                name,
            })
        }
        None => {
            if stdin_is_terminal {
                return Err(BunError::Config(
                    "Nothing to upload. Pass --path or redirect a file to stdin.".to_string(),
                ));
            }
            let name = name.ok_or_else(|| {
                BunError::Config("A name is required when uploading from stdin.".to_string())
            })?;
            Ok(Command::Upload {
                source: UploadSource::Stdin,
                name,
            })
        }
    }
}
