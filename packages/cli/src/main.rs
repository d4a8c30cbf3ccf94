//! `ored`: command-line interface for the orangered API client.
//!
//! Offline subcommands work on saved JSON responses:
//!
//! - **`objectify`**: convert a response and print a readable summary.
//! - **`check`**: report whether a response carries an error envelope.
//!
//! Online subcommands talk to the API using credentials from the
//! `ORANGERED_*` environment variables:
//!
//! - **`user`**: fetch and print a redditor.
//! - **`get`**: GET an arbitrary API path and print the objectified result.
//!
//! Offline subcommands read JSON from a file path or from stdin (`-`).

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use orangered::render::{render, render_thing};
use orangered::{ClientHandle, Error, ObjectifyError, Objector, Thing, TypeRegistry};
use orangered_client::{ClientConfig, Reddit};
use serde_json::Value;

/// ored: orangered API client CLI
///
/// Objectify saved responses and make authenticated API requests.
#[derive(Parser)]
#[command(name = "ored", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Objectify a saved API response and print it.
    ///
    /// Exits 1 if the response carries a server-reported error or cannot be
    /// objectified. Pass `-` as FILE to read from stdin.
    Objectify {
        /// Path to a JSON file, or `-` for stdin.
        file: PathBuf,

        /// Print the re-encoded JSON instead of the text summary.
        #[arg(long)]
        json: bool,

        /// Maximum nesting depth before the response is rejected.
        #[arg(long, value_name = "N", default_value_t = orangered::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Check a saved API response for an error envelope.
    ///
    /// Prints `ok` and exits 0 when there is none; otherwise prints each
    /// error and exits 1.
    Check {
        /// Path to a JSON file, or `-` for stdin.
        file: PathBuf,
    },

    /// Fetch a redditor by name and print it.
    User {
        name: String,
    },

    /// GET an API path and print the objectified response.
    ///
    /// Examples:
    ///   ored get r/rust/about
    ///   ored get api/info --param id=t3_abc,t1_def
    Get {
        /// Path relative to the API base URL.
        path: String,

        /// Query parameter as KEY=VALUE. Repeat for more.
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orangered=info,orangered_client=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Objectify {
            file,
            json,
            max_depth,
        } => {
            let value = parse_json(&read_input(&file));
            let objector = Objector::new(
                Arc::new(TypeRegistry::with_defaults()),
                ClientHandle::detached(),
            )
            .with_max_depth(max_depth);
            match objector.objectify(value) {
                Ok(objectified) if json => println!(
                    "{}",
                    serde_json::to_string_pretty(&objectified.to_value()).unwrap_or_default()
                ),
                Ok(objectified) => print!("{}", render(&objectified)),
                Err(e) => {
                    report(&e);
                    process::exit(1);
                }
            }
        }

        Command::Check { file } => {
            let value = parse_json(&read_input(&file));
            match orangered::check_error(&value) {
                Ok(()) => println!("ok"),
                Err(e) => {
                    report(&e);
                    process::exit(1);
                }
            }
        }

        Command::User { name } => {
            let reddit = connect();
            let mut user = reddit.redditor(name);
            if let Err(e) = user.fetch().await {
                request_failed(e);
            }
            print!("{}", render_thing(&Thing::Redditor(user)));
        }

        Command::Get { path, params } => {
            let reddit = connect();
            let pairs: Vec<(&str, &str)> = params
                .iter()
                .map(|raw| {
                    raw.split_once('=').unwrap_or_else(|| {
                        fatal(&format!("invalid --param {raw:?}: expected KEY=VALUE"))
                    })
                })
                .collect();
            match reddit.get(&path, &pairs).await {
                Ok(objectified) => print!("{}", render(&objectified)),
                Err(e) => request_failed(e),
            }
        }
    }
}

fn connect() -> Reddit {
    let config = ClientConfig::from_env().unwrap_or_else(|e| fatal(&e.to_string()));
    Reddit::new(config).unwrap_or_else(|e| fatal(&e.to_string()))
}

/// Print every server-reported error, or the failure itself if there are
/// none.
fn report(e: &ObjectifyError) {
    let errors = e.api_errors();
    if errors.is_empty() {
        eprintln!("error: {e}");
    }
    for api in errors {
        match &api.field {
            Some(field) => eprintln!("{}: {} (field: {})", api.error_code, api.explanation, field),
            None => eprintln!("{}: {}", api.error_code, api.explanation),
        }
    }
}

fn request_failed(e: Error) -> ! {
    match e {
        Error::Objectify(e) => report(&e),
        other => eprintln!("error: {other}"),
    }
    process::exit(1);
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
        buf
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {e}", path.display())))
    }
}

fn parse_json(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|e| fatal(&format!("input is not JSON: {e}")))
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("ored: {msg}");
    process::exit(2);
}
