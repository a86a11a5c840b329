//! Axon-Admin: operator CLI for an Axon data directory.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use axon_admin::commands;
use axon_registry::{CredentialStatus, SearchQuery};
use axon_runtime::RuntimeConfig;

/// Axon-Admin: keys, nonces, identifier checks, audit verification, and
/// registry administration.
#[derive(Parser, Debug)]
#[command(name = "axon-admin")]
#[command(about = "Operator tools for the Axon trust broker")]
struct Cli {
    /// Data directory (overrides AXON_DATA_DIR)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an Ed25519 keypair
    Keygen,

    /// Generate a random base64url nonce
    Nonce {
        #[arg(short, long, default_value_t = axon_identity::DEFAULT_NONCE_BYTES)]
        bytes: usize,
    },

    /// Check an NPI's format and check digit
    ValidateNpi { npi: String },

    /// Verify the audit hash chain
    VerifyAudit {
        /// Log file (defaults to <data-dir>/audit.jsonl)
        path: Option<PathBuf>,
    },

    /// Show one registry entry
    Find { npi: String },

    /// Search the registry
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
        #[arg(long)]
        provider_type: Option<String>,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        status: Option<CredentialStatus>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Change an entity's overall credential status
    SetStatus {
        npi: String,
        status: CredentialStatus,
    },

    /// Sign a payload and print the SignedMessage JSON
    Sign {
        #[arg(long)]
        private: String,
        #[arg(long)]
        public: String,
        payload: String,
    },
}

fn run(cli: Cli) -> Result<commands::Report> {
    let mut config = RuntimeConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    // Quiet unless a level was asked for; output on stdout stays parseable.
    if std::env::var_os("AXON_LOG_LEVEL").is_none() && std::env::var_os("RUST_LOG").is_none() {
        config.log_level = "warn".into();
    }
    if let Some(warning) = commands::start_logging(&config) {
        eprintln!("{warning}");
    }

    match cli.command {
        Command::Keygen => commands::keygen(),
        Command::Nonce { bytes } => commands::nonce(bytes),
        Command::ValidateNpi { npi } => Ok(commands::validate_identifier(&npi)),
        Command::VerifyAudit { path } => {
            let path = path.unwrap_or_else(|| commands::audit_path(&config));
            commands::verify_audit(&path)
        }
        Command::Find { npi } => commands::find(&config, &npi),
        Command::Search {
            name,
            specialty,
            provider_type,
            organization,
            status,
            limit,
            offset,
        } => {
            let query = SearchQuery {
                name,
                specialty,
                provider_type,
                organization,
                credential_status: status,
                limit,
                offset,
                ..SearchQuery::default()
            };
            commands::search(&config, &query)
        }
        Command::SetStatus { npi, status } => commands::set_status(config, &npi, status),
        Command::Sign {
            private,
            public,
            payload,
        } => commands::sign(&payload, &private, &public),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(report) => {
            println!("{}", report.text);
            if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
