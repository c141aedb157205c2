//! Command-line interface for Folio.

use clap::{Parser, Subcommand};

/// Folio - portfolio backend API
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Write a default config.toml to the working directory
    InitConfig,

    /// Load and validate the effective configuration, then exit
    CheckConfig,

    /// Create an administrator directly, bypassing first-run setup.
    /// The password is read from FOLIO_ADMIN_PASSWORD or the first line of stdin.
    CreateAdmin {
        username: String,

        #[arg(long)]
        email: Option<String>,
    },
}

impl Cli {
    #[must_use]
    pub fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
