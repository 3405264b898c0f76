//! Command-line interface for the docent binary.
//!
//! Uses clap for argument parsing and owo-colors for colored terminal
//! output.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::session::DEFAULT_SESSION_ID;

/// docent - retrieval-augmented document chat
#[derive(Parser, Debug)]
#[command(
    name = "docent",
    version,
    about = "Retrieval-augmented chat over a local document collection",
    long_about = "Indexes a directory of documents into a local vector store and answers\n\
                  questions about them through a local LLM, citing the source and page\n\
                  of every fragment it relies on.",
    after_help = "EXAMPLES:\n    \
                  docent ingest ./docs          # Index every supported file in ./docs\n    \
                  docent chat                   # Chat against the index (default session)\n    \
                  docent chat --session alice   # Keep a separate conversation history\n    \
                  docent sources                # List indexed source documents"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index every supported document in a directory
    ///
    /// Already-indexed files are skipped, so re-running after adding new
    /// files only processes the additions.
    Ingest {
        /// Directory containing the documents
        directory: PathBuf,
    },

    /// Start an interactive chat against the indexed documents
    Chat {
        /// Session id; turns within one session share conversation history
        #[arg(short, long, default_value = DEFAULT_SESSION_ID)]
        session: String,
    },

    /// List the source documents currently in the index
    Sources,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Colored terminal output helper.
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Output {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print the assistant's reply in a chat exchange
    pub fn reply(&self, message: &str) {
        if self.colored {
            println!("\n{}\n", message.bright_white());
        } else {
            println!("\n{}\n", message);
        }
    }

    /// Print the chat prompt marker without a trailing newline
    pub fn prompt(&self) {
        use std::io::Write;
        if self.colored {
            print!("{} ", ">".bright_cyan().bold());
        } else {
            print!("> ");
        }
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_defaults_to_the_default_session() {
        let cli = Cli::try_parse_from(["docent", "chat"]).unwrap();
        match cli.command {
            Commands::Chat { session } => assert_eq!(session, DEFAULT_SESSION_ID),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn ingest_requires_a_directory() {
        assert!(Cli::try_parse_from(["docent", "ingest"]).is_err());
        let cli = Cli::try_parse_from(["docent", "ingest", "./docs"]).unwrap();
        match cli.command {
            Commands::Ingest { directory } => assert_eq!(directory, PathBuf::from("./docs")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
