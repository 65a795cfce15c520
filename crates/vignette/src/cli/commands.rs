//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vignette::{VignetteConfig, VignetteResult};

/// Vignette - historical persona stories rendered as images and short clips
#[derive(Parser, Debug)]
#[command(name = "vignette")]
#[command(about = "Historical persona stories rendered as images and short clips", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the history store
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Configuration file used instead of the layered defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// History directory: `--data-dir`, else the platform data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("vignette")))
            .unwrap_or_else(|| PathBuf::from(".vignette"))
    }

    /// Configuration from `--config`, else the layered defaults.
    pub fn load_config(&self) -> VignetteResult<VignetteConfig> {
        match &self.config {
            Some(path) => VignetteConfig::from_file(path),
            None => VignetteConfig::load(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract scenes and the persona name from a reply and print them as JSON
    Parse {
        /// Text file holding the model reply
        file: PathBuf,
    },

    /// Generate an image and clip for every scene in a reply
    Generate {
        /// Text file holding the model reply
        file: PathBuf,

        /// Persona name; inferred from the reply when omitted
        #[arg(long)]
        persona: Option<String>,

        /// Conversation to record the persona under; a new one is created when omitted
        #[arg(long)]
        conversation: Option<String>,

        /// Print events as server-sent event frames
        #[arg(long)]
        sse: bool,
    },

    /// Local history commands
    #[command(subcommand)]
    History(HistoryCommands),
}

/// History subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List conversations, newest first
    List,

    /// Show a conversation and its personas
    Show {
        /// Conversation id
        id: String,
    },

    /// Delete a conversation and its personas
    Delete {
        /// Conversation id
        id: String,
    },

    /// Write the whole history to a JSON file
    Export {
        /// Destination file
        path: PathBuf,
    },

    /// Load a JSON export, replacing the sections it contains
    Import {
        /// Source file
        path: PathBuf,
    },

    /// Print history counts
    Stats,

    /// Remove all history and settings
    Clear {
        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_accepts_options() {
        let cli = Cli::try_parse_from([
            "vignette",
            "generate",
            "reply.txt",
            "--persona",
            "Mei Lin",
            "--sse",
            "--data-dir",
            "/tmp/history",
        ])
        .unwrap();

        assert_eq!(cli.data_dir(), PathBuf::from("/tmp/history"));
        match cli.command {
            Commands::Generate {
                file,
                persona,
                conversation,
                sse,
            } => {
                assert_eq!(file, PathBuf::from("reply.txt"));
                assert_eq!(persona.as_deref(), Some("Mei Lin"));
                assert_eq!(conversation, None);
                assert!(sse);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn history_subcommands_parse() {
        let cli = Cli::try_parse_from(["vignette", "--json", "history", "show", "conv-1"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::History(HistoryCommands::Show { ref id }) if id == "conv-1"
        ));

        let cli = Cli::try_parse_from(["vignette", "history", "clear"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History(HistoryCommands::Clear { yes: false })
        ));
    }

    #[test]
    fn missing_file_is_rejected() {
        assert!(Cli::try_parse_from(["vignette", "parse"]).is_err());
    }
}
