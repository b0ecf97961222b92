//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "whiteboard", version, about = "Whiteboard document tools")]
pub struct Cli {
    /// Configuration file (JSON). Defaults apply when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a document and print a summary.
    Check {
        document: PathBuf,
    },
    /// Rasterize a document to PNG at the configured surface size.
    Render {
        document: PathBuf,
        /// Output file. Defaults to `whiteboard-YYYY-MM-DD.png`.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Font used for text boxes (TTF/OTF).
        #[arg(long)]
        font: Option<PathBuf>,
    },
    /// Create an empty document.
    New {
        #[arg(default_value = "whiteboard.json")]
        path: PathBuf,
        /// Background color, `#rrggbb`.
        #[arg(long)]
        background: Option<String>,
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Run a scripted sequence of input events against a document.
    Replay {
        /// Script file: a JSON array of steps.
        script: PathBuf,
        /// Starting document. An empty scene is used when omitted.
        #[arg(long)]
        document: Option<PathBuf>,
        /// Write the resulting document here.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export the final scene to this PNG file.
        #[arg(long)]
        png: Option<PathBuf>,
        /// Write the final live frame, selection outline included, to this PNG file.
        #[arg(long)]
        frame: Option<PathBuf>,
        /// Font used for text boxes (TTF/OTF).
        #[arg(long)]
        font: Option<PathBuf>,
        /// Save the result into a document directory under `--id`.
        #[arg(long, requires = "id")]
        store: Option<PathBuf>,
        #[arg(long)]
        id: Option<String>,
    },
    /// List the documents in a document directory.
    List {
        store: PathBuf,
    },
    /// Print the keyboard shortcuts understood by `key` replay steps.
    Shortcuts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "whiteboard",
            "render",
            "board.json",
            "-o",
            "out.png",
            "--config",
            "cfg.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        match cli.command {
            Command::Render { document, output, font } => {
                assert_eq!(document, PathBuf::from("board.json"));
                assert_eq!(output, Some(PathBuf::from("out.png")));
                assert!(font.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_new_defaults() {
        let cli = Cli::try_parse_from(["whiteboard", "new"]).unwrap();
        match cli.command {
            Command::New { path, background, force } => {
                assert_eq!(path, PathBuf::from("whiteboard.json"));
                assert!(background.is_none());
                assert!(!force);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_store_requires_id() {
        assert!(Cli::try_parse_from(["whiteboard", "replay", "s.json", "--store", "dir"]).is_err());
        assert!(
            Cli::try_parse_from(["whiteboard", "replay", "s.json", "--store", "dir", "--id", "a"])
                .is_ok()
        );
    }

    #[test]
    fn test_parse_shortcuts() {
        let cli = Cli::try_parse_from(["whiteboard", "shortcuts"]).unwrap();
        assert!(matches!(cli.command, Command::Shortcuts));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
