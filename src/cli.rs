use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "h3x")]
#[command(version)]
#[command(about = "Split files into format-aware hex segments and back", long_about = None)]
#[command(after_help = "Examples:\n  \
  h3x convert photo.jpg parts/     split photo.jpg into hex parts under parts/\n  \
  h3x parse parts/                 rebuild the original file from parts/\n  \
  h3x scan parts/                  report readable strings and embedded signatures")]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Only print errors; scan still prints the parts with findings
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a file and write its segments as hex parts plus a manifest
    Convert {
        /// File to split
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory receiving the parts and manifest.json
        #[arg(value_name = "OUTPUT_DIR")]
        output_dir: PathBuf,
    },

    /// Rebuild the original file from a part directory
    Parse {
        /// Directory containing manifest.json
        #[arg(value_name = "DIR")]
        directory: PathBuf,
    },

    /// Look for readable strings and embedded signatures in stored parts
    Scan {
        /// Directory containing manifest.json
        #[arg(value_name = "DIR")]
        directory: PathBuf,
    },
}

impl Cli {
    /// Default log filter when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "h3x=debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["h3x", "convert", "in.png", "out"]);
        match cli.command {
            Command::Convert { file, output_dir } => {
                assert_eq!(file, PathBuf::from("in.png"));
                assert_eq!(output_dir, PathBuf::from("out"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::parse_from(["h3x", "parse", "out", "-v"]);
        assert!(matches!(cli.command, Command::Parse { .. }));
        assert_eq!(cli.log_filter(), "h3x=debug");
    }

    #[test]
    fn convert_needs_an_output_dir() {
        assert!(Cli::try_parse_from(["h3x", "convert", "in.png"]).is_err());
    }
}
