use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "lore",
    about = "A fuzzy tag-matching CLI for your personal knowledge and tools"
)]
pub struct Cli {
    /// The free-text query, as plain words
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Configuration file (repeatable; later files override earlier ones)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Vec<PathBuf>,

    /// Override the XDG data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Override the host scope (default: $LORE_HOST, then $HOSTNAME)
    #[arg(long, value_name = "NAME")]
    pub host: Option<String>,

    /// Look up a tool by name instead of ranking a query
    #[arg(long, value_name = "NAME")]
    pub tool: Option<String>,

    /// Show the ranked candidates with their scores
    #[arg(long)]
    pub votes: bool,

    /// Number of candidates shown with --votes
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Minimum score a result must reach (overrides the configuration)
    #[arg(long, value_name = "SCORE")]
    pub min_score: Option<f64>,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL", hide = true)]
    pub completions: Option<Shell>,
}

impl Cli {
    /// The query words joined back into one string.
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }

    /// Generate shell completions and print to stdout.
    pub fn print_completions(shell: Shell) {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "lore", &mut std::io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_bare_query_words() {
        let cli = Cli::parse_from(["lore", "how", "do", "I", "install"]);
        assert_eq!(cli.query_text(), "how do I install");
        assert_eq!(cli.count, 10);
        assert!(!cli.votes);
        assert!(cli.min_score.is_none());
        assert!(cli.config.is_empty());
    }

    #[test]
    fn parse_flags_before_the_query() {
        let cli = Cli::parse_from([
            "lore", "--votes", "-n", "3", "backup", "my", "files",
        ]);
        assert!(cli.votes);
        assert_eq!(cli.count, 3);
        assert_eq!(cli.query_text(), "backup my files");
    }

    #[test]
    fn config_is_repeatable() {
        let cli = Cli::parse_from([
            "lore", "-c", "base.toml", "--config", "host.toml", "query",
        ]);
        assert_eq!(cli.config.len(), 2);
        assert_eq!(cli.config[1], PathBuf::from("host.toml"));
    }

    #[test]
    fn tool_lookup_needs_no_query() {
        let cli = Cli::parse_from(["lore", "--tool", "backup"]);
        assert_eq!(cli.tool.as_deref(), Some("backup"));
        assert!(cli.query.is_empty());
    }
}
