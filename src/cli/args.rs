use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "unfed", version, author, about = "A terminal companion for intermittent fasting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a fast
    Start {
        /// Protocol (16:8, 18:6, 20:4, omad, 36h, or a number of hours)
        #[arg(long, short)]
        protocol: Option<String>,
    },
    /// Complete the fast in progress
    End {
        /// Attach a note to the finished fast
        #[arg(long)]
        note: Option<String>,
    },
    /// Cancel the fast in progress
    Cancel,
    /// Show the timer for the fast in progress
    Status,
    /// Show recent fasts
    History {
        /// Number of fasts to show
        #[arg(long, short)]
        limit: Option<usize>,
    },
    /// Show streaks and statistics
    Stats {
        /// Show the last 7 days as a heatmap
        #[arg(long)]
        week: bool,
    },
    /// Record today's mood check-in
    Checkin {
        /// great, good, okay, low, bad (or 5..1)
        mood: String,
        /// Energy level from 1 to 5
        #[arg(long, default_value = "3")]
        energy: u8,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
    },
    /// List available fasting protocols
    Protocols,
    /// Show or update configuration
    Config {
        /// Default protocol for new fasts
        #[arg(long)]
        protocol: Option<String>,
        /// Display timezone (IANA name)
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Export a summary to stdout
    Export {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_launches_dashboard() {
        let cli = Cli::try_parse_from(["unfed"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn start_accepts_protocol() {
        let cli = Cli::try_parse_from(["unfed", "start", "-p", "18:6"]).unwrap();
        match cli.command {
            Some(Commands::Start { protocol }) => assert_eq!(protocol.as_deref(), Some("18:6")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn checkin_defaults_energy() {
        let cli = Cli::try_parse_from(["unfed", "checkin", "good"]).unwrap();
        match cli.command {
            Some(Commands::Checkin { mood, energy, note }) => {
                assert_eq!(mood, "good");
                assert_eq!(energy, 3);
                assert!(note.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
