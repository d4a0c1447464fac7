use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod reporter;

/// Yaksha test result recorder.
///
/// Records the outcome of every test in a run into per-category result
/// files, a JSON-lines result log and an XML case manifest, and optionally
/// forwards each result to a remote grading endpoint.
///
/// EXAMPLES:
///     yaksha record events.jsonl        Record a run from an event stream
///     yaksha record - --remote          Read events from stdin and send results
///     yaksha clean                      Remove outputs of the previous run
///     yaksha send                       Re-send the combined log
///
/// ENVIRONMENT VARIABLES:
///     YAKSHA_JSON           Set to '1' for JSON output by default
///     YAKSHA_CUSTOM_DATA    Override the custom data file path
///     YAKSHA_RECORD_KEY     Override the result bundle key
///     YAKSHA_REMOTE_ENABLED Set to 'true' to forward results
///     YAKSHA_REMOTE_URL     Override the remote endpoint
///     YAKSHA_REMOTE_CODE    Access code for the remote endpoint
///     NO_COLOR              Set to disable colored output
///     RUST_LOG              Log filter (overrides -v/-q)
#[derive(Parser)]
#[command(name = "yaksha")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a test run from a stream of host events
    ///
    /// Reads one JSON event per line (run-start, test-end, run-end) and
    /// writes the result files under the working directory.
    ///
    /// EXAMPLES:
    ///     yaksha record events.jsonl             Record from a file
    ///     yaksha record < events.jsonl           Record from stdin
    ///     yaksha record events.jsonl --json      Print the summary as JSON
    #[command(visible_alias = "r")]
    Record {
        /// Event stream file ('-' or omitted for stdin)
        events: Option<PathBuf>,
        /// Working directory outputs are written under
        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Forward results to the remote endpoint
        #[arg(long)]
        remote: bool,
        /// Output summary in JSON format
        #[arg(long)]
        json: bool,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Remove the outputs of a previous run
    ///
    /// EXAMPLES:
    ///     yaksha clean                  Clean the current directory
    ///     yaksha clean --dir cypress    Clean another directory
    Clean {
        /// Working directory outputs were written under
        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Send every bundle in a result log to the remote endpoint
    ///
    /// EXAMPLES:
    ///     yaksha send                   Send the configured combined log
    ///     yaksha send --file old.txt    Send another log
    Send {
        /// Working directory outputs were written under
        #[arg(long, short = 'd', default_value = ".")]
        dir: PathBuf,
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Log to send instead of the configured one
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    ///
    /// EXAMPLES:
    ///     yaksha completions bash > ~/.local/share/bash-completion/completions/yaksha
    ///     yaksha completions zsh > ~/.zfunc/_yaksha
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_config = config::Config::from_env();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Record {
            events,
            dir,
            config,
            remote,
            json,
            no_color,
        } => {
            // Command-line flag overrides environment variable
            let args = commands::record::RecordArgs {
                events,
                dir,
                config,
                remote,
                verbose: cli.verbose,
                no_color: no_color || cli_config.no_color,
                json: json || cli_config.default_json,
            };
            commands::record::run(args)?;
        }
        Commands::Clean { dir, config } => {
            commands::clean::run(&dir, config.as_deref(), cli.quiet)?;
        }
        Commands::Send { dir, config, file } => {
            commands::send::run(commands::send::SendArgs { dir, config, file })?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}
