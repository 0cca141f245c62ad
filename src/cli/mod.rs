//! Command-line interface for chain-viewer.
//!
//! Every view command reads one conversation export (a file path, or `-`
//! for stdin) and prints one projection:
//! - `tree`: the structural outline
//! - `list`: the chronological chat log
//! - `table`: the chat log as a table or CSV
//! - `graph`: graph nodes and edges, as text, JSON or DOT
//! - `show`: the configured default view
//! - `stats`: message, branch and favorite counts
//!
//! `favorite` and `delete` record overlay markers in the sidecar store.

mod commands;

pub use commands::*;

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

use crate::error::Result;
use crate::export::ViewKind;

/// Explore exported AI conversation trees from the terminal.
#[derive(Debug, Parser)]
#[command(name = "chainview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Only show messages whose first content part contains this text
    /// (case-insensitive).
    #[arg(short = 's', long, global = true, env = "CHAINVIEW_SEARCH")]
    pub search: Option<String>,

    /// Output format for structured data.
    #[arg(short = 'o', long, global = true, default_value = "text", env = "CHAINVIEW_OUTPUT")]
    pub output: OutputFormat,

    /// Output as JSON (shorthand for -o json).
    #[arg(long, global = true)]
    pub json: bool,

    /// Expand reasoning blocks in text output.
    #[arg(long, global = true)]
    pub thinking: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "CHAINVIEW_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "CHAINVIEW_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "CHAINVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the overlay store (default: user data directory).
    #[arg(long, global = true, env = "CHAINVIEW_OVERLAY_FILE")]
    pub overlay_file: Option<PathBuf>,
}

impl Cli {
    /// Get effective output format.
    #[must_use]
    pub fn effective_output(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }

    /// Search term, empty when none was given.
    #[must_use]
    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// View names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    /// Structural outline.
    Tree,
    /// Chronological chat log.
    List,
    /// Tabular chat log.
    Table,
    /// Node/edge graph.
    Graph,
}

impl From<ViewArg> for ViewKind {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Tree => Self::Tree,
            ViewArg::List => Self::List,
            ViewArg::Table => Self::Table,
            ViewArg::Graph => Self::Graph,
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the structural outline of a conversation.
    #[command(alias = "outline")]
    Tree(InputArgs),

    /// Print the chronological chat log.
    #[command(alias = "ls")]
    List(InputArgs),

    /// Print the chat log as a table.
    Table(TableArgs),

    /// Print graph nodes and edges.
    Graph(GraphArgs),

    /// Print the default view (or the one given with --view).
    Show(ShowArgs),

    /// Show conversation statistics.
    Stats(InputArgs),

    /// Toggle the favorite marker of nodes.
    #[command(alias = "fav")]
    Favorite(MarkArgs),

    /// Mark nodes as deleted (advisory; nodes stay visible, flagged).
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// View and manage configuration.
    Config(ConfigArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Input shared by every conversation command.
#[derive(Debug, Clone, clap::Args)]
pub struct InputArgs {
    /// Conversation export (JSON), or `-` to read stdin.
    pub input: PathBuf,

    /// Ignore stored favorites and delete markers.
    #[arg(long)]
    pub no_overlay: bool,
}

/// Arguments for the table command.
#[derive(Debug, Clone, clap::Args)]
pub struct TableArgs {
    /// Input.
    #[command(flatten)]
    pub input: InputArgs,

    /// Write CSV instead of an aligned table.
    #[arg(long)]
    pub csv: bool,

    /// Characters of content shown per row.
    #[arg(short = 'w', long)]
    pub width: Option<usize>,
}

/// Arguments for the graph command.
#[derive(Debug, Clone, clap::Args)]
pub struct GraphArgs {
    /// Input.
    #[command(flatten)]
    pub input: InputArgs,

    /// Write Graphviz DOT to stdout.
    #[arg(long, conflicts_with = "out")]
    pub dot: bool,

    /// Render the graph as a DOT file at this path.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the show command.
#[derive(Debug, Clone, clap::Args)]
pub struct ShowArgs {
    /// Input.
    #[command(flatten)]
    pub input: InputArgs,

    /// View to print instead of the configured default.
    #[arg(long, value_enum)]
    pub view: Option<ViewArg>,
}

/// Arguments for the favorite command.
#[derive(Debug, Clone, clap::Args)]
pub struct MarkArgs {
    /// Conversation export (JSON).
    pub input: PathBuf,

    /// Node ids to toggle.
    #[arg(required = true)]
    pub node_ids: Vec<String>,
}

/// Arguments for the delete command.
#[derive(Debug, Clone, clap::Args)]
pub struct DeleteArgs {
    /// Nodes to mark.
    #[command(flatten)]
    pub mark: MarkArgs,

    /// Withdraw the delete marker instead.
    #[arg(long)]
    pub restore: bool,
}

/// Arguments for the config command.
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Config action.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommand actions.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show all configuration values.
    Show,

    /// Show configuration file path.
    Path,

    /// Initialize configuration file with defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Arguments for the completions command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// PowerShell.
    Powershell,
    /// Elvish shell.
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completions.
pub fn generate_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, "chainview", &mut io::stdout());
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    match &cli.command {
        Commands::Tree(args) => commands::views::run(&cli, args, ViewKind::Tree),
        Commands::List(args) => commands::views::run(&cli, args, ViewKind::List),
        Commands::Table(args) => commands::table::run(&cli, args),
        Commands::Graph(args) => commands::graph::run(&cli, args),
        Commands::Show(args) => commands::views::run_show(&cli, args),
        Commands::Stats(args) => commands::stats::run(&cli, args),
        Commands::Favorite(args) => commands::favorite::run(&cli, args),
        Commands::Delete(args) => commands::delete::run(&cli, args),
        Commands::Config(args) => commands::config::run(&cli, args),
        Commands::Completions(args) => {
            generate_completions(args.shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_view_command() {
        let cli = Cli::try_parse_from(["chainview", "list", "chat.json", "-s", "Rust", "--json"])
            .unwrap();
        assert_eq!(cli.search_term(), "Rust");
        assert_eq!(cli.effective_output(), OutputFormat::Json);
        assert!(matches!(cli.command, Commands::List(ref a) if a.input == PathBuf::from("chat.json")));
    }

    #[test]
    fn test_graph_flags_conflict() {
        let result = Cli::try_parse_from(["chainview", "graph", "c.json", "--dot", "--out", "g.dot"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_favorite_requires_node() {
        assert!(Cli::try_parse_from(["chainview", "favorite", "c.json"]).is_err());
        let cli = Cli::try_parse_from(["chainview", "fav", "c.json", "n1", "n2"]).unwrap();
        let Commands::Favorite(args) = cli.command else {
            panic!("expected favorite");
        };
        assert_eq!(args.node_ids, vec!["n1", "n2"]);
    }

    #[test]
    fn test_view_arg_conversion() {
        assert_eq!(ViewKind::from(ViewArg::Graph), ViewKind::Graph);
        assert_eq!(ViewKind::from(ViewArg::Tree), ViewKind::Tree);
    }

    #[test]
    fn test_log_level_to_filter() {
        assert_eq!(LogLevel::Error.to_filter_string(), "error");
        assert_eq!(LogLevel::Warn.to_filter_string(), "warn");
        assert_eq!(LogLevel::Trace.to_filter_string(), "trace");
    }
}
