mod commands;
mod runner;
mod tap;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Axon graph-to-Go transpiler.
#[derive(Parser)]
#[command(name = "axon", version, about = "Axon graph-to-Go transpiler")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log pipeline progress to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transpile a graph file and write the Go source
    Build {
        /// Path to the graph file (.ax, .json or .axd)
        file: PathBuf,
        /// Directory to write main.go into
        #[arg(long, default_value = "out")]
        out: PathBuf,
        /// Go package name of the generated file
        #[arg(long, default_value = "main")]
        package: String,
    },

    /// Validate a graph by transpiling it without writing anything
    Check {
        /// Path to the graph file (.ax, .json or .axd)
        file: PathBuf,
    },

    /// Convert a graph file between .ax/.json and the commented .axd form
    Convert {
        /// Graph file to read
        input: PathBuf,
        /// Graph file to write; its extension picks the encoding
        #[arg(id = "convert_output", value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Describe every node of a graph in plain language
    Describe {
        /// Path to the graph file (.ax, .json or .axd)
        file: PathBuf,
    },

    /// Run the conformance test suite
    Test {
        /// Path to the conformance suite directory
        #[arg(default_value = "conformance")]
        suite_dir: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build { file, out, package } => {
            commands::build::cmd_build(&file, &out, &package, cli.output, cli.quiet);
        }
        Commands::Check { file } => {
            commands::check::cmd_check(&file, cli.output, cli.quiet);
        }
        Commands::Convert { input, output } => {
            commands::convert::cmd_convert(&input, &output, cli.output, cli.quiet);
        }
        Commands::Describe { file } => {
            commands::describe::cmd_describe(&file, cli.output, cli.quiet);
        }
        Commands::Test { suite_dir } => {
            commands::test::cmd_test(&suite_dir, cli.quiet);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Report a transpile failure. JSON output is printed even when quiet so
/// tools driving the CLI always get a machine-readable reason.
pub(crate) fn report_transpile_error(
    err: &axon_core::TranspileError,
    output: OutputFormat,
    quiet: bool,
) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&err.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", err));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", err);
            }
        }
    }
}
