//! CLI execution context

use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::output::OutputWriter;

/// Execution context for CLI commands
pub struct Context {
    pub output: OutputWriter,
}

impl Context {
    pub fn new(cli: &Cli) -> Self {
        init_tracing(cli.verbose);
        Self {
            output: OutputWriter::new(cli.output, cli.no_color),
        }
    }
}

/// Compact stderr logging, `warn` unless verbose. `RUST_LOG` wins when set.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
