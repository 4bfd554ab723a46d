use clap::Parser;

mod cli;
mod commands;
mod context;
mod output;

use cli::{Cli, Commands};
use context::Context;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let ctx = Context::new(&cli);

    let result = match &cli.command {
        Commands::Run(args) => commands::run::execute(args, &ctx).await,
        Commands::Analyze(args) => commands::analyze::execute(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
