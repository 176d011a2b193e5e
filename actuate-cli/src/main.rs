use clap::Parser;

mod cli;
mod commands;
mod context;
mod error;
mod output;

use actuate_runtime::CancellationToken;
use cli::{Cli, Commands};
use context::Context;
use error::CliResult;
use output::OutputMode;

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

async fn dispatch(cli: Cli, cancel: &CancellationToken) -> CliResult<()> {
    let ctx = Context::load(cli.global)?;
    match cli.command {
        Commands::Run(args) => commands::run(&ctx, args, cancel).await,
        Commands::Try(args) => commands::try_candidates(&ctx, args, cancel).await,
        Commands::Actions { command } => commands::actions(&ctx, command),
        Commands::Link(args) => commands::link(&ctx, args),
        Commands::Unlink { action } => commands::unlink(&ctx, &action),
        Commands::Links => commands::links(&ctx),
        Commands::Coverage => commands::coverage(&ctx).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.log_json);
    let output = OutputMode::new(cli.global.json, cli.global.pretty);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    if let Err(e) = dispatch(cli, &cancel).await {
        tracing::error!(error = %e, code = e.code(), "Command failed");
        output.report_error(&e);
        std::process::exit(e.exit_code());
    }
}
