use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod pipeline;
mod progress;
mod ui;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("cyrisk error: {error:#}");
            std::process::exit(1);
        }
    }
}

async fn run() -> anyhow::Result<i32> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    match cli.command.unwrap_or(cli::Commands::Run) {
        cli::Commands::Schema(args) => commands::schema::handle(&args).map(|()| 0),
        cli::Commands::Cache { action } => {
            let config = bootstrap::load_config(&flags)?;
            commands::cache::handle(&action, &config)
        }
        cli::Commands::Run => {
            let config = bootstrap::load_config(&flags)?;
            commands::run::handle(&config).await
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("CYRISK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
