use clap::Parser;
use clap::Subcommand;
use cmd::command::resolve;
use cmd::command::resolve::Resolve;
use cmd::config::Config;
use cmd::error::Error;
use cmd::error::Result;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[derive(Subcommand, Clone)]
enum Commands {
    /// Resolve a funnels query into its funnel query context
    Resolve(Resolve),
}

#[derive(Parser)]
#[command(propagate_version = true)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let Some(command) = args.command else {
        return Err(Error::BadRequest("no command specified".to_string()));
    };

    let cfg: common::config::Config = match &command {
        Commands::Resolve(args) => match &args.config {
            Some(path) => Config::load(path)?.try_into()?,
            None => common::config::Config::default(),
        },
    };

    // stdout carries the resolved context
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cfg.log.level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(Error::SetGlobalDefaultError)?;

    let version = env!("CARGO_PKG_VERSION");
    info!("funnel-ctx v{version}");

    match &command {
        Commands::Resolve(args) => resolve::start(args, cfg)?,
    }

    Ok(())
}
