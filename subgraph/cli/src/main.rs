mod config;
mod home_directory;
mod query;
mod schema;
mod sdl;
mod serve;
mod tracing_filter;

use {
    crate::{
        config::parse_config,
        home_directory::HomeDirectory,
        query::QueryCmd,
        sdl::{CheckCmd, SdlCmd},
        serve::ServeCmd,
        tracing_filter::RequestNoiseFilter,
    },
    clap::Parser,
    std::path::PathBuf,
    tracing_subscriber::{fmt, prelude::*, registry},
};

#[derive(Parser)]
#[command(author, version, about, next_display_order = None)]
struct Cli {
    /// Directory holding the config file [default: ~/.roboshare-subgraph]
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Print the API schema derived from the entity definitions
    Sdl(SdlCmd),

    /// Validate the entity definitions and the derived API schema
    Check(CheckCmd),

    /// Serve the GraphQL API over recorded indexing data
    Serve(ServeCmd),

    /// Query a running subgraph [alias: q]
    #[command(next_display_order = None, alias = "q")]
    Query(QueryCmd),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Find the home directory from the CLI `--home` flag.
    let app_dir = HomeDirectory::new_or_default(cli.home)?;

    // Parse the config file.
    let cfg = parse_config(app_dir.config_file())?;

    // Set up tracing. Logs go to stderr so that command output can be piped.
    registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(cfg.log_level.parse::<RequestNoiseFilter>()?)
        .init();

    match cli.command {
        Command::Sdl(cmd) => cmd.run(&cfg),
        Command::Check(cmd) => cmd.run(&cfg),
        Command::Serve(cmd) => cmd.run(cfg).await,
        Command::Query(cmd) => cmd.run(&cfg).await,
    }
}
