use clap::{Parser, Subcommand};
use log::error;

mod cmd;
mod config;
mod copy;
mod division;
mod metadata_db;
mod report;
mod rest;

/// Command-line clients for the Ensembl production REST services.
#[derive(Parser)]
#[command(name = "prodctl", version, about)]
struct Cli {
    /// Verbose output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit copy jobs computed from a genome change report
    CopyReport(cmd::copy_report::CopyReportArgs),
    /// Copy compara core databases to the vertannot staging server
    Vertannot(cmd::vertannot::VertannotArgs),
    /// Copy databases via the host-based copy REST service
    Dbcopy(cmd::dbcopy::DbCopyArgs),
    /// Copy databases via the URI-based copy REST service
    CopyDb(cmd::copy_db::CopyDbArgs),
    /// Load databases into the metadata registry
    Metadata(cmd::metadata::MetadataArgs),
    /// Interact with the genome metadata service
    GenomeMetadata(cmd::genome_metadata::GenomeMetadataArgs),
    /// Run datachecks via the datacheck REST service
    Datacheck(cmd::datacheck::DatacheckArgs),
    /// Interact with the GIFTs services
    Gifts(cmd::gifts::GiftsArgs),
    /// Submit and inspect production events
    Event(cmd::event::EventArgs),
    /// Hand over a database to downstream production
    Handover(cmd::handover::HandoverArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::CopyReport(args) => cmd::copy_report::run(args).await,
        Command::Vertannot(args) => cmd::vertannot::run(args).await,
        Command::Dbcopy(args) => cmd::dbcopy::run(args).await,
        Command::CopyDb(args) => cmd::copy_db::run(args).await,
        Command::Metadata(args) => cmd::metadata::run(args).await,
        Command::GenomeMetadata(args) => cmd::genome_metadata::run(args).await,
        Command::Datacheck(args) => cmd::datacheck::run(args).await,
        Command::Gifts(args) => cmd::gifts::run(args).await,
        Command::Event(args) => cmd::event::run(args).await,
        Command::Handover(args) => cmd::handover::run(args).await,
    };

    if let Err(err) = result {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
