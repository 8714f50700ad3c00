use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::{error, info};
use serde_json::Value;

use crate::cmd::write_json;
use crate::rest::client::print_job;
use crate::rest::datacheck::{DatacheckClient, DatacheckJob};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DatacheckAction {
    Submit,
    Retrieve,
    List,
}

/// Run datachecks via the datacheck REST service.
#[derive(Args, Debug)]
pub struct DatacheckArgs {
    /// Datacheck REST service URI
    #[arg(short = 'u', long)]
    uri: String,

    /// Action to take
    #[arg(short = 'a', long)]
    action: DatacheckAction,

    /// Datacheck job identifier to retrieve
    #[arg(short = 'i', long)]
    job_id: Option<String>,

    /// File to write output as JSON
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// URL of database server
    #[arg(short = 's', long)]
    server_url: Option<String>,

    /// Database name
    #[arg(long)]
    dbname: Option<String>,

    /// Species production name
    #[arg(long)]
    species: Option<String>,

    /// Division
    #[arg(long)]
    division: Option<String>,

    /// Database type
    #[arg(long)]
    db_type: Option<String>,

    /// Datacheck names, multiple names comma-separated
    #[arg(short = 'n', long)]
    datacheck_names: Option<String>,

    /// Datacheck groups, multiple names comma-separated
    #[arg(short = 'g', long)]
    datacheck_groups: Option<String>,

    /// Datacheck type (advisory or critical)
    #[arg(long)]
    datacheck_types: Option<String>,

    /// Email address for pipeline reports
    #[arg(short = 'e', long)]
    email: Option<String>,

    /// Tag to collate results and facilitate filtering
    #[arg(short = 't', long)]
    tag: Option<String>,

    /// Show failures only
    #[arg(short = 'f', long)]
    failure_only: bool,
}

pub async fn run(args: &DatacheckArgs) -> Result<()> {
    let client = DatacheckClient::new(&args.uri)?;
    match args.action {
        DatacheckAction::Submit => {
            let server_url = args.server_url.as_ref().context("--server_url is required to submit")?;
            let job = DatacheckJob {
                server_url: server_url.clone(),
                dbname: args.dbname.clone(),
                species: args.species.clone(),
                division: args.division.clone(),
                db_type: args.db_type.clone(),
                datacheck_names: args.datacheck_names.clone(),
                datacheck_groups: args.datacheck_groups.clone(),
                datacheck_types: args.datacheck_types.clone(),
                email: args.email.clone(),
                tag: args.tag.clone(),
            };
            let job_id = client.submit_job(&job).await?;
            info!("Job submitted with ID {job_id}");
            Ok(())
        }
        DatacheckAction::Retrieve => {
            let job_id = args.job_id.as_ref().context("--job_id is required to retrieve")?;
            let job = client.retrieve_job(job_id).await?;
            if let Err(err) = print_job(&job, true, true) {
                error!("{err}");
            }
            Ok(())
        }
        DatacheckAction::List => {
            let jobs = client.list_jobs(args.tag.as_deref(), args.failure_only).await?;
            match &args.output_file {
                Some(path) => write_json(path, &Value::Array(jobs))?,
                None => {
                    for job in &jobs {
                        if let Err(err) = print_job(job, false, false) {
                            error!("{err}");
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
