use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::{error, info};
use serde_json::Value;

use crate::cmd::write_json;
use crate::rest::client::print_job;
use crate::rest::gifts::GiftsClient;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum GiftsAction {
    Submit,
    Retrieve,
    List,
}

/// Interact with the GIFTs cross-reference sync service.
#[derive(Args, Debug)]
pub struct GiftsArgs {
    /// GIFTs production service REST URI
    #[arg(short = 'u', long)]
    uri: String,

    /// Action to take
    #[arg(short = 'a', long)]
    action: GiftsAction,

    /// GIFTs job identifier to retrieve
    #[arg(short = 'i', long)]
    job_id: Option<String>,

    /// File to write output as JSON
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// Ensembl release number
    #[arg(short = 'r', long)]
    ensembl_release: Option<String>,

    /// Execution environment (dev or staging)
    #[arg(short = 'n', long)]
    environment: Option<String>,

    /// Email address for pipeline reports
    #[arg(short = 'e', long)]
    email: Option<String>,

    /// Tag for annotating/retrieving a submission
    #[arg(short = 't', long)]
    tag: Option<String>,
}

pub async fn run(args: &GiftsArgs) -> Result<()> {
    let client = GiftsClient::new(&args.uri)?;
    match args.action {
        GiftsAction::Submit => {
            let release = args
                .ensembl_release
                .as_ref()
                .context("--ensembl_release is required to submit")?;
            let environment =
                args.environment.as_ref().context("--environment is required to submit")?;
            let email = args.email.as_ref().context("--email is required to submit")?;
            let job_id =
                client.submit_job(release, environment, email, args.tag.as_deref()).await?;
            info!("Job submitted with ID {job_id}");
            Ok(())
        }
        GiftsAction::Retrieve => {
            let job_id = args.job_id.as_ref().context("--job_id is required to retrieve")?;
            let job = client.retrieve_job(job_id).await?;
            if let Err(err) = print_job(&job, true, true) {
                error!("{err}");
            }
            Ok(())
        }
        GiftsAction::List => {
            let jobs = client.list_jobs(args.tag.as_deref()).await?;
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
