use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::{error, info};
use serde_json::Value;

use crate::cmd::write_json;
use crate::rest::client::print_job;
use crate::rest::metadata::{MetadataClient, MetadataJob, MetadataListFilter};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MetadataAction {
    Submit,
    Retrieve,
    List,
    Delete,
    Email,
    KillJob,
}

/// Load databases into the metadata registry via its REST service.
#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Metadata database REST service URI
    #[arg(short = 'u', long)]
    uri: String,

    /// Action to take
    #[arg(short = 'a', long)]
    action: MetadataAction,

    /// Job id to retrieve. In "list" mode, used as a cut-off
    #[arg(short = 'i', long)]
    job_id: Option<String>,

    /// File to write output as JSON
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// File containing list of metadata and database URIs
    #[arg(short = 'f', long)]
    input_file: Option<PathBuf>,

    /// URI of database to load
    #[arg(short = 'd', long)]
    database_uri: Option<String>,

    /// Ensembl release number
    #[arg(short = 's', long)]
    e_release: Option<String>,

    /// Release date
    #[arg(short = 'r', long)]
    release_date: Option<String>,

    /// Is this the current release
    #[arg(short = 'c', long)]
    current_release: Option<String>,

    /// EG release number
    #[arg(short = 'g', long)]
    eg_release: Option<String>,

    /// Submitter. In "list" mode, used as a filter
    #[arg(short = 'e', long)]
    email: Option<String>,

    /// Comment. In "list" mode, used as a substring filter
    #[arg(short = 'n', long)]
    comment: Option<String>,

    /// Source of the database, e.g. Handover, Release load
    #[arg(short = 'b', long)]
    source: Option<String>,
}

pub async fn run(args: &MetadataArgs) -> Result<()> {
    let client = MetadataClient::new(&args.uri)?;
    match args.action {
        MetadataAction::Submit => submit(&client, args).await,
        MetadataAction::Retrieve => {
            let job_id = args.job_id.as_ref().context("--job_id is required to retrieve")?;
            let job = client.retrieve_job(job_id).await?;
            if let Err(err) = print_job(&job, true, true) {
                error!("{err}");
            }
            Ok(())
        }
        MetadataAction::List => {
            let filter = MetadataListFilter {
                email: args.email.clone(),
                cutoff_job_id: args.job_id.as_ref().and_then(|id| id.parse().ok()),
                comment: args.comment.clone(),
            };
            let jobs = client.list_jobs(&filter).await?;
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
        MetadataAction::Delete => {
            let job_id = args.job_id.as_ref().context("--job_id is required to delete")?;
            client.delete_job(job_id).await?;
            info!("Job {job_id} was successfully deleted");
            Ok(())
        }
        MetadataAction::Email => {
            let job_id = args.job_id.as_ref().context("--job_id is required")?;
            let email = args.email.as_ref().context("--email is required")?;
            client.results_email(job_id, email).await?;
            Ok(())
        }
        MetadataAction::KillJob => {
            let job_id = args.job_id.as_ref().context("--job_id is required")?;
            client.kill_job(job_id).await?;
            info!("Job {job_id} was killed");
            Ok(())
        }
    }
}

async fn submit(client: &MetadataClient, args: &MetadataArgs) -> Result<()> {
    let database_uris: Vec<String> = match &args.input_file {
        None => {
            let uri = args
                .database_uri
                .as_ref()
                .context("--database_uri is required to submit")?;
            vec![uri.clone()]
        }
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Can't read input file {}", path.display()))?;
            content
                .lines()
                .filter_map(|line| line.split_whitespace().next())
                .map(str::to_string)
                .collect()
        }
    };

    for database_uri in database_uris {
        info!("Submitting {database_uri} for metadata load");
        let job = MetadataJob {
            database_uri,
            e_release: args.e_release.clone(),
            eg_release: args.eg_release.clone(),
            release_date: args.release_date.clone(),
            current_release: args.current_release.clone(),
            email: args.email.clone(),
            comment: args.comment.clone(),
            source: args.source.clone(),
        };
        let job_id = client.submit_job(&job).await?;
        info!("Job submitted with ID {job_id}");
    }
    Ok(())
}
