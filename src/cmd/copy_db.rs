use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::{error, info};
use serde_json::Value;

use crate::cmd::write_json;
use crate::copy::CopyJob;
use crate::rest::copydb::DbCopyClient;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CopyDbAction {
    Submit,
    Retrieve,
    List,
    Delete,
    Email,
    KillJob,
}

/// Copy databases via the URI-based copy REST service.
#[derive(Args, Debug)]
pub struct CopyDbArgs {
    /// Copy database REST service URI
    #[arg(short = 'u', long)]
    uri: String,

    /// Action to take
    #[arg(short = 'a', long)]
    action: CopyDbAction,

    /// Copy job identifier to retrieve
    #[arg(short = 'i', long)]
    job_id: Option<String>,

    /// File to write output as JSON
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// File containing list of source and target URIs
    #[arg(short = 'f', long)]
    input_file: Option<PathBuf>,

    /// URI of database to copy from
    #[arg(short = 's', long)]
    source_db_uri: Option<String>,

    /// URI of database to copy to
    #[arg(short = 't', long)]
    target_db_uri: Option<String>,

    /// List of tables to copy
    #[arg(short = 'y', long)]
    only_tables: Option<String>,

    /// List of tables to skip
    #[arg(short = 'n', long)]
    skip_tables: Option<String>,

    /// Incremental database update using rsync checksum
    #[arg(short = 'p', long)]
    update: Option<String>,

    /// Drop database on target server before copy
    #[arg(short = 'd', long)]
    drop: Option<String>,

    /// Convert InnoDB tables to MyISAM after copy
    #[arg(short = 'c', long)]
    convert_innodb: bool,

    /// Skip the database optimization step after the copy. Useful for very large databases
    #[arg(short = 'k', long)]
    skip_optimize: bool,

    /// Email where to send the report
    #[arg(short = 'e', long)]
    email: Option<String>,
}

pub async fn run(args: &CopyDbArgs) -> Result<()> {
    let client = DbCopyClient::new(&args.uri)?;
    match args.action {
        CopyDbAction::Submit => submit(&client, args).await,
        CopyDbAction::Retrieve => {
            let job_id = args.job_id.as_ref().context("--job_id is required to retrieve")?;
            let job = client.retrieve_job(job_id).await?;
            if let Err(err) = client.print_job(&job, true, true) {
                error!("{err}");
            }
            Ok(())
        }
        CopyDbAction::List => {
            let jobs = client.list_jobs().await?;
            match &args.output_file {
                Some(path) => write_json(path, &Value::Array(jobs))?,
                None => {
                    for job in &jobs {
                        if let Err(err) = client.print_job(job, false, false) {
                            error!("{err}");
                        }
                    }
                }
            }
            Ok(())
        }
        CopyDbAction::Delete => {
            let job_id = args.job_id.as_ref().context("--job_id is required to delete")?;
            client.delete_job(job_id).await?;
            info!("Job {job_id} was successfully deleted");
            Ok(())
        }
        CopyDbAction::Email => {
            let job_id = args.job_id.as_ref().context("--job_id is required")?;
            let email = args.email.as_ref().context("--email is required")?;
            client.job_email(job_id, email).await?;
            Ok(())
        }
        CopyDbAction::KillJob => {
            let job_id = args.job_id.as_ref().context("--job_id is required")?;
            client.kill_job(job_id).await?;
            info!("Job {job_id} was killed");
            Ok(())
        }
    }
}

async fn submit(client: &DbCopyClient, args: &CopyDbArgs) -> Result<()> {
    let email = args.email.as_ref().context("--email is required to submit")?;
    let uri_pairs: Vec<(String, String)> = match &args.input_file {
        None => {
            let source = args
                .source_db_uri
                .as_ref()
                .context("--source_db_uri is required to submit")?;
            let target = args
                .target_db_uri
                .as_ref()
                .context("--target_db_uri is required to submit")?;
            vec![(source.clone(), target.clone())]
        }
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Can't read input file {}", path.display()))?;
            content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| {
                    let mut uris = line.split_whitespace();
                    match (uris.next(), uris.next()) {
                        (Some(source), Some(target)) => {
                            Ok((source.to_string(), target.to_string()))
                        }
                        _ => anyhow::bail!("Expected source and target URI, got: {line}"),
                    }
                })
                .collect::<Result<_>>()?
        }
    };

    for (source, target) in uri_pairs {
        info!("Submitting {source} -> {target}");
        let job = CopyJob {
            source_db_uri: source,
            target_db_uri: target,
            only_tables: args.only_tables.clone(),
            skip_tables: args.skip_tables.clone(),
            update: args.update.clone(),
            drop: args.drop.clone(),
            convert_innodb: args.convert_innodb,
            skip_optimize: args.skip_optimize,
            email: email.clone(),
        };
        let job_id = client.submit_job(&job).await?;
        info!("Job submitted with ID {job_id}");
    }
    Ok(())
}
