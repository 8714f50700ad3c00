use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::{error, info};
use serde_json::Value;

use crate::rest::client::print_job;
use crate::rest::event::EventClient;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EventAction {
    Submit,
    Retrieve,
    List,
    Delete,
    Events,
    Processes,
}

/// Submit events and inspect their handling processes.
#[derive(Args, Debug)]
pub struct EventArgs {
    /// Event REST service URI
    #[arg(short = 'u', long)]
    uri: String,

    /// Action to take
    #[arg(short = 'a', long)]
    action: EventAction,

    /// Event job identifier to retrieve
    #[arg(short = 'i', long)]
    job_id: Option<String>,

    /// Event as JSON
    #[arg(short = 'e', long)]
    event: Option<String>,

    /// Process name
    #[arg(short = 'p', long)]
    process: Option<String>,
}

pub async fn run(args: &EventArgs) -> Result<()> {
    let client = EventClient::new(&args.uri)?;
    match args.action {
        EventAction::Submit => {
            let event = args.event.as_ref().context("--event is required to submit")?;
            let event: Value =
                serde_json::from_str(event).context("Event is not valid JSON")?;
            let job_id = client.submit_job(&event).await?;
            info!("Job submitted with ID {job_id}");
            Ok(())
        }
        EventAction::Retrieve => {
            let process = args.process.as_ref().context("--process is required to retrieve")?;
            let job_id = args.job_id.as_ref().context("--job_id is required to retrieve")?;
            let job = client.retrieve_job(process, job_id).await?;
            if let Err(err) = print_job(&job, true, true) {
                error!("{err}");
            }
            Ok(())
        }
        EventAction::List => {
            let process = args.process.as_ref().context("--process is required to list")?;
            for job in client.list_jobs(process).await? {
                if let Err(err) = print_job(&job, false, false) {
                    error!("{err}");
                }
            }
            Ok(())
        }
        EventAction::Delete => {
            let job_id = args.job_id.as_ref().context("--job_id is required to delete")?;
            client.delete_job(job_id).await?;
            info!("Job {job_id} was successfully deleted");
            Ok(())
        }
        EventAction::Events => {
            info!("{}", client.events().await?);
            Ok(())
        }
        EventAction::Processes => {
            info!("{}", client.processes().await?);
            Ok(())
        }
    }
}
