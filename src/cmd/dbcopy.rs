use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use log::{error, info};

use crate::copy::HostCopyJob;
use crate::rest::dbcopy::{DbCopyRestClient, HostKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DbCopyAction {
    Submit,
    Retrieve,
    List,
    Delete,
    Email,
    KillJob,
}

/// Copy databases via the host-based copy REST service.
#[derive(Args, Debug)]
pub struct DbCopyArgs {
    /// Copy database REST service URI
    #[arg(short = 'u', long)]
    uri: String,

    /// Action to take
    #[arg(short = 'a', long)]
    action: DbCopyAction,

    /// Copy job identifier to retrieve
    #[arg(short = 'j', long)]
    job_id: Option<String>,

    /// Source host for the copy in the form host:port
    #[arg(short = 's', long)]
    src_host: Option<String>,

    /// List of hosts to copy to in the form host:port,host:port
    #[arg(short = 't', long)]
    tgt_host: Option<String>,

    /// List of databases to include in the copy. If not defined all the databases from the server will be copied
    #[arg(short = 'i', long)]
    src_incl_db: Option<String>,

    /// List of databases to exclude from the copy
    #[arg(short = 'k', long)]
    src_skip_db: Option<String>,

    /// List of tables to include in the copy
    #[arg(short = 'p', long)]
    src_incl_tables: Option<String>,

    /// List of tables to exclude from the copy
    #[arg(short = 'd', long)]
    src_skip_tables: Option<String>,

    /// Database name on target server. Used for renaming databases
    #[arg(short = 'n', long)]
    tgt_db_name: Option<String>,

    /// Skip database optimization step after the copy. Useful for very large databases
    #[arg(short = 'o', long)]
    skip_optimize: bool,

    /// Delete target database before copy
    #[arg(short = 'w', long)]
    wipe_target: bool,

    /// Convert InnoDB tables to MyISAM after copy
    #[arg(short = 'c', long)]
    convert_innodb: bool,

    /// Email where to send the report
    #[arg(short = 'e', long)]
    email_list: Option<String>,

    /// User name
    #[arg(short = 'r', long)]
    user: Option<String>,

    /// Skip host:port server validation
    #[arg(long)]
    skip_check: bool,
}

pub async fn run(args: &DbCopyArgs) -> Result<()> {
    let client = DbCopyRestClient::new(&args.uri)?;
    match args.action {
        DbCopyAction::Submit => submit(&client, args).await,
        DbCopyAction::Retrieve => {
            let job_id = required(&args.job_id, "--job_id")?;
            let job = client.retrieve_job(job_id).await?;
            if let Err(err) = client.print_job(&job, args.user.as_deref(), true) {
                error!("{err}");
            }
            Ok(())
        }
        DbCopyAction::List => {
            for job in client.list_jobs().await? {
                if let Err(err) = client.print_job(&job, args.user.as_deref(), false) {
                    error!("{err}");
                }
            }
            Ok(())
        }
        DbCopyAction::Delete => {
            let job_id = required(&args.job_id, "--job_id")?;
            client.delete_job(job_id).await?;
            info!("Job {job_id} was successfully deleted");
            Ok(())
        }
        DbCopyAction::Email => {
            let job_id = required(&args.job_id, "--job_id")?;
            let email = required(&args.email_list, "--email_list")?;
            client.job_email(job_id, email).await?;
            Ok(())
        }
        DbCopyAction::KillJob => {
            let job_id = required(&args.job_id, "--job_id")?;
            client.kill_job(job_id).await?;
            info!("Job {job_id} was killed");
            Ok(())
        }
    }
}

async fn submit(client: &DbCopyRestClient, args: &DbCopyArgs) -> Result<()> {
    let src_host = required(&args.src_host, "--src_host")?;
    let tgt_host = required(&args.tgt_host, "--tgt_host")?;
    let email_list = required(&args.email_list, "--email_list")?;
    let user = required(&args.user, "--user")?;

    info!("Submitting {src_host} -> {tgt_host}");
    if !args.skip_check {
        info!("Checking source and target hostname validity...");
        let source_errs = client.check_hosts(HostKind::Source, &[src_host.as_str()]).await?;
        let targets: Vec<&str> = tgt_host.split(',').collect();
        let target_errs = client.check_hosts(HostKind::Target, &targets).await?;
        for err in &source_errs {
            error!("Source hostname error: {err}");
        }
        for err in &target_errs {
            error!("Target hostname error: {err}");
        }
        if !source_errs.is_empty() || !target_errs.is_empty() {
            bail!("Host validation failed, nothing submitted");
        }
    }

    let job = HostCopyJob {
        src_host: src_host.clone(),
        src_incl_db: args.src_incl_db.clone(),
        src_skip_db: args.src_skip_db.clone(),
        src_incl_tables: args.src_incl_tables.clone(),
        src_skip_tables: args.src_skip_tables.clone(),
        tgt_host: tgt_host.clone(),
        tgt_db_name: args.tgt_db_name.clone(),
        skip_optimize: args.skip_optimize,
        wipe_target: args.wipe_target,
        convert_innodb: args.convert_innodb,
        email_list: email_list.clone(),
        user: user.clone(),
    };
    let job_id = client.submit_job(&job).await?;
    info!("Job submitted with ID {job_id}");
    Ok(())
}

fn required<'a>(value: &'a Option<String>, flag: &str) -> Result<&'a String> {
    value.as_ref().with_context(|| format!("{flag} is required for this action"))
}
