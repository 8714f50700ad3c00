use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::{info, warn};

use crate::config::{host_port, resolve_server, ServerConfig};
use crate::copy::{chunk_databases, HostCopyJob, PAYLOAD_LIMIT};
use crate::division::Division;
use crate::metadata_db;
use crate::rest::dbcopy::DbCopyRestClient;

/// Compara species lists published alongside each release.
const GITHUB_BASE: &str =
    "https://raw.githubusercontent.com/Ensembl/ensembl-compara/release/{version}/conf/{division}/allowed_species.json";

/// Divisions handled by the vertannot staging copy, with the logical name of
/// their staging server.
const DIVISION_HOSTS: [(Division, &str); 3] = [
    (Division::Vertebrates, "st1"),
    (Division::Plants, "st3"),
    (Division::Metazoa, "st3"),
];

/// Copy the compara-allowed core databases of a release to the vertannot
/// staging server, batching databases into size-limited jobs.
#[derive(Args, Debug)]
pub struct VertannotArgs {
    /// Source type (e.g. sta-a, sta-b) or server name; defaults per division
    #[arg(short = 's', long)]
    source_server: Option<String>,

    /// Target type or server name
    #[arg(short = 't', long, default_value = "mysql-ens-vertannot-staging")]
    target_server: String,

    /// User submitting the job
    #[arg(short = 'u', long, default_value_t = whoami())]
    user: String,

    /// Process only one division
    #[arg(short = 'd', long)]
    division: Option<Division>,

    /// Ensembl version
    #[arg(short = 'v', long)]
    ens_version: u32,

    /// Config file containing staging servers
    #[arg(short = 'c', long)]
    config_file: PathBuf,

    /// Copy database REST service URL (defaults to the config file entry)
    #[arg(long)]
    dbcopy_url: Option<String>,

    /// Metadata database MySQL URL (defaults to the config file entry)
    #[arg(long)]
    metadata_url: Option<String>,

    /// Prints copy jobs without submitting them
    #[arg(short = 'D', long)]
    dry_run: bool,
}

fn whoami() -> String {
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

pub async fn run(args: &VertannotArgs) -> Result<()> {
    let config = ServerConfig::load(&args.config_file)?;
    let dbcopy_url = args
        .dbcopy_url
        .clone()
        .or_else(|| config.dbcopy_url.clone())
        .context("No dbcopy service URL given on the command line or in the config file")?;
    let metadata_url = args
        .metadata_url
        .clone()
        .or_else(|| config.metadata_url.clone())
        .context("No metadata database URL given on the command line or in the config file")?;

    let divisions: Vec<(Division, &str)> = match args.division {
        Some(division) => DIVISION_HOSTS
            .into_iter()
            .filter(|(d, _)| *d == division)
            .collect(),
        None => DIVISION_HOSTS.to_vec(),
    };
    if divisions.is_empty() {
        anyhow::bail!("Division {} is not handled by the vertannot copy", args.division.map(|d| d.to_string()).unwrap_or_default());
    }

    let http = reqwest::Client::new();
    let client = DbCopyRestClient::new(&dbcopy_url)?;
    let pool = metadata_db::connect(&metadata_url).await?;

    for (division, host) in divisions {
        let species = match allowed_species(&http, args.ens_version, division).await {
            Ok(species) => species,
            Err(err) => {
                warn!("Unable to load compara species for {division}: {err:#}");
                continue;
            }
        };
        let databases =
            metadata_db::core_databases(&pool, args.ens_version, division, &species).await?;
        if databases.is_empty() {
            warn!("No database retrieved for {division}");
            continue;
        }

        let source_name = match &args.source_server {
            Some(name) => name.clone(),
            None => staging_host(host, args.ens_version),
        };
        let src_host = host_port(&resolve_server(&config.servers, division, &source_name))?;
        let tgt_host = host_port(&resolve_server(&config.servers, division, &args.target_server))?;

        for chunk in chunk_databases(&databases, PAYLOAD_LIMIT) {
            let job = HostCopyJob {
                src_host: src_host.clone(),
                src_incl_db: Some(chunk.join(",")),
                src_skip_db: None,
                src_incl_tables: None,
                src_skip_tables: None,
                tgt_host: tgt_host.clone(),
                tgt_db_name: None,
                skip_optimize: false,
                wipe_target: false,
                convert_innodb: false,
                email_list: format!("{}@ebi.ac.uk", args.user),
                user: args.user.clone(),
            };
            if args.dry_run {
                println!("{job:?}");
            } else {
                let job_id = client.submit_job(&job).await?;
                info!("Job submitted with ID {job_id}");
            }
        }
    }
    pool.close().await;
    Ok(())
}

/// Staging shortcut hosts alternate each release; odd versions live on the
/// `-b` server of the pair.
fn staging_host(host: &str, ens_version: u32) -> String {
    if ens_version % 2 == 1 {
        format!("{host}-b")
    } else {
        host.to_string()
    }
}

async fn allowed_species(
    http: &reqwest::Client,
    ens_version: u32,
    division: Division,
) -> Result<Vec<String>> {
    let url = GITHUB_BASE
        .replace("{version}", &ens_version.to_string())
        .replace("{division}", &division.to_string());
    info!("Fetching allowed species from {url}");
    let response = http.get(&url).send().await.context("Fetching allowed species list")?;
    let response = response.error_for_status().context("Allowed species list not available")?;
    response.json().await.context("Malformed allowed species list")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_releases_use_the_b_server() {
        assert_eq!(staging_host("st1", 110), "st1");
        assert_eq!(staging_host("st1", 111), "st1-b");
    }
}
