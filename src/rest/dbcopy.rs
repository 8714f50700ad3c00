use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::copy::HostCopyJob;
use crate::rest::client::{as_job_list, field, job_id, render, RestClient};
use crate::rest::RestError;

/// Domain suffix accepted for fully-qualified copy hosts.
const EBI_DOMAIN: &str = ".ebi.ac.uk";

/// Side of the copy a host list belongs to.
#[derive(Copy, Clone, Debug)]
pub enum HostKind {
    Source,
    Target,
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HostKind::Source => write!(f, "source"),
            HostKind::Target => write!(f, "target"),
        }
    }
}

/// A host registered with the copy service.
#[derive(Debug, Deserialize)]
pub struct RegisteredHost {
    pub name: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
struct HostList {
    results: Vec<RegisteredHost>,
}

/// Client for the host-based database copy REST API. The service base URI
/// already points at the request endpoint, so jobs live directly under it.
pub struct DbCopyRestClient {
    client: RestClient,
}

impl DbCopyRestClient {
    pub fn new(uri: &str) -> Result<DbCopyRestClient> {
        Ok(DbCopyRestClient { client: RestClient::new(uri)? })
    }

    pub async fn submit_job(&self, job: &HostCopyJob) -> Result<String, RestError> {
        let response = self.client.post_json(&self.client.endpoint(""), job).await?;
        job_id(&response)
    }

    pub async fn retrieve_job(&self, job_id: &str) -> Result<Value, RestError> {
        self.client.get_json(&self.client.endpoint(job_id)).await
    }

    pub async fn list_jobs(&self) -> Result<Vec<Value>, RestError> {
        let response = self.client.get_json(&self.client.endpoint("")).await?;
        as_job_list(response)
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), RestError> {
        self.client.delete(&self.client.endpoint(job_id)).await
    }

    pub async fn kill_job(&self, job_id: &str) -> Result<(), RestError> {
        let url = self.client.endpoint(&format!("{job_id}/kill"));
        self.client.post_json(&url, &Value::Null).await?;
        Ok(())
    }

    pub async fn job_email(&self, job_id: &str, email: &str) -> Result<(), RestError> {
        let url = self.client.endpoint(&format!("{job_id}/email"));
        let payload = serde_json::json!({ "email_list": email });
        self.client.post_json(&url, &payload).await?;
        Ok(())
    }

    /// Hosts the service will accept on one side of a copy.
    pub async fn retrieve_host_list(
        &self,
        kind: HostKind,
    ) -> Result<Vec<RegisteredHost>, RestError> {
        let url = self.client.endpoint(&format!("{kind}_host"));
        let response = self.client.get_json(&url).await?;
        let hosts: HostList = serde_json::from_value(response)
            .map_err(|err| RestError::Decode(format!("host list: {err}")))?;
        Ok(hosts.results)
    }

    /// Validate `host:port` strings against the service's allow-list,
    /// returning one human-readable error per invalid host.
    pub async fn check_hosts(
        &self,
        kind: HostKind,
        hosts: &[&str],
    ) -> Result<Vec<String>, RestError> {
        let registered = self.retrieve_host_list(kind).await?;
        let host_port_map: HashMap<String, u16> =
            registered.into_iter().map(|host| (host.name, host.port)).collect();
        Ok(hosts
            .iter()
            .filter_map(|host| check_host(host, &host_port_map))
            .collect())
    }

    /// Log one copy job record, optionally filtered to a submitting user.
    pub fn print_job(
        &self,
        job: &Value,
        user: Option<&str>,
        print_results: bool,
    ) -> Result<(), RestError> {
        let job_user = render(field(job, "user")?);
        if let Some(user) = user {
            if user != job_user {
                return Ok(());
            }
        }
        // newer service versions report a url, older ones a numeric job id
        let id = job.get("url").map(render).map_or_else(
            || field(job, "job_id").map(render),
            Ok,
        )?;
        let status = render(field(job, "overall_status")?);
        info!(
            "Job {} from ({}) to ({}) by {} - status: {}",
            id,
            render(field(job, "src_host")?),
            render(field(job, "tgt_host")?),
            job_user,
            status
        );
        if print_results && status == "Running" {
            let progress = field(job, "detailed_status")?
                .get("progress")
                .map(render)
                .ok_or_else(|| RestError::MissingField {
                    field: "detailed_status.progress",
                    response: job.to_string(),
                })?;
            info!("Copy status: {status}");
            info!("{progress} complete");
        }
        Ok(())
    }
}

/// Pure validation of one `host:port` string against the allow-list.
/// Returns a human-readable error, or `None` when the host is valid.
pub fn check_host(url: &str, host_port_map: &HashMap<String, u16>) -> Option<String> {
    let Some((host, port)) = url.split_once(':') else {
        return Some(format!("Invalid host, expected host:port: {url}"));
    };
    let Ok(port) = port.parse::<u16>() else {
        return Some(format!("Invalid port number: {url}"));
    };
    if host.contains('.') && !host.ends_with(EBI_DOMAIN) {
        return Some(format!("Invalid domain: {host}"));
    }
    let hostname = host.split('.').next().unwrap_or(host);
    match host_port_map.get(hostname) {
        None => Some(format!("Invalid hostname: {host}")),
        Some(&expected) if expected != port => {
            Some(format!("Invalid port for hostname: {host}. Please use port: {expected}"))
        }
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> HashMap<String, u16> {
        HashMap::from([
            ("mysql-ens-sta-1".to_string(), 4519),
            ("mysql-ens-general-prod-1".to_string(), 4525),
        ])
    }

    #[test]
    fn registered_host_and_port_is_valid() {
        assert_eq!(check_host("mysql-ens-sta-1:4519", &allow_list()), None);
        assert_eq!(check_host("mysql-ens-sta-1.ebi.ac.uk:4519", &allow_list()), None);
    }

    #[test]
    fn wrong_port_reports_the_registered_one() {
        let err = check_host("mysql-ens-sta-1:3306", &allow_list()).unwrap();
        assert_eq!(
            err,
            "Invalid port for hostname: mysql-ens-sta-1. Please use port: 4519"
        );
    }

    #[test]
    fn unregistered_hostname_is_rejected() {
        let err = check_host("mysql-unknown:4519", &allow_list()).unwrap();
        assert_eq!(err, "Invalid hostname: mysql-unknown");
    }

    #[test]
    fn foreign_domain_is_rejected() {
        let err = check_host("mysql-ens-sta-1.example.com:4519", &allow_list()).unwrap();
        assert_eq!(err, "Invalid domain: mysql-ens-sta-1.example.com");
    }

    #[test]
    fn malformed_host_port_is_rejected() {
        assert!(check_host("mysql-ens-sta-1", &allow_list()).is_some());
        assert!(check_host("mysql-ens-sta-1:port", &allow_list()).is_some());
    }
}
