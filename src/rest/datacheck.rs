use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::rest::client::{render, RestClient};
use crate::rest::RestError;

/// Submission payload for a datacheck run against one database or species.
#[derive(Debug, Clone, Serialize)]
pub struct DatacheckJob {
    pub server_url: String,
    pub dbname: Option<String>,
    pub species: Option<String>,
    pub division: Option<String>,
    pub db_type: Option<String>,
    pub datacheck_names: Option<String>,
    pub datacheck_groups: Option<String>,
    pub datacheck_types: Option<String>,
    pub email: Option<String>,
    pub tag: Option<String>,
}

/// Client for the datacheck execution REST service.
pub struct DatacheckClient {
    client: RestClient,
}

impl DatacheckClient {
    pub fn new(uri: &str) -> Result<DatacheckClient> {
        Ok(DatacheckClient { client: RestClient::new(uri)? })
    }

    pub async fn submit_job(&self, job: &DatacheckJob) -> Result<String, RestError> {
        self.client.submit_job(job).await
    }

    pub async fn retrieve_job(&self, job_id: &str) -> Result<Value, RestError> {
        self.client.retrieve_job(job_id).await
    }

    /// List jobs, optionally restricted to a submission tag and to failures.
    pub async fn list_jobs(
        &self,
        tag: Option<&str>,
        failure_only: bool,
    ) -> Result<Vec<Value>, RestError> {
        let jobs = self.client.list_jobs().await?;
        Ok(jobs
            .into_iter()
            .filter(|job| matches_tag(job, tag))
            .filter(|job| !failure_only || is_failure(job))
            .collect())
    }
}

fn matches_tag(job: &Value, tag: Option<&str>) -> bool {
    let Some(tag) = tag else { return true };
    job.get("input")
        .and_then(|input| input.get("tag"))
        .map(render)
        .is_some_and(|job_tag| job_tag == tag)
}

fn is_failure(job: &Value) -> bool {
    job.get("status").map(render).is_some_and(|status| status == "failed")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tag_and_failure_filters() {
        let failed = json!({"status": "failed", "input": {"tag": "110-dc"}});
        let passed = json!({"status": "complete", "input": {"tag": "110-dc"}});
        let other = json!({"status": "failed", "input": {"tag": "109-dc"}});

        assert!(matches_tag(&failed, None));
        assert!(matches_tag(&failed, Some("110-dc")));
        assert!(!matches_tag(&other, Some("110-dc")));
        assert!(is_failure(&failed));
        assert!(!is_failure(&passed));
    }
}
