use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::rest::client::{render, RestClient};
use crate::rest::RestError;

/// Submission payload for a metadata load.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataJob {
    pub database_uri: String,
    pub e_release: Option<String>,
    pub eg_release: Option<String>,
    pub release_date: Option<String>,
    pub current_release: Option<String>,
    pub email: Option<String>,
    pub comment: Option<String>,
    pub source: Option<String>,
}

/// Filters applied to a job listing. The comment filter is a substring
/// match on the submission comment.
#[derive(Debug, Default)]
pub struct MetadataListFilter {
    pub email: Option<String>,
    pub cutoff_job_id: Option<u64>,
    pub comment: Option<String>,
}

/// Client for the metadata load REST service.
pub struct MetadataClient {
    client: RestClient,
}

impl MetadataClient {
    pub fn new(uri: &str) -> Result<MetadataClient> {
        Ok(MetadataClient { client: RestClient::new(uri)? })
    }

    pub async fn submit_job(&self, job: &MetadataJob) -> Result<String, RestError> {
        self.client.submit_job(job).await
    }

    pub async fn retrieve_job(&self, job_id: &str) -> Result<Value, RestError> {
        self.client.retrieve_job(job_id).await
    }

    pub async fn list_jobs(&self, filter: &MetadataListFilter) -> Result<Vec<Value>, RestError> {
        let jobs = self.client.list_jobs().await?;
        Ok(jobs.into_iter().filter(|job| filter.matches(job)).collect())
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), RestError> {
        self.client.delete_job(job_id).await
    }

    pub async fn kill_job(&self, job_id: &str) -> Result<(), RestError> {
        self.client.kill_job(job_id).await
    }

    pub async fn results_email(&self, job_id: &str, email: &str) -> Result<(), RestError> {
        self.client.job_email(job_id, email).await
    }
}

impl MetadataListFilter {
    pub fn matches(&self, job: &Value) -> bool {
        if let Some(email) = &self.email {
            let submitter = job
                .get("input")
                .and_then(|input| input.get("email"))
                .map(render)
                .unwrap_or_default();
            if &submitter != email {
                return false;
            }
        }
        if let Some(cutoff) = self.cutoff_job_id {
            let id = job.get("job_id").and_then(Value::as_u64).unwrap_or(0);
            if id < cutoff {
                return false;
            }
        }
        if let Some(comment) = &self.comment {
            let job_comment = job
                .get("input")
                .and_then(|input| input.get("comment"))
                .map(render)
                .unwrap_or_default();
            if !job_comment.contains(comment.as_str()) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn job(id: u64, email: &str, comment: &str) -> Value {
        json!({
            "job_id": id,
            "status": "complete",
            "input": {"email": email, "comment": comment}
        })
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = MetadataListFilter::default();
        assert!(filter.matches(&job(1, "a@ebi.ac.uk", "handover")));
    }

    #[test]
    fn filters_compose() {
        let filter = MetadataListFilter {
            email: Some("a@ebi.ac.uk".to_string()),
            cutoff_job_id: Some(10),
            comment: Some("handover".to_string()),
        };
        assert!(filter.matches(&job(11, "a@ebi.ac.uk", "pre-handover load")));
        assert!(!filter.matches(&job(9, "a@ebi.ac.uk", "pre-handover load")));
        assert!(!filter.matches(&job(11, "b@ebi.ac.uk", "pre-handover load")));
        assert!(!filter.matches(&job(11, "a@ebi.ac.uk", "release load")));
    }
}
