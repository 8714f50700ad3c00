use anyhow::Result;
use log::info;
use serde_json::Value;

use crate::copy::CopyJob;
use crate::rest::client::{field, print_job, render, RestClient};
use crate::rest::RestError;

/// Client for the URI-based database copy service, used both directly and by
/// the report-driven submission.
pub struct DbCopyClient {
    client: RestClient,
}

impl DbCopyClient {
    pub fn new(uri: &str) -> Result<DbCopyClient> {
        Ok(DbCopyClient { client: RestClient::new(uri)? })
    }

    pub async fn submit_job(&self, job: &CopyJob) -> Result<String, RestError> {
        self.client.submit_job(job).await
    }

    pub async fn retrieve_job(&self, job_id: &str) -> Result<Value, RestError> {
        self.client.retrieve_job(job_id).await
    }

    pub async fn list_jobs(&self) -> Result<Vec<Value>, RestError> {
        self.client.list_jobs().await
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), RestError> {
        self.client.delete_job(job_id).await
    }

    pub async fn kill_job(&self, job_id: &str) -> Result<(), RestError> {
        self.client.kill_job(job_id).await
    }

    pub async fn job_email(&self, job_id: &str, email: &str) -> Result<(), RestError> {
        self.client.job_email(job_id, email).await
    }

    pub fn print_job(
        &self,
        job: &Value,
        print_results: bool,
        print_input: bool,
    ) -> Result<(), RestError> {
        if let Some(input) = job.get("input") {
            if let (Ok(src), Ok(tgt)) =
                (field(input, "source_db_uri"), field(input, "target_db_uri"))
            {
                info!("Copy {} -> {}", render(src), render(tgt));
            }
        }
        print_job(job, print_results, print_input)
    }
}
