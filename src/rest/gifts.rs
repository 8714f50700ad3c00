use anyhow::Result;
use serde_json::{json, Value};

use crate::rest::client::{render, RestClient};
use crate::rest::RestError;

/// Client for the GIFTs cross-reference sync service.
pub struct GiftsClient {
    client: RestClient,
}

impl GiftsClient {
    pub fn new(uri: &str) -> Result<GiftsClient> {
        Ok(GiftsClient { client: RestClient::new(uri)? })
    }

    pub async fn submit_job(
        &self,
        ensembl_release: &str,
        environment: &str,
        email: &str,
        tag: Option<&str>,
    ) -> Result<String, RestError> {
        let payload = json!({
            "ensembl_release": ensembl_release,
            "environment": environment,
            "email": email,
            "tag": tag,
        });
        self.client.submit_job(&payload).await
    }

    pub async fn retrieve_job(&self, job_id: &str) -> Result<Value, RestError> {
        self.client.retrieve_job(job_id).await
    }

    pub async fn list_jobs(&self, tag: Option<&str>) -> Result<Vec<Value>, RestError> {
        let jobs = self.client.list_jobs().await?;
        let Some(tag) = tag else { return Ok(jobs) };
        Ok(jobs
            .into_iter()
            .filter(|job| {
                job.get("input")
                    .and_then(|input| input.get("tag"))
                    .map(render)
                    .is_some_and(|job_tag| job_tag == tag)
            })
            .collect())
    }
}
