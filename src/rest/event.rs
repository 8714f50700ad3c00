use anyhow::Result;
use serde_json::Value;

use crate::rest::client::{as_job_list, job_id, RestClient};
use crate::rest::RestError;

/// Client for the event service: submits arbitrary event documents and
/// inspects the processes they trigger.
pub struct EventClient {
    client: RestClient,
}

impl EventClient {
    pub fn new(uri: &str) -> Result<EventClient> {
        Ok(EventClient { client: RestClient::new(uri)? })
    }

    pub async fn submit_job(&self, event: &Value) -> Result<String, RestError> {
        let response = self.client.post_json(&self.client.endpoint("jobs"), event).await?;
        job_id(&response)
    }

    /// Jobs are scoped per handling process.
    pub async fn retrieve_job(&self, process: &str, job_id: &str) -> Result<Value, RestError> {
        let url = self.client.endpoint(&format!("jobs/{process}/{job_id}"));
        self.client.get_json(&url).await
    }

    pub async fn list_jobs(&self, process: &str) -> Result<Vec<Value>, RestError> {
        let url = self.client.endpoint(&format!("jobs/{process}"));
        let response = self.client.get_json(&url).await?;
        as_job_list(response)
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), RestError> {
        self.client.delete_job(job_id).await
    }

    /// Event types known to the service.
    pub async fn events(&self) -> Result<Value, RestError> {
        self.client.get_json(&self.client.endpoint("events")).await
    }

    /// Processes that can handle events.
    pub async fn processes(&self) -> Result<Value, RestError> {
        self.client.get_json(&self.client.endpoint("processes")).await
    }
}
