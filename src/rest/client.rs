use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;

use crate::rest::RestError;

/// One-shot HTTP JSON client shared by every service wrapper.
///
/// Most services follow the same convention: POST to `jobs` to submit,
/// GET `jobs` / `jobs/{id}` to list and retrieve, DELETE `jobs/{id}` to
/// remove. Wrappers with a different URL scheme build their own paths with
/// [`RestClient::endpoint`] and the raw verb helpers.
pub struct RestClient {
    http: reqwest::Client,
    base: String,
}

impl RestClient {
    pub fn new(uri: &str) -> Result<RestClient> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        let mut base = uri.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(RestClient { http, base })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Submit a payload to the conventional `jobs` endpoint and return the
    /// service-assigned job id.
    pub async fn submit_job<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, RestError> {
        let response = self.post_json(&self.endpoint("jobs"), payload).await?;
        job_id(&response)
    }

    pub async fn retrieve_job(&self, job_id: &str) -> Result<Value, RestError> {
        self.get_json(&self.endpoint(&format!("jobs/{job_id}"))).await
    }

    pub async fn list_jobs(&self) -> Result<Vec<Value>, RestError> {
        let response = self.get_json(&self.endpoint("jobs")).await?;
        as_job_list(response)
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<(), RestError> {
        debug!("DELETE {}", self.endpoint(&format!("jobs/{job_id}")));
        let response = self
            .http
            .delete(self.endpoint(&format!("jobs/{job_id}")))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn kill_job(&self, job_id: &str) -> Result<(), RestError> {
        let url = self.endpoint(&format!("jobs/{job_id}/kill"));
        debug!("PUT {url}");
        let response = self.http.put(url).send().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Ask the service to mail the results of a finished job.
    pub async fn job_email(&self, job_id: &str, email: &str) -> Result<(), RestError> {
        let url = self.endpoint(&format!("jobs/{job_id}/email"));
        let payload = serde_json::json!({ "email": email });
        self.post_json(&url, &payload).await?;
        Ok(())
    }

    pub async fn get_json(&self, url: &str) -> Result<Value, RestError> {
        debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<Value, RestError> {
        debug!("POST {url}");
        let response = self.http.post(url).json(payload).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, url: &str) -> Result<(), RestError> {
        debug!("DELETE {url}");
        let response = self.http.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RestError::Status { status, body })
}

/// Pull the job id out of a submission response.
pub fn job_id(response: &Value) -> Result<String, RestError> {
    match response.get("job_id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(id) => Ok(id.to_string()),
        None => Err(RestError::MissingField { field: "job_id", response: response.to_string() }),
    }
}

/// A job listing is either a bare array or wrapped in a `jobs` field.
pub fn as_job_list(response: Value) -> Result<Vec<Value>, RestError> {
    match response {
        Value::Array(jobs) => Ok(jobs),
        Value::Object(mut object) => match object.remove("jobs") {
            Some(Value::Array(jobs)) => Ok(jobs),
            _ => Err(RestError::MissingField {
                field: "jobs",
                response: Value::Object(object).to_string(),
            }),
        },
        other => Err(RestError::Decode(format!("expected a job list, got: {other}"))),
    }
}

/// Fetch a required string field from a job record.
pub fn field<'a>(job: &'a Value, name: &'static str) -> Result<&'a Value, RestError> {
    job.get(name)
        .ok_or_else(|| RestError::MissingField { field: name, response: job.to_string() })
}

/// Render one job record the way the original clients logged them.
pub fn print_job(job: &Value, print_results: bool, print_input: bool) -> Result<(), RestError> {
    let id = field(job, "job_id")?;
    let status = field(job, "status")?;
    info!("Job {} - status: {}", render(id), render(status));
    if print_input {
        if let Some(input) = job.get("input") {
            info!("Input: {input}");
        }
    }
    if print_results {
        if let Some(output) = job.get("output") {
            info!("Output: {output}");
        }
    }
    Ok(())
}

/// Strings without the surrounding JSON quotes, everything else verbatim.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn job_id_from_string_or_number() {
        assert_eq!(job_id(&json!({"job_id": "42"})).unwrap(), "42");
        assert_eq!(job_id(&json!({"job_id": 42})).unwrap(), "42");
        assert!(matches!(
            job_id(&json!({"id": 42})),
            Err(RestError::MissingField { field: "job_id", .. })
        ));
    }

    #[test]
    fn job_list_shapes() {
        assert_eq!(as_job_list(json!([{"job_id": 1}])).unwrap().len(), 1);
        assert_eq!(as_job_list(json!({"jobs": [{"job_id": 1}, {"job_id": 2}]})).unwrap().len(), 2);
        assert!(as_job_list(json!({"results": []})).is_err());
        assert!(as_job_list(json!("nope")).is_err());
    }
}
