use std::collections::BTreeMap;

use anyhow::Result;
use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::rest::client::{field, render, RestClient};
use crate::rest::RestError;

/// A handover submission: the database to hand over, who to contact, and why.
#[derive(Debug, Clone, Serialize)]
pub struct HandoverSpec {
    pub src_uri: String,
    pub contact: String,
    pub comment: String,
}

/// Client for the handover service.
pub struct HandoverClient {
    client: RestClient,
}

impl HandoverClient {
    pub fn new(uri: &str) -> Result<HandoverClient> {
        Ok(HandoverClient { client: RestClient::new(uri)? })
    }

    pub async fn submit_handover(&self, spec: &HandoverSpec) -> Result<String, RestError> {
        let response = self
            .client
            .post_json(&self.client.endpoint("handovers"), spec)
            .await?;
        match response.get("handover_token") {
            Some(token) => Ok(render(token)),
            None => Err(RestError::MissingField {
                field: "handover_token",
                response: response.to_string(),
            }),
        }
    }

    pub async fn list_handovers(&self) -> Result<Vec<Value>, RestError> {
        let response = self.client.get_json(&self.client.endpoint("handovers")).await?;
        match response {
            Value::Array(handovers) => Ok(handovers),
            other => Err(RestError::Decode(format!("expected a handover list, got: {other}"))),
        }
    }

    /// The service returns a list of progress records for one token, newest
    /// first.
    pub async fn retrieve_handover(&self, token: &str) -> Result<Vec<Value>, RestError> {
        let url = self.client.endpoint(&format!("handovers/{token}"));
        let response = self.client.get_json(&url).await?;
        match response {
            Value::Array(records) => Ok(records),
            single @ Value::Object(_) => Ok(vec![single]),
            other => Err(RestError::Decode(format!("expected handover records, got: {other}"))),
        }
    }

    pub async fn delete_handover(&self, token: &str) -> Result<(), RestError> {
        self.client.delete(&self.client.endpoint(&format!("handovers/{token}"))).await
    }

    pub fn print_handover(&self, handover: &Value) -> Result<(), RestError> {
        info!(
            "Handover {} ({}) by {} - {}",
            render(field(handover, "handover_token")?),
            render(field(handover, "src_uri")?),
            render(field(handover, "contact")?),
            render(field(handover, "message")?),
        );
        Ok(())
    }
}

/// Count handovers per contact and current message, for the summary action.
/// Ordered output so repeated runs log identically.
pub fn summarise(handovers: &[Value]) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut summary: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for handover in handovers {
        let contact = handover.get("contact").map(render).unwrap_or_default();
        let message = handover.get("message").map(render).unwrap_or_default();
        *summary.entry(contact).or_default().entry(message).or_default() += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn summary_counts_per_contact_and_message() {
        let handovers = vec![
            json!({"contact": "a@ebi.ac.uk", "message": "Metadata load complete"}),
            json!({"contact": "a@ebi.ac.uk", "message": "Metadata load complete"}),
            json!({"contact": "a@ebi.ac.uk", "message": "Datachecks failed"}),
            json!({"contact": "b@ebi.ac.uk", "message": "Metadata load complete"}),
        ];
        let summary = summarise(&handovers);
        assert_eq!(summary["a@ebi.ac.uk"]["Metadata load complete"], 2);
        assert_eq!(summary["a@ebi.ac.uk"]["Datachecks failed"], 1);
        assert_eq!(summary["b@ebi.ac.uk"]["Metadata load complete"], 1);
    }
}
