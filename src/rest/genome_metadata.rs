use anyhow::Result;
use serde_json::Value;

use crate::rest::client::RestClient;
use crate::rest::RestError;

/// Client for the new genome metadata service, which exposes datasets and
/// genomes keyed by UUID.
pub struct GenomeMetadataClient {
    client: RestClient,
}

impl GenomeMetadataClient {
    pub fn new(uri: &str) -> Result<GenomeMetadataClient> {
        Ok(GenomeMetadataClient { client: RestClient::new(uri)? })
    }

    pub async fn create_dataset(&self, payload: &Value) -> Result<Value, RestError> {
        self.client.post_json(&self.client.endpoint("datasets"), payload).await
    }

    pub async fn get_all_datasets(&self) -> Result<Value, RestError> {
        self.client.get_json(&self.client.endpoint("datasets")).await
    }

    pub async fn get_all_genomes(&self) -> Result<Value, RestError> {
        self.client.get_json(&self.client.endpoint("genomes")).await
    }

    pub async fn get_dataset_by_uuid(&self, uuid: &str) -> Result<Value, RestError> {
        self.client.get_json(&self.client.endpoint(&format!("datasets/{uuid}"))).await
    }

    pub async fn get_genome_by_uuid(&self, uuid: &str) -> Result<Value, RestError> {
        self.client.get_json(&self.client.endpoint(&format!("genomes/{uuid}"))).await
    }
}
