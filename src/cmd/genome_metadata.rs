use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use log::info;
use serde_json::{json, Value};

use crate::rest::genome_metadata::GenomeMetadataClient;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum GenomeMetadataAction {
    Submit,
    Retrieve,
    List,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum GenomeMetadataTable {
    Datasets,
    Genomes,
}

/// Interact with the genome metadata service's datasets and genomes.
#[derive(Args, Debug)]
pub struct GenomeMetadataArgs {
    /// Base URI of the genome metadata service
    #[arg(short = 'u', long)]
    uri: String,

    /// Action to take. Submit applies to datasets only
    #[arg(short = 'a', long)]
    action: GenomeMetadataAction,

    /// Table to operate on
    #[arg(short = 't', long)]
    table: GenomeMetadataTable,

    /// UUID of genome to retrieve or attach a dataset to
    #[arg(long)]
    guuid: Option<String>,

    /// UUID of dataset to retrieve
    #[arg(long)]
    duuid: Option<String>,

    /// User registered with this service
    #[arg(long)]
    user: Option<String>,

    /// Dataset name
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Description of dataset
    #[arg(short = 'd', long)]
    description: Option<String>,

    /// Dataset label
    #[arg(short = 'l', long)]
    label: Option<String>,

    /// Dataset type name
    #[arg(long = "type")]
    dataset_type: Option<String>,

    /// Dataset source name
    #[arg(short = 's', long)]
    source: Option<String>,

    /// Dataset attribute as "name value"; repeatable
    #[arg(long = "dataset-attribute", num_args = 2, value_names = ["NAME", "VALUE"], action = clap::ArgAction::Append)]
    dataset_attributes: Vec<String>,

    /// Alternate method with direct submission of a JSON payload. Only for submit
    #[arg(short = 'p', long)]
    payload: Option<String>,
}

pub async fn run(args: &GenomeMetadataArgs) -> Result<()> {
    let client = GenomeMetadataClient::new(&args.uri)?;
    match args.action {
        GenomeMetadataAction::Submit => {
            if args.table != GenomeMetadataTable::Datasets {
                bail!("Only datasets can be submitted");
            }
            let payload = match &args.payload {
                Some(payload) => {
                    serde_json::from_str(payload).context("Payload is not valid JSON")?
                }
                None => dataset_payload(args)?,
            };
            let created = client.create_dataset(&payload).await?;
            info!("Created dataset: {created}");
            Ok(())
        }
        GenomeMetadataAction::List => {
            let listing = match args.table {
                GenomeMetadataTable::Datasets => client.get_all_datasets().await?,
                GenomeMetadataTable::Genomes => client.get_all_genomes().await?,
            };
            info!("{listing}");
            Ok(())
        }
        GenomeMetadataAction::Retrieve => {
            let record = match args.table {
                GenomeMetadataTable::Datasets => {
                    let uuid =
                        args.duuid.as_ref().context("--duuid is required to retrieve a dataset")?;
                    client.get_dataset_by_uuid(uuid).await?
                }
                GenomeMetadataTable::Genomes => {
                    let uuid =
                        args.guuid.as_ref().context("--guuid is required to retrieve a genome")?;
                    client.get_genome_by_uuid(uuid).await?
                }
            };
            info!("{record}");
            Ok(())
        }
    }
}

fn dataset_payload(args: &GenomeMetadataArgs) -> Result<Value> {
    let guuid = args.guuid.as_ref().context("--guuid is required for dataset submission")?;
    let user = args.user.as_ref().context("--user is required for dataset submission")?;
    let name = args.name.as_ref().context("--name is required for dataset submission")?;
    let description =
        args.description.as_ref().context("--description is required for dataset submission")?;
    let label = args.label.as_ref().context("--label is required for dataset submission")?;
    let dataset_type =
        args.dataset_type.as_ref().context("--type is required for dataset submission")?;
    let source = args.source.as_ref().context("--source is required for dataset submission")?;

    Ok(json!({
        "user": user,
        "name": name,
        "description": description,
        "label": label,
        "dataset_type": dataset_type,
        "dataset_source": source,
        "genome_uuid": guuid,
        "dataset_attribute": dataset_attributes(&args.dataset_attributes),
    }))
}

/// Attribute pairs with a numeric name refer to a registered attribute id.
fn dataset_attributes(pairs: &[String]) -> Vec<Value> {
    pairs
        .chunks_exact(2)
        .map(|pair| match pair[0].parse::<u64>() {
            Ok(id) => json!({"attribute_id": id, "value": pair[1]}),
            Err(_) => json!({"name": pair[0], "value": pair[1]}),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_attribute_names_become_ids() {
        let attrs = dataset_attributes(&[
            "42".to_string(),
            "high".to_string(),
            "assembly_level".to_string(),
            "chromosome".to_string(),
        ]);
        assert_eq!(attrs[0], json!({"attribute_id": 42, "value": "high"}));
        assert_eq!(attrs[1], json!({"name": "assembly_level", "value": "chromosome"}));
    }
}
