use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde_json::Value;

use crate::division::{Division, ReportStatus};

/// Genome change report: long division name -> status -> species -> details.
/// Only the keys are consumed, the detail objects are opaque.
pub type ChangeReport = HashMap<String, HashMap<String, HashMap<String, Value>>>;

pub fn load_report(path: &Path) -> Result<ChangeReport> {
    info!("Reading change report from {}", path.display());
    let json = fs::read_to_string(path)
        .with_context(|| format!("Can't read report file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Malformed report file {}", path.display()))
}

/// Collect the species names reported under any selected division for any of
/// the selected statuses. Divisions or statuses absent from the report
/// contribute nothing.
pub fn parse_species(
    report: &ChangeReport,
    divisions: &HashSet<Division>,
    statuses: &[ReportStatus],
) -> HashSet<String> {
    let mut species = HashSet::new();
    for division in divisions {
        let Some(by_status) = report.get(division.ensembl_name()) else {
            continue;
        };
        for status in statuses {
            if let Some(names) = by_status.get(&status.to_string()) {
                species.extend(names.keys().cloned());
            }
        }
    }
    species
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ChangeReport {
        serde_json::from_str(
            r#"{
                "EnsemblVertebrates": {
                    "new_genomes": {"homo_sapiens": {}, "mus_musculus": {}},
                    "updated_annotations": {"danio_rerio": {}}
                },
                "EnsemblPlants": {
                    "renamed_genomes": {"zea_mays": {}}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn species_from_selected_divisions_and_statuses() {
        let divisions = HashSet::from([Division::Vertebrates]);
        let species = parse_species(&report(), &divisions, &[ReportStatus::NewGenomes]);
        assert_eq!(
            species,
            HashSet::from(["homo_sapiens".to_string(), "mus_musculus".to_string()])
        );
    }

    #[test]
    fn all_statuses_by_default() {
        let divisions = HashSet::from([Division::Vertebrates, Division::Plants]);
        let species = parse_species(&report(), &divisions, &ReportStatus::ALL);
        assert_eq!(species.len(), 4);
        assert!(species.contains("danio_rerio"));
        assert!(species.contains("zea_mays"));
    }

    #[test]
    fn missing_division_or_status_is_empty_not_an_error() {
        let divisions = HashSet::from([Division::Bacteria]);
        let species = parse_species(&report(), &divisions, &ReportStatus::ALL);
        assert!(species.is_empty());

        let divisions = HashSet::from([Division::Plants]);
        let species = parse_species(&report(), &divisions, &[ReportStatus::NewGenomes]);
        assert!(species.is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        let divisions = HashSet::from([Division::Vertebrates, Division::Plants]);
        let first = parse_species(&report(), &divisions, &ReportStatus::ALL);
        let second = parse_species(&report(), &divisions, &ReportStatus::ALL);
        assert_eq!(first, second);
    }
}
