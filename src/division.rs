use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use anyhow::{anyhow, Result};
use clap::ValueEnum;

/// An Ensembl division, named by its short key on the command line.
///
/// Each division has exactly one long-form counterpart (`EnsemblVertebrates`
/// and friends) used by the change report and the metadata database, and a
/// server group key used by the staging server configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Division {
    Vertebrates,
    Protists,
    Fungi,
    Metazoa,
    Plants,
    Bacteria,
}

impl Division {
    pub const ALL: [Division; 6] = [
        Division::Vertebrates,
        Division::Protists,
        Division::Fungi,
        Division::Metazoa,
        Division::Plants,
        Division::Bacteria,
    ];

    /// Long-form name as stored in the metadata database and report files.
    pub fn ensembl_name(&self) -> &'static str {
        match self {
            Division::Vertebrates => "EnsemblVertebrates",
            Division::Protists => "EnsemblProtists",
            Division::Fungi => "EnsemblFungi",
            Division::Metazoa => "EnsemblMetazoa",
            Division::Plants => "EnsemblPlants",
            Division::Bacteria => "EnsemblBacteria",
        }
    }

    pub fn from_ensembl_name(name: &str) -> Result<Division> {
        Division::ALL
            .into_iter()
            .find(|d| d.ensembl_name() == name)
            .ok_or_else(|| anyhow!("Unknown Ensembl division: {name}"))
    }

    /// Key into the staging server map. Non-vertebrate eukaryotes share one
    /// set of servers.
    pub fn server_group(&self) -> &'static str {
        match self {
            Division::Vertebrates => "vertebrates",
            Division::Bacteria => "bacteria",
            _ => "nonvertebrates",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Division::Vertebrates => write!(f, "vertebrates"),
            Division::Protists => write!(f, "protists"),
            Division::Fungi => write!(f, "fungi"),
            Division::Metazoa => write!(f, "metazoa"),
            Division::Plants => write!(f, "plants"),
            Division::Bacteria => write!(f, "bacteria"),
        }
    }
}

/// Database types registered in the metadata schema.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum DbType {
    Core,
    Funcgen,
    Variation,
    Otherfeatures,
    Rnaseq,
    Cdna,
    Vega,
    Mart,
    Ontology,
    Ids,
    Other,
}

impl DbType {
    pub const ALL: [DbType; 11] = [
        DbType::Core,
        DbType::Funcgen,
        DbType::Variation,
        DbType::Otherfeatures,
        DbType::Rnaseq,
        DbType::Cdna,
        DbType::Vega,
        DbType::Mart,
        DbType::Ontology,
        DbType::Ids,
        DbType::Other,
    ];
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DbType::Core => write!(f, "core"),
            DbType::Funcgen => write!(f, "funcgen"),
            DbType::Variation => write!(f, "variation"),
            DbType::Otherfeatures => write!(f, "otherfeatures"),
            DbType::Rnaseq => write!(f, "rnaseq"),
            DbType::Cdna => write!(f, "cdna"),
            DbType::Vega => write!(f, "vega"),
            DbType::Mart => write!(f, "mart"),
            DbType::Ontology => write!(f, "ontology"),
            DbType::Ids => write!(f, "ids"),
            DbType::Other => write!(f, "other"),
        }
    }
}

/// Status categories reported by the genome change report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum ReportStatus {
    #[value(name = "new_genomes")]
    NewGenomes,
    #[value(name = "updated_assemblies")]
    UpdatedAssemblies,
    #[value(name = "renamed_genomes")]
    RenamedGenomes,
    #[value(name = "updated_annotations")]
    UpdatedAnnotations,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::NewGenomes,
        ReportStatus::UpdatedAssemblies,
        ReportStatus::RenamedGenomes,
        ReportStatus::UpdatedAnnotations,
    ];
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReportStatus::NewGenomes => write!(f, "new_genomes"),
            ReportStatus::UpdatedAssemblies => write!(f, "updated_assemblies"),
            ReportStatus::RenamedGenomes => write!(f, "renamed_genomes"),
            ReportStatus::UpdatedAnnotations => write!(f, "updated_annotations"),
        }
    }
}

/// Set arithmetic used for division and db type selection:
/// `(all ∩ include-if-given) − exclude-if-given`.
///
/// An empty include list means "everything". Exclusion is applied last, so a
/// key named in both lists is excluded. Inputs are already constrained to the
/// enumeration by clap, no validation happens here.
pub fn select<T>(all: impl IntoIterator<Item = T>, include: &[T], exclude: &[T]) -> HashSet<T>
where
    T: Copy + Eq + Hash,
{
    let mut selected: HashSet<T> = all.into_iter().collect();
    if !include.is_empty() {
        let include: HashSet<T> = include.iter().copied().collect();
        selected.retain(|item| include.contains(item));
    }
    for item in exclude {
        selected.remove(item);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_names_roundtrip() {
        for division in Division::ALL {
            let long = division.ensembl_name();
            assert_eq!(Division::from_ensembl_name(long).unwrap(), division);
        }
        assert!(Division::from_ensembl_name("EnsemblMartians").is_err());
    }

    #[test]
    fn nonvertebrates_share_a_server_group() {
        assert_eq!(Division::Vertebrates.server_group(), "vertebrates");
        assert_eq!(Division::Bacteria.server_group(), "bacteria");
        for division in [Division::Protists, Division::Fungi, Division::Metazoa, Division::Plants] {
            assert_eq!(division.server_group(), "nonvertebrates");
        }
    }

    #[test]
    fn select_defaults_to_everything() {
        let selected = select(Division::ALL, &[], &[]);
        assert_eq!(selected, Division::ALL.into_iter().collect());
    }

    #[test]
    fn select_intersects_includes() {
        let selected = select(
            Division::ALL,
            &[Division::Plants, Division::Fungi],
            &[],
        );
        assert_eq!(selected, [Division::Plants, Division::Fungi].into_iter().collect());
    }

    #[test]
    fn select_subtracts_excludes() {
        let selected = select(DbType::ALL, &[], &[DbType::Mart, DbType::Vega]);
        assert!(!selected.contains(&DbType::Mart));
        assert!(!selected.contains(&DbType::Vega));
        assert_eq!(selected.len(), DbType::ALL.len() - 2);
    }

    #[test]
    fn exclude_wins_over_include() {
        let selected = select(
            Division::ALL,
            &[Division::Plants, Division::Bacteria],
            &[Division::Bacteria],
        );
        assert_eq!(selected, [Division::Plants].into_iter().collect());
    }
}
