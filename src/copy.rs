//! Copy job construction: per-database jobs built from a resolved database
//! set, and payload-size-based chunking for multi-database jobs.

use std::collections::HashSet;

use anyhow::Result;
use serde::Serialize;

use crate::config::{resolve_server, ServerMap};
use crate::division::Division;
use crate::metadata_db::Database;

/// Character budget for the comma-joined database list of one chunked job.
/// Approximates the copy service's request payload limit.
pub const PAYLOAD_LIMIT: usize = 2000;

/// A URI-based copy request, one per database. Value semantics: duplicate
/// jobs for the same database pair collapse in a `HashSet` before submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CopyJob {
    pub source_db_uri: String,
    pub target_db_uri: String,
    pub only_tables: Option<String>,
    pub skip_tables: Option<String>,
    pub update: Option<String>,
    pub drop: Option<String>,
    pub convert_innodb: bool,
    pub skip_optimize: bool,
    pub email: String,
}

/// A host-based copy request for the newer copy service API. Carries a
/// comma-separated database include list rather than full URIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HostCopyJob {
    pub src_host: String,
    pub src_incl_db: Option<String>,
    pub src_skip_db: Option<String>,
    pub src_incl_tables: Option<String>,
    pub src_skip_tables: Option<String>,
    pub tgt_host: String,
    pub tgt_db_name: Option<String>,
    pub skip_optimize: bool,
    pub wipe_target: bool,
    pub convert_innodb: bool,
    pub email_list: String,
    pub user: String,
}

/// Flags shared by every job built from one report run.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub convert_innodb: bool,
    pub skip_optimize: bool,
    pub email: String,
}

/// Build one `CopyJob` per resolved database, resolving the logical source
/// and target server names per division.
pub fn make_jobs(
    databases: &HashSet<Database>,
    servers: &ServerMap,
    source_server: &str,
    target_server: &str,
    options: &CopyOptions,
) -> Result<HashSet<CopyJob>> {
    let mut jobs = HashSet::new();
    for database in databases {
        let division = Division::from_ensembl_name(&database.division)?;
        let src = resolve_server(servers, division, source_server);
        let tgt = resolve_server(servers, division, target_server);
        jobs.insert(CopyJob {
            source_db_uri: join_uri(&src, &database.name),
            target_db_uri: join_uri(&tgt, &database.name),
            only_tables: None,
            skip_tables: None,
            update: None,
            drop: None,
            convert_innodb: options.convert_innodb,
            skip_optimize: options.skip_optimize,
            email: options.email.clone(),
        });
    }
    Ok(jobs)
}

fn join_uri(server: &str, dbname: &str) -> String {
    format!("{}/{}", server.trim_end_matches('/'), dbname)
}

/// Greedily pack database names into chunks whose cumulative character
/// length stays under `limit`, preserving input order.
///
/// The length check runs against the chunk contents *before* the candidate
/// name is added, so an empty chunk accepts any name: a single name longer
/// than the limit still lands in its own chunk, it is never dropped.
pub fn chunk_databases(names: &[String], limit: usize) -> Vec<Vec<String>> {
    let mut chunks: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;
    for name in names {
        if current_len + name.len() > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current_len += name.len();
        current.push(name.clone());
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn chunks_preserve_order_and_every_name() {
        let input = names(&["aaaa", "bbbb", "cccc", "dddd", "eeee"]);
        let chunks = chunk_databases(&input, 10);
        let rejoined: Vec<String> = chunks.iter().flatten().cloned().collect();
        assert_eq!(rejoined, input);
    }

    #[test]
    fn chunk_length_stays_under_limit() {
        let input = names(&["aaaa", "bbbb", "cccc", "dddd", "eeee"]);
        for chunk in chunk_databases(&input, 10) {
            assert!(!chunk.is_empty());
            // excluding the element that triggered overflow, i.e. all chunks
            // here are fully under the limit
            let len: usize = chunk.iter().map(String::len).sum();
            assert!(len <= 10, "chunk too long: {chunk:?}");
        }
    }

    #[test]
    fn oversized_name_is_not_dropped() {
        let long = "x".repeat(50);
        let input = vec!["aaaa".to_string(), long.clone(), "bbbb".to_string()];
        let chunks = chunk_databases(&input, 10);
        assert_eq!(chunks, vec![vec!["aaaa".to_string()], vec![long], vec!["bbbb".to_string()]]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_databases(&[], 10).is_empty());
    }

    #[test]
    fn jobs_are_deduplicated_by_value() {
        let servers: ServerMap = serde_json::from_str(
            r#"{"vertebrates": {"sta-a": "mysql://src:3306", "sta-b": "mysql://tgt:3306"}}"#,
        )
        .unwrap();
        let mut databases = HashSet::new();
        databases.insert(Database {
            name: "homo_sapiens_core_110_38".to_string(),
            division: "EnsemblVertebrates".to_string(),
        });
        // a second identical value collapses in the set already
        databases.insert(Database {
            name: "homo_sapiens_core_110_38".to_string(),
            division: "EnsemblVertebrates".to_string(),
        });

        let options = CopyOptions {
            convert_innodb: false,
            skip_optimize: false,
            email: "someone@ebi.ac.uk".to_string(),
        };
        let jobs = make_jobs(&databases, &servers, "sta-a", "sta-b", &options).unwrap();
        assert_eq!(jobs.len(), 1);
        let job = jobs.iter().next().unwrap();
        assert_eq!(job.source_db_uri, "mysql://src:3306/homo_sapiens_core_110_38");
        assert_eq!(job.target_db_uri, "mysql://tgt:3306/homo_sapiens_core_110_38");
    }

    #[test]
    fn report_to_job_pipeline() {
        use crate::division::{select, Division, ReportStatus};
        use crate::report::{parse_species, ChangeReport};

        let report: ChangeReport = serde_json::from_str(
            r#"{"EnsemblVertebrates": {"new_genomes": {"homo_sapiens": {}}}}"#,
        )
        .unwrap();
        let divisions = select(Division::ALL, &[Division::Vertebrates], &[]);
        let species = parse_species(&report, &divisions, &ReportStatus::ALL);
        assert_eq!(species, HashSet::from(["homo_sapiens".to_string()]));

        // metadata resolution stubbed with the row the query would return
        let databases = HashSet::from([Database {
            name: "homo_sapiens_core_110_38".to_string(),
            division: "EnsemblVertebrates".to_string(),
        }]);
        let servers: ServerMap = serde_json::from_str(
            r#"{"vertebrates": {"sta-a": "mysql://src:3306", "sta-b": "mysql://tgt:3306"}}"#,
        )
        .unwrap();
        let options = CopyOptions {
            convert_innodb: false,
            skip_optimize: false,
            email: "someone@ebi.ac.uk".to_string(),
        };
        let jobs = make_jobs(&databases, &servers, "sta-a", "sta-b", &options).unwrap();
        assert_eq!(jobs.len(), 1);
        let job = jobs.iter().next().unwrap();
        assert_eq!(job.source_db_uri, "mysql://src:3306/homo_sapiens_core_110_38");
        assert_eq!(job.target_db_uri, "mysql://tgt:3306/homo_sapiens_core_110_38");
    }

    #[test]
    fn unknown_division_is_an_error() {
        let servers: ServerMap = HashMap::new();
        let mut databases = HashSet::new();
        databases.insert(Database {
            name: "mystery_db".to_string(),
            division: "EnsemblMartians".to_string(),
        });
        let options = CopyOptions {
            convert_innodb: false,
            skip_optimize: false,
            email: "someone@ebi.ac.uk".to_string(),
        };
        assert!(make_jobs(&databases, &servers, "sta-a", "sta-b", &options).is_err());
    }
}
