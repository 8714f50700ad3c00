//! Read-only resolution of species and divisions to physical database names
//! against the `ensembl_metadata` MySQL schema.

use std::collections::HashSet;

use anyhow::{Context, Result};
use log::info;
use sqlx::mysql::MySqlPool;
use sqlx::{MySql, QueryBuilder, Row};

use crate::division::{DbType, Division};

/// A physical schema eligible for copying, identified by database name and
/// the long-form division name it belongs to. Deduplicated by value: the same
/// database reached through both the species and the division query must
/// yield a single copy job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Database {
    pub name: String,
    pub division: String,
}

pub async fn connect(metadata_url: &str) -> Result<MySqlPool> {
    info!("Connecting to metadata database");
    MySqlPool::connect(metadata_url)
        .await
        .context("Can't connect to metadata database")
}

/// Union of the species-scoped and division-scoped lookups. Both queries use
/// bound parameters throughout; an empty species, division, or db type set
/// short-circuits to an empty contribution instead of issuing invalid SQL.
pub async fn get_databases(
    pool: &MySqlPool,
    ens_version: u32,
    species: &HashSet<String>,
    divisions: &HashSet<Division>,
    dbtypes: &HashSet<DbType>,
) -> Result<HashSet<Database>> {
    let mut databases: HashSet<Database> = HashSet::new();
    databases.extend(species_databases(pool, ens_version, species, dbtypes).await?);
    databases.extend(division_databases(pool, ens_version, divisions, dbtypes).await?);
    info!("Resolved {} database(s) for release {}", databases.len(), ens_version);
    Ok(databases)
}

/// Databases attached to a genome of one of the given species.
async fn species_databases(
    pool: &MySqlPool,
    ens_version: u32,
    species: &HashSet<String>,
    dbtypes: &HashSet<DbType>,
) -> Result<Vec<Database>> {
    if species.is_empty() || dbtypes.is_empty() {
        return Ok(Vec::new());
    }
    let mut query: QueryBuilder<MySql> = QueryBuilder::new(
        "SELECT gd.dbname, d.name \
         FROM genome g \
         JOIN organism o ON g.organism_id = o.organism_id \
         JOIN data_release dr ON g.data_release_id = dr.data_release_id \
         JOIN genome_database gd ON g.genome_id = gd.genome_id \
         JOIN division d ON g.division_id = d.division_id \
         WHERE dr.ensembl_version = ",
    );
    query.push_bind(ens_version);
    push_in_list(&mut query, " AND gd.type IN (", dbtypes.iter().map(DbType::to_string));
    push_in_list(&mut query, " AND o.name IN (", species.iter().cloned());

    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .context("Species database query failed")?;
    rows.iter().map(database_from_row).collect()
}

/// Shared and pan-division databases registered against the release itself
/// rather than a single organism.
async fn division_databases(
    pool: &MySqlPool,
    ens_version: u32,
    divisions: &HashSet<Division>,
    dbtypes: &HashSet<DbType>,
) -> Result<Vec<Database>> {
    if divisions.is_empty() || dbtypes.is_empty() {
        return Ok(Vec::new());
    }
    let mut query: QueryBuilder<MySql> = QueryBuilder::new(
        "SELECT drd.dbname, d.name \
         FROM data_release_database drd \
         JOIN division d ON drd.division_id = d.division_id \
         JOIN data_release dr ON drd.data_release_id = dr.data_release_id \
         WHERE dr.ensembl_version = ",
    );
    query.push_bind(ens_version);
    push_in_list(&mut query, " AND drd.type IN (", dbtypes.iter().map(DbType::to_string));
    push_in_list(
        &mut query,
        " AND d.name IN (",
        divisions.iter().map(|d| d.ensembl_name().to_string()),
    );

    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .context("Division database query failed")?;
    rows.iter().map(database_from_row).collect()
}

/// Core databases of the given species in one division, ordered by name.
/// Used by the vertannot staging copy, which chunks the ordered list.
pub async fn core_databases(
    pool: &MySqlPool,
    ens_version: u32,
    division: Division,
    species: &[String],
) -> Result<Vec<String>> {
    if species.is_empty() {
        return Ok(Vec::new());
    }
    let mut query: QueryBuilder<MySql> = QueryBuilder::new(
        "SELECT gd.dbname \
         FROM genome g \
         JOIN organism o ON g.organism_id = o.organism_id \
         JOIN data_release dr ON g.data_release_id = dr.data_release_id \
         JOIN genome_database gd ON g.genome_id = gd.genome_id \
         JOIN division d ON g.division_id = d.division_id \
         WHERE dr.ensembl_version = ",
    );
    query.push_bind(ens_version);
    query.push(" AND d.name = ");
    query.push_bind(division.ensembl_name());
    query.push(" AND gd.type = 'core'");
    push_in_list(&mut query, " AND o.name IN (", species.iter().cloned());
    query.push(" ORDER BY gd.dbname");

    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .context("Core database query failed")?;
    rows.iter()
        .map(|row| row.try_get::<String, _>(0).context("Missing dbname column"))
        .collect()
}

fn push_in_list(
    query: &mut QueryBuilder<MySql>,
    prefix: &str,
    values: impl Iterator<Item = String>,
) {
    query.push(prefix);
    let mut separated = query.separated(", ");
    for value in values {
        separated.push_bind(value);
    }
    query.push(")");
}

fn database_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Database> {
    Ok(Database {
        name: row.try_get(0).context("Missing dbname column")?,
        division: row.try_get(1).context("Missing division name column")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(name: &str, division: &str) -> Database {
        Database { name: name.to_string(), division: division.to_string() }
    }

    #[test]
    fn union_deduplicates_across_queries() {
        // Simulates the same pair coming back from both SQL queries.
        let species_rows = vec![
            db("homo_sapiens_core_110_38", "EnsemblVertebrates"),
            db("ensembl_ontology_110", "EnsemblVertebrates"),
        ];
        let division_rows = vec![db("ensembl_ontology_110", "EnsemblVertebrates")];

        let mut databases: HashSet<Database> = HashSet::new();
        databases.extend(species_rows);
        databases.extend(division_rows);
        assert_eq!(databases.len(), 2);
    }
}
