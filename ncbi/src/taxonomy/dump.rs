//! Readers for the `*.dmp` files of an NCBI taxdump
//!
//! Every line holds `\t|\t` separated fields and ends with `\t|`. Splitting on `|` and trimming
//! is enough since none of the fields we read can contain a pipe.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use utils::open_read;

use crate::Rank;

const SCIENTIFIC_NAME: &str = "scientific name";

/// The parsed content of `names.dmp`
#[derive(Debug, Default)]
pub struct NameDump {
    pub scientific: HashMap<u32, String>,
    pub synonyms: Vec<(u32, String)>,
}

/// A single row of `nodes.dmp`
#[derive(Debug)]
pub struct NodeRow {
    pub taxid: u32,
    pub parent: u32,
    pub rank: Rank,
}

pub fn read_names(pb: &Path) -> Result<NameDump> {
    let reader = open_read(pb).context("Unable to open names dump file")?;
    let mut dump = NameDump::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line.context("Error reading line from names dump file")?;
        if line.trim().is_empty() {
            continue;
        }

        let row = split_row(&line, 4)
            .with_context(|| format!("Malformed line {} in {}", i + 1, pb.display()))?;
        let taxid = parse_id(row[0])?;
        let name = row[1].to_string();

        if row[3] == SCIENTIFIC_NAME {
            dump.scientific.insert(taxid, name);
        } else {
            dump.synonyms.push((taxid, name));
        }
    }

    Ok(dump)
}

pub fn read_nodes(pb: &Path) -> Result<Vec<NodeRow>> {
    let reader = open_read(pb).context("Unable to open nodes dump file")?;
    let mut rows = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.context("Error reading line from nodes dump file")?;
        if line.trim().is_empty() {
            continue;
        }

        let row = split_row(&line, 3)
            .with_context(|| format!("Malformed line {} in {}", i + 1, pb.display()))?;

        rows.push(NodeRow {
            taxid: parse_id(row[0])?,
            parent: parse_id(row[1])?,
            rank: Rank::from_str(row[2])
                .with_context(|| format!("Unable to parse Taxon Rank {}", row[2]))?,
        });
    }

    Ok(rows)
}

/// Read `merged.dmp` into an old taxid -> new taxid map
pub fn read_merged(pb: &Path) -> Result<HashMap<u32, u32>> {
    let reader = open_read(pb).context("Unable to open merged dump file")?;
    let mut merged = HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.context("Error reading line from merged dump file")?;
        if line.trim().is_empty() {
            continue;
        }

        let row = split_row(&line, 2)
            .with_context(|| format!("Malformed line {} in {}", i + 1, pb.display()))?;
        merged.insert(parse_id(row[0])?, parse_id(row[1])?);
    }

    Ok(merged)
}

fn split_row(line: &str, min_fields: usize) -> Result<Vec<&str>> {
    let row: Vec<&str> = line.split('|').map(str::trim).collect();
    if row.len() < min_fields {
        anyhow::bail!("Expected at least {} fields, found {}", min_fields, row.len());
    }
    Ok(row)
}

fn parse_id(v: &str) -> Result<u32> {
    v.trim()
        .parse::<u32>()
        .with_context(|| format!("Unable to parse {} as a taxid", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_names_splits_classes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.dmp");
        std::fs::write(
            &path,
            "9606\t|\tHomo sapiens\t|\t\t|\tscientific name\t|\n\
             9606\t|\thuman\t|\t\t|\tgenbank common name\t|\n",
        )
        .unwrap();

        let dump = read_names(&path).unwrap();

        assert_eq!(dump.scientific[&9606], "Homo sapiens");
        assert_eq!(dump.synonyms, vec![(9606, "human".to_string())]);
    }

    #[test]
    fn test_read_nodes_rejects_unknown_rank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.dmp");
        std::fs::write(&path, "9606\t|\t9605\t|\thyperspecies\t|\n").unwrap();

        let err = read_nodes(&path).unwrap_err();

        assert!(format!("{:#}", err).contains("hyperspecies"));
    }

    #[test]
    fn test_read_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.dmp");
        std::fs::write(&path, "12\t|\t74109\t|\n30\t|\t29\t|\n").unwrap();

        let merged = read_merged(&path).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[&12], 74109);
    }

    #[test]
    fn test_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.dmp");
        std::fs::write(&path, "12\n").unwrap();

        let err = read_merged(&path).unwrap_err();

        assert!(err.to_string().contains("Malformed line 1"));
    }
}
