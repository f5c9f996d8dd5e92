use std::fmt::Write;

use tempfile::TempDir;

use super::{MERGED_DUMP, NAMES_DUMP, NODES_DUMP, TaxonomyStore};

/// (taxid, parent, rank, scientific name)
const NODES: &[(u32, u32, &str, &str)] = &[
    (1, 1, "no rank", "root"),
    (131567, 1, "cellular root", "cellular organisms"),
    (2759, 131567, "domain", "Eukaryota"),
    (33208, 2759, "kingdom", "Metazoa"),
    (7711, 33208, "phylum", "Chordata"),
    (40674, 7711, "class", "Mammalia"),
    (9443, 40674, "order", "Primates"),
    (9604, 9443, "family", "Hominidae"),
    (9605, 9604, "genus", "Homo"),
    (9606, 9605, "species", "Homo sapiens"),
    (63221, 9606, "subspecies", "Homo sapiens neanderthalensis"),
    (741158, 9606, "subspecies", "Homo sapiens subsp. 'Denisova'"),
    (9596, 9604, "genus", "Pan"),
    (9598, 9596, "species", "Pan troglodytes"),
    (9989, 40674, "order", "Rodentia"),
    (10088, 9989, "genus", "Mus"),
    (10090, 10088, "species", "Mus musculus"),
    (2, 131567, "domain", "Bacteria"),
    (562, 2, "species", "Escherichia coli"),
];

const SYNONYMS: &[(u32, &str, &str)] = &[
    (9606, "human", "genbank common name"),
    (9606, "man", "common name"),
    (9598, "chimpanzee", "genbank common name"),
    (10090, "house mouse", "genbank common name"),
    (562, "Bacillus coli", "synonym"),
];

const MERGED: &[(u32, u32)] = &[(4444, 9598)];

/// Write a small taxdump into a temporary directory
pub fn sample_dump() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut nodes = String::new();
    let mut names = String::new();
    let mut merged = String::new();

    for (taxid, parent, rank, name) in NODES {
        writeln!(nodes, "{}\t|\t{}\t|\t{}\t|\t\t|\t8\t|", taxid, parent, rank).unwrap();
        writeln!(names, "{}\t|\t{}\t|\t\t|\tscientific name\t|", taxid, name).unwrap();
    }
    for (taxid, name, class) in SYNONYMS {
        writeln!(names, "{}\t|\t{}\t|\t\t|\t{}\t|", taxid, name, class).unwrap();
    }
    for (old, new) in MERGED {
        writeln!(merged, "{}\t|\t{}\t|", old, new).unwrap();
    }

    std::fs::write(dir.path().join(NODES_DUMP), nodes).unwrap();
    std::fs::write(dir.path().join(NAMES_DUMP), names).unwrap();
    std::fs::write(dir.path().join(MERGED_DUMP), merged).unwrap();
    dir
}

pub fn sample_store() -> (TempDir, TaxonomyStore) {
    let dir = sample_dump();
    let store = TaxonomyStore::from_dir(dir.path()).unwrap();
    (dir, store)
}
