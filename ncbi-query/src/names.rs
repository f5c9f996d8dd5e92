use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use ncbi::TaxonomyStore;
use utils::read_list;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchScore {
    Exact,
    Fuzzy(f64),
    NotFound,
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchScore::Exact => write!(f, "Exact:1.0"),
            MatchScore::Fuzzy(score) => write!(f, "Fuzzy:{:.2}", score),
            MatchScore::NotFound => write!(f, "NotFound:0.0"),
        }
    }
}

/// One row of the name translation table
#[derive(Debug, Clone, PartialEq)]
pub struct NameTranslation {
    pub query: String,
    pub real_name: String,
    pub taxids: Vec<u32>,
    pub score: MatchScore,
}

impl fmt::Display for NameTranslation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let taxids = if self.taxids.is_empty() {
            "???".to_string()
        } else {
            self.taxids
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };

        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.score,
            self.query,
            capitalize(&self.real_name),
            taxids
        )
    }
}

/// Gather names from the names file (one per line) and from the command line, where the
/// words are joined back together and split on commas
pub fn collect_names(cli_names: &[String], names_file: Option<&Path>) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();

    if let Some(pb) = names_file {
        names.extend(read_list(pb).context("Unable to read names file")?);
    }

    names.extend(
        cli_names
            .join(" ")
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from),
    );

    Ok(names)
}

pub fn translate_names(
    store: &TaxonomyStore,
    names: &BTreeSet<String>,
    fuzzy: Option<f64>,
) -> Vec<NameTranslation> {
    let translator = store.get_name_translator(names);
    let unknown = names.len() - translator.len();
    info!("Translated {} of {} names", translator.len(), names.len());

    if fuzzy.is_some() && unknown > 0 {
        info!("{} unknown names, trying fuzzy search", unknown);
    }

    names
        .iter()
        .map(|name| {
            if let Some(taxids) = translator.get(name) {
                return NameTranslation {
                    query: name.clone(),
                    real_name: name.clone(),
                    taxids: taxids.clone(),
                    score: MatchScore::Exact,
                };
            }

            if let Some(found) = fuzzy.and_then(|sim| store.get_fuzzy_name_translation(name, sim)) {
                return NameTranslation {
                    query: name.clone(),
                    real_name: found.name,
                    taxids: vec![found.taxid],
                    score: MatchScore::Fuzzy(found.score),
                };
            }

            warn!("{} NOT FOUND", name);
            NameTranslation {
                query: name.clone(),
                real_name: name.clone(),
                taxids: Vec::new(),
                score: MatchScore::NotFound,
            }
        })
        .collect()
}

/// Upper-case the first character and lower-case the rest
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
