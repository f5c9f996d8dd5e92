//! In-memory access to a local copy of the NCBI taxonomy

mod dump;
mod fuzzy;
mod topology;

#[cfg(test)]
pub(crate) mod fixtures;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Error, Result, bail};
use log::info;

use crate::{ROOT, Rank, Taxon};

pub use fuzzy::FuzzyMatch;

pub const NODES_DUMP: &str = "nodes.dmp";
pub const NAMES_DUMP: &str = "names.dmp";
pub const MERGED_DUMP: &str = "merged.dmp";

pub struct TaxonomyStore {
    taxa: HashMap<u32, Taxon>,
    /// Lowercased scientific name -> taxids carrying it
    scientific_index: HashMap<String, Vec<u32>>,
    /// Lowercased synonym -> taxids carrying it
    synonym_index: HashMap<String, Vec<u32>>,
    synonyms: Vec<(u32, String)>,
    merged: HashMap<u32, u32>,
}

impl TaxonomyStore {
    /// Load a taxdump directory. `merged.dmp` is optional.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let merged = dir.join(MERGED_DUMP);
        Self::from_dumps(
            &dir.join(NODES_DUMP),
            &dir.join(NAMES_DUMP),
            merged.exists().then_some(merged.as_path()),
        )
        .with_context(|| format!("Unable to load taxonomy from {}", dir.display()))
    }

    pub fn from_dumps(nodes_pb: &Path, names_pb: &Path, merged_pb: Option<&Path>) -> Result<Self> {
        let names = dump::read_names(names_pb).context("Failed to parse names dump")?;
        let nodes = dump::read_nodes(nodes_pb).context("Failed to parse nodes dump")?;
        let merged = match merged_pb {
            Some(pb) => dump::read_merged(pb).context("Failed to parse merged dump")?,
            None => HashMap::new(),
        };

        let mut scientific = names.scientific;
        let mut taxa = HashMap::with_capacity(nodes.len());
        let mut scientific_index: HashMap<String, Vec<u32>> = HashMap::new();

        for node in nodes {
            let name = scientific.remove(&node.taxid).ok_or_else(|| {
                Error::msg(format!("Taxon {} did not have a scientific name", node.taxid))
            })?;

            scientific_index
                .entry(name.to_lowercase())
                .or_default()
                .push(node.taxid);
            taxa.insert(node.taxid, Taxon::new(name, node.rank, node.parent));
        }

        let mut synonym_index: HashMap<String, Vec<u32>> = HashMap::new();
        for (taxid, name) in &names.synonyms {
            synonym_index
                .entry(name.to_lowercase())
                .or_default()
                .push(*taxid);
        }

        for ids in scientific_index.values_mut().chain(synonym_index.values_mut()) {
            ids.sort_unstable();
            ids.dedup();
        }

        info!(
            "Loaded {} taxa, {} synonyms and {} merged taxids",
            taxa.len(),
            names.synonyms.len(),
            merged.len()
        );

        Ok(TaxonomyStore {
            taxa,
            scientific_index,
            synonym_index,
            synonyms: names.synonyms,
            merged,
        })
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Follow the merged table for retired taxids
    pub fn resolve(&self, taxid: u32) -> u32 {
        self.merged.get(&taxid).copied().unwrap_or(taxid)
    }

    pub fn taxon(&self, taxid: u32) -> Option<&Taxon> {
        self.taxa.get(&self.resolve(taxid))
    }

    /// Replace merged taxids by their current id. Also returns which ids were replaced.
    pub fn translate_merged(
        &self,
        taxids: impl IntoIterator<Item = u32>,
    ) -> (BTreeSet<u32>, BTreeMap<u32, u32>) {
        let mut resolved = BTreeSet::new();
        let mut conversion = BTreeMap::new();

        for taxid in taxids {
            match self.merged.get(&taxid) {
                Some(&new) => {
                    conversion.insert(taxid, new);
                    resolved.insert(new);
                }
                None => {
                    resolved.insert(taxid);
                }
            }
        }

        (resolved, conversion)
    }

    /// Case-insensitive name to taxid translation.
    /// Synonyms are only consulted for names that match no scientific name; unknown names are
    /// left out of the result.
    pub fn get_name_translator<S: AsRef<str>>(
        &self,
        names: impl IntoIterator<Item = S>,
    ) -> BTreeMap<String, Vec<u32>> {
        let mut translator = BTreeMap::new();

        for name in names {
            let name = name.as_ref();
            let key = name.to_lowercase();
            let ids = self
                .scientific_index
                .get(&key)
                .or_else(|| self.synonym_index.get(&key));

            if let Some(ids) = ids {
                translator.insert(name.to_string(), ids.clone());
            }
        }

        translator
    }

    /// Taxid to scientific name translation, keyed by the requested taxid
    pub fn get_taxid_translator(
        &self,
        taxids: impl IntoIterator<Item = u32>,
    ) -> BTreeMap<u32, String> {
        taxids
            .into_iter()
            .filter_map(|taxid| self.taxon(taxid).map(|t| (taxid, t.name.clone())))
            .collect()
    }

    pub fn get_rank(&self, taxids: impl IntoIterator<Item = u32>) -> BTreeMap<u32, Rank> {
        taxids
            .into_iter()
            .filter_map(|taxid| self.taxon(taxid).map(|t| (taxid, t.rank)))
            .collect()
    }

    /// Ancestors of a taxon, from the root down to the (merge resolved) taxon itself
    pub fn get_lineage(&self, taxid: u32) -> Result<Vec<u32>> {
        let mut current = self.resolve(taxid);
        let mut taxon = self
            .taxa
            .get(&current)
            .with_context(|| format!("Taxid {} not found", taxid))?;
        let mut lineage = vec![current];

        while current != ROOT && taxon.parent != current {
            current = taxon.parent;
            taxon = self.taxa.get(&current).with_context(|| {
                format!("Missing taxon {} in the lineage of {}", current, taxid)
            })?;

            if lineage.len() > self.taxa.len() {
                bail!("Cycle detected in the lineage of {}", taxid);
            }
            lineage.push(current);
        }

        lineage.reverse();
        Ok(lineage)
    }

    /// Scientific names for a list of taxids. Unknown taxids keep their number.
    pub fn translate_to_names(&self, taxids: &[u32]) -> Vec<String> {
        taxids
            .iter()
            .map(|&taxid| match self.taxon(taxid) {
                Some(t) => t.name.clone(),
                None => taxid.to_string(),
            })
            .collect()
    }
}
