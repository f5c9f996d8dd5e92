use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use ncbi::TaxonomyStore;
use newick::PhyloTree;
use utils::read_list;

use crate::Cli;
use crate::export::{self, TaxonomyOptions};
use crate::names::{collect_names, translate_names};

pub fn run(args: &Cli, store: &TaxonomyStore) -> Result<()> {
    let mut all_taxids: BTreeSet<u32> = BTreeSet::new();

    if !args.names.is_empty() || args.names_file.is_some() {
        let names = collect_names(&args.names, args.names_file.as_deref())?;
        info!("Dumping name translations ({} names)", names.len());

        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for row in translate_names(store, &names, args.fuzzy) {
            writeln!(&mut handle, "{}", row).context("Error writing to stdout")?;
            all_taxids.extend(&row.taxids);
        }
        handle.flush().context("Error writing to stdout")?;
    }

    if let Some(pb) = &args.taxid_file {
        all_taxids.extend(read_taxid_file(pb)?);
    }
    all_taxids.extend(&args.taxids);

    let mut reftree = match &args.reftree {
        Some(source) => {
            let tree = load_tree(source)?;
            all_taxids.extend(reftree_taxids(&tree, &args.reftree_attr)?);
            Some(tree)
        }
        None => None,
    };

    if all_taxids.is_empty() {
        warn!("No target taxids, nothing to dump");
        return Ok(());
    }
    info!("{} target taxids", all_taxids.len());

    if let Some(prefix) = &args.info_list {
        export::write_info_list(store, &all_taxids, prefix)?;
    }

    if let Some(prefix) = &args.taxonomy {
        let options = TaxonomyOptions {
            full_lineage: args.full_lineage,
            rank_limit: args.rank_limit,
            collapse_subspecies: args.collapse_subspecies,
        };
        export::write_taxonomy(store, &all_taxids, prefix, options)?;
    }

    if let (Some(outfile), Some(tree)) = (&args.annotated, reftree.as_mut()) {
        info!("Annotating reference tree into {}", outfile.display());
        export::write_annotated_tree(store, tree, &args.reftree_attr, outfile)?;
    }

    Ok(())
}

fn read_taxid_file(pb: &Path) -> Result<Vec<u32>> {
    read_list(pb)
        .context("Unable to read taxid file")?
        .iter()
        .map(|line| {
            line.parse::<u32>()
                .with_context(|| format!("Invalid taxid \"{}\" in {}", line, pb.display()))
        })
        .collect()
}

/// Read a newick tree from a file when `source` names one, or parse `source` itself
fn load_tree(source: &str) -> Result<PhyloTree> {
    let path = Path::new(source);
    let text = if path.is_file() {
        std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read tree file {}", path.display()))?
    } else {
        source.to_string()
    };

    newick::parse(text.trim()).context("Unable to parse the reference tree")
}

/// Taxids held in `attr` of every leaf
fn reftree_taxids(tree: &PhyloTree, attr: &str) -> Result<Vec<u32>> {
    tree.leaves()
        .into_iter()
        .map(|leaf| {
            let value = tree.feature(leaf, attr).with_context(|| {
                format!("Leaf \"{}\" has no \"{}\" attribute", tree.name(leaf), attr)
            })?;
            value
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Leaf attribute \"{}\" is not a taxid", value))
        })
        .collect()
}
