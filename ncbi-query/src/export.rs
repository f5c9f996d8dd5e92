//! Writers for the info table and the newick outputs

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use ncbi::{Rank, TaxonomyStore};
use newick::{NewickFormat, NodeId, PhyloTree};
use utils::open_write;

const FULL_ANNOTATION_FEATURES: &[&str] = &[
    "taxid",
    "name",
    "rank",
    "sci_name",
    "collapse_subspecies",
    "named_lineage",
];

const REFTREE_FEATURES: &[&str] = &["taxid", "sci_name", "ncbi_track"];

#[derive(Debug, Clone, Copy, Default)]
pub struct TaxonomyOptions {
    pub full_lineage: bool,
    pub rank_limit: Option<Rank>,
    pub collapse_subspecies: bool,
}

/// `prefix` with `suffix` appended to its last component
pub fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(prefix.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

/// Write `PREFIX.info.txt`: queried taxid, scientific name, named lineage and lineage.
/// Returns the taxids that are not in the taxonomy.
pub fn write_info_list(
    store: &TaxonomyStore,
    taxids: &BTreeSet<u32>,
    prefix: &Path,
) -> Result<Vec<u32>> {
    let (resolved, conversion) = store.translate_merged(taxids.iter().copied());

    // Report merged taxids under the id that was asked for
    let mut queried: BTreeMap<u32, u32> = resolved.iter().map(|&t| (t, t)).collect();
    for (&old, &new) in &conversion {
        if !taxids.contains(&new) {
            queried.insert(new, old);
        }
    }

    let outfile = with_suffix(prefix, ".info.txt");
    info!(
        "Dumping {} taxid translations in {} ...",
        resolved.len(),
        outfile.display()
    );

    let translator = store.get_taxid_translator(resolved.iter().copied());
    let mut writer = open_write(&outfile).context("Unable to open info output file")?;

    for (&taxid, name) in &translator {
        let lineage = store.get_lineage(taxid)?;
        let named_lineage = store.translate_to_names(&lineage).join(",");
        let lineage: Vec<String> = lineage.iter().map(u32::to_string).collect();

        writeln!(
            &mut writer,
            "{}\t{}\t{}\t{}",
            queried[&taxid],
            name,
            named_lineage,
            lineage.join(",")
        )
        .context("Error writing to info file")?;
    }
    writer.flush().context("Error writing to info file")?;

    let missing: Vec<u32> = resolved
        .iter()
        .filter(|t| !translator.contains_key(t))
        .map(|t| queried[t])
        .collect();
    for taxid in &missing {
        warn!("{} NOT FOUND", taxid);
    }

    Ok(missing)
}

/// Write the pruned NCBI topology of the target taxa as `PREFIX.names.nw`,
/// `PREFIX.allnames.nw`, `PREFIX.full_annotation.nw`, `PREFIX.taxids.nw` and
/// `PREFIX.alltaxids.nw`
pub fn write_taxonomy(
    store: &TaxonomyStore,
    taxids: &BTreeSet<u32>,
    prefix: &Path,
    options: TaxonomyOptions,
) -> Result<Vec<PathBuf>> {
    let (targets, _) = store.translate_merged(taxids.iter().copied());
    info!(
        "Dumping NCBI taxonomy of {} taxa in {}.*.nw ...",
        targets.len(),
        prefix.display()
    );

    let mut tree = store
        .get_topology(targets.iter().copied(), options.full_lineage, options.rank_limit)
        .context("Unable to build the taxonomy topology")?;

    // Nodes are named after their taxid at this point
    store.annotate_tree(&mut tree, "name");
    for node in tree.traverse() {
        let label = match (tree.feature(node, "sci_name"), tree.feature(node, "taxid")) {
            (Some(sci_name), Some(taxid)) => format!("{}{{{}}}", sci_name, taxid),
            _ => continue,
        };
        tree.set_name(node, label);
    }

    if options.collapse_subspecies {
        let collapsed = collapse_subspecies(&mut tree, &targets);
        info!("Collapsed {} species nodes", collapsed);
    }

    let mut written = vec![
        write_tree(&tree, NewickFormat::LeafNames, None, &with_suffix(prefix, ".names.nw"))?,
        write_tree(&tree, NewickFormat::AllNames, None, &with_suffix(prefix, ".allnames.nw"))?,
        write_tree(
            &tree,
            NewickFormat::LeafNames,
            Some(FULL_ANNOTATION_FEATURES),
            &with_suffix(prefix, ".full_annotation.nw"),
        )?,
    ];

    // Internal nodes keep their `sci_name{taxid}` label
    for leaf in tree.leaves() {
        if let Some(taxid) = tree.feature(leaf, "taxid").map(|t| t.into_owned()) {
            tree.set_name(leaf, taxid);
        }
    }

    written.push(write_tree(&tree, NewickFormat::LeafNames, None, &with_suffix(prefix, ".taxids.nw"))?);
    written.push(write_tree(&tree, NewickFormat::AllNames, None, &with_suffix(prefix, ".alltaxids.nw"))?);

    Ok(written)
}

/// Flatten the target species nodes that have descendants.
///
/// Every descendant becomes a direct child of the species node, its name suffixed with
/// `{rank}`. A leaf copying the species node (name suffixed with `{species}`) is appended so the
/// species itself sits next to its subspecies. Returns the number of collapsed species.
pub fn collapse_subspecies(tree: &mut PhyloTree, targets: &BTreeSet<u32>) -> usize {
    let species_nodes: Vec<NodeId> = tree
        .traverse()
        .into_iter()
        .filter(|&n| {
            tree.feature(n, "rank").is_some_and(|r| r == Rank::Species.to_string())
                && tree
                    .feature(n, "taxid")
                    .and_then(|t| t.parse::<u32>().ok())
                    .is_some_and(|t| targets.contains(&t))
        })
        .collect();

    let mut collapsed = 0;
    for species in species_nodes {
        let below = tree.descendants(species);
        if below.is_empty() {
            continue;
        }

        let connector_name = format!("{}{{{}}}", tree.name(species), Rank::Species);
        let connector = tree.new_node(connector_name);
        let (dist, support) = (tree.node(species).dist, tree.node(species).support);
        tree.node_mut(connector).dist = dist;
        tree.node_mut(connector).support = support;
        for (key, value) in tree.features(species).clone() {
            tree.set_feature(connector, key, value);
        }

        for node in below {
            tree.attach(species, node);
            let rank = tree
                .feature(node, "rank")
                .map(|r| r.into_owned())
                .unwrap_or_else(|| Rank::NoRank.to_string());
            let name = format!("{}{{{}}}", tree.name(node), rank);
            tree.set_name(node, name);
        }

        tree.attach(species, connector);
        tree.set_feature(species, "collapse_subspecies", "1");
        collapsed += 1;
    }

    collapsed
}

/// Annotate the reference tree leaves with `taxid`, `sci_name` and `ncbi_track` and write it
/// with distances and support values
pub fn write_annotated_tree(
    store: &TaxonomyStore,
    tree: &mut PhyloTree,
    taxid_attr: &str,
    outfile: &Path,
) -> Result<()> {
    for leaf in tree.leaves() {
        if tree.has_feature(leaf, "taxid") {
            continue;
        }
        if let Some(value) = tree.feature(leaf, taxid_attr).map(|v| v.trim().to_string()) {
            tree.set_feature(leaf, "taxid", value);
        }
    }

    for taxid in store.annotate_tree(tree, "taxid") {
        warn!("{} NOT FOUND", taxid);
    }

    for node in tree.traverse() {
        if let Some(track) = tree.feature(node, "named_lineage").map(|t| t.into_owned()) {
            tree.set_feature(node, "ncbi_track", track);
        }
    }

    write_tree(tree, NewickFormat::Support, Some(REFTREE_FEATURES), outfile)?;
    Ok(())
}

fn write_tree(
    tree: &PhyloTree,
    format: NewickFormat,
    features: Option<&[&str]>,
    pb: &Path,
) -> Result<PathBuf> {
    let mut writer = open_write(pb).context("Unable to open tree output file")?;
    writeln!(&mut writer, "{}", tree.write(format, features))
        .and_then(|_| writer.flush())
        .with_context(|| format!("Error writing tree to {}", pb.display()))?;

    info!("Wrote {} (newick format {})", pb.display(), format.code());
    Ok(pb.to_path_buf())
}
