use std::collections::HashMap;

use anyhow::{Result, bail};
use log::{debug, warn};
use newick::{NodeId, PhyloTree};

use super::TaxonomyStore;
use crate::{ROOT, Rank};

impl TaxonomyStore {
    /// Build the part of the taxonomy connecting the given taxa.
    ///
    /// Nodes are named by taxid and carry a `rank` feature. With `rank_limit`, lineages are cut
    /// right after their first node of that rank. Unless `intermediate_nodes` is set, every
    /// single-child node that was not requested is removed, and a single-child root is replaced
    /// by its child.
    pub fn get_topology(
        &self,
        taxids: impl IntoIterator<Item = u32>,
        intermediate_nodes: bool,
        rank_limit: Option<Rank>,
    ) -> Result<PhyloTree> {
        let (taxids, _) = self.translate_merged(taxids);

        let mut tree = PhyloTree::with_root_name(ROOT.to_string());
        let root = tree.root();
        tree.set_feature(root, "rank", self.rank_of(ROOT));

        let mut id2node: HashMap<u32, NodeId> = HashMap::from([(ROOT, root)]);
        let mut node2id: HashMap<NodeId, u32> = HashMap::from([(root, ROOT)]);
        let mut found = 0;

        for &taxid in &taxids {
            let lineage = match self.get_lineage(taxid) {
                Ok(lineage) => lineage,
                Err(e) => {
                    warn!("Skipping {}: {:#}", taxid, e);
                    continue;
                }
            };
            found += 1;

            let mut parent = root;
            for elem in lineage {
                let node = match id2node.get(&elem) {
                    Some(&node) => node,
                    None => {
                        let node = tree.add_child(parent, elem.to_string());
                        tree.set_feature(node, "rank", self.rank_of(elem));
                        id2node.insert(elem, node);
                        node2id.insert(node, elem);
                        node
                    }
                };

                if rank_limit.is_some_and(|rank| self.rank_of(elem) == rank) {
                    break;
                }
                parent = node;
            }
        }

        if found == 0 {
            bail!("None of the requested taxids were found in the taxonomy");
        }

        if !intermediate_nodes {
            for node in tree.descendants(root) {
                if tree.children(node).len() == 1 && !taxids.contains(&node2id[&node]) {
                    tree.delete(node);
                }
            }
        }

        if tree.children(root).len() == 1 && !taxids.contains(&ROOT) {
            let child = tree.children(root)[0];
            tree.set_root(child);
        }

        debug!(
            "Topology for {} taxa has {} nodes",
            found,
            tree.node_count()
        );
        Ok(tree)
    }

    /// Annotate every node whose `taxid_attr` holds a taxid with `taxid`, `sci_name`, `rank`,
    /// `lineage` and `named_lineage` (both `|` separated).
    ///
    /// Nodes with a taxid missing from the taxonomy get their own name as `sci_name`; their taxids
    /// are returned.
    pub fn annotate_tree(&self, tree: &mut PhyloTree, taxid_attr: &str) -> Vec<u32> {
        let mut unresolved = Vec::new();

        for node in tree.traverse() {
            let value = match tree.feature(node, taxid_attr) {
                Some(v) => v.trim().to_string(),
                None => continue,
            };
            let taxid: u32 = match value.parse() {
                Ok(taxid) => taxid,
                Err(_) => {
                    debug!("Node \"{}\" has no taxid in \"{}\"", tree.name(node), taxid_attr);
                    continue;
                }
            };

            tree.set_feature(node, "taxid", taxid);

            match (self.taxon(taxid), self.get_lineage(taxid)) {
                (Some(taxon), Ok(lineage)) => {
                    let named_lineage = self.translate_to_names(&lineage);
                    let lineage: Vec<String> = lineage.iter().map(u32::to_string).collect();

                    tree.set_feature(node, "sci_name", &taxon.name);
                    tree.set_feature(node, "rank", taxon.rank);
                    tree.set_feature(node, "lineage", lineage.join("|"));
                    tree.set_feature(node, "named_lineage", named_lineage.join("|"));
                }
                _ => {
                    let name = tree.name(node).to_string();
                    tree.set_feature(node, "sci_name", name);
                    tree.set_feature(node, "named_lineage", "");
                    unresolved.push(taxid);
                }
            }
        }

        unresolved
    }

    fn rank_of(&self, taxid: u32) -> Rank {
        self.taxon(taxid).map(|t| t.rank).unwrap_or(Rank::NoRank)
    }
}
