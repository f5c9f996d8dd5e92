//! Phylogenetic trees with Newick and NHX (New Hampshire eXtended) input and output.

mod error;
mod parser;
mod tree;
mod writer;

pub use error::NewickError;
pub use parser::parse;
pub use tree::{Node, NodeId, PhyloTree};
pub use writer::NewickFormat;
