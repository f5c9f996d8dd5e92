mod export;
mod names;
mod query;

#[cfg(test)]
mod fixtures;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::info;
use ncbi::{Rank, TaxonomyStore};
use utils::{init_logger, now_str};

fn main() -> Result<()> {
    let args = Cli::parse();
    if let Err(e) = args.validate() {
        e.exit();
    }

    init_logger();

    info!("Reading taxonomy from {}", args.db.display());
    let store = TaxonomyStore::from_dir(&args.db).context("Unable to load the NCBI taxonomy")?;

    query::run(&args, &store)?;
    info!("Done at {}", now_str());

    Ok(())
}

/// Query a local copy of the NCBI taxonomy for taxid/name conversions, automatic tree
/// annotation or pruned NCBI taxonomy topologies in newick format.
#[derive(Parser, Debug)]
#[clap(name = "ncbi-query", version)]
pub struct Cli {
    /// Directory holding the NCBI taxdump (nodes.dmp, names.dmp and optionally merged.dmp)
    #[clap(long, env = "NCBI_TAXDUMP")]
    pub db: PathBuf,

    /// Taxids (space separated)
    #[clap(short = 'i', long = "taxid", num_args = 1.., help_heading = "Taxid input options")]
    pub taxids: Vec<u32>,

    /// File containing a list of taxids (one per line)
    #[clap(long, alias = "taxid_file", help_heading = "Taxid input options")]
    pub taxid_file: Option<PathBuf>,

    /// Read taxids from the leaves of this tree (a newick string or a file)
    #[clap(short = 't', long, help_heading = "Taxid input options")]
    pub reftree: Option<String>,

    /// Tree attribute holding the taxid of each leaf
    #[clap(long, alias = "reftree_attr", default_value = "name", help_heading = "Taxid input options")]
    pub reftree_attr: String,

    /// Species or taxa names (comma separated)
    #[clap(short = 'n', long = "name", num_args = 1.., help_heading = "Name input options")]
    pub names: Vec<String>,

    /// File containing a list of names (one per line)
    #[clap(long, alias = "names_file", help_heading = "Name input options")]
    pub names_file: Option<PathBuf>,

    /// Try a fuzzy (and slow) search for the names that could not be translated.
    /// The value is the minimum string similarity, between 0 and 1.
    #[clap(long, value_parser = parse_similarity, help_heading = "Name input options")]
    pub fuzzy: Option<f64>,

    /// Dump a pruned version of the NCBI taxonomy tree containing the target taxa into
    /// PREFIX.*.nw files
    #[clap(short = 'x', long, value_name = "PREFIX", help_heading = "Output options")]
    pub taxonomy: Option<PathBuf>,

    /// Dump NCBI taxonomy information for each target taxid into PREFIX.info.txt
    #[clap(short = 'l', long = "list", value_name = "PREFIX", help_heading = "Output options")]
    pub info_list: Option<PathBuf>,

    /// Dump the reference tree given with -t, annotated with NCBI information, into this file
    #[clap(short = 'a', long, value_name = "FILE", help_heading = "Output options")]
    pub annotated: Option<PathBuf>,

    /// Flatten every target species, so its subspecies and the species itself become sister
    /// nodes
    #[clap(long, alias = "collapse_subspecies", help_heading = "Output options")]
    pub collapse_subspecies: bool,

    /// Discard every node below the first node of this rank
    #[clap(long, alias = "rank_limit", help_heading = "Output options")]
    pub rank_limit: Option<Rank>,

    /// Keep single-child nodes, so the complete lineage from the root to every tip is kept
    #[clap(long, alias = "full_lineage", help_heading = "Output options")]
    pub full_lineage: bool,
}

impl Cli {
    fn validate(&self) -> Result<(), clap::Error> {
        let mut cmd = Cli::command();

        let taxid_source =
            !self.taxids.is_empty() || self.taxid_file.is_some() || self.reftree.is_some();
        let name_source = !self.names.is_empty() || self.names_file.is_some();

        if !taxid_source && !name_source {
            return Err(cmd.error(
                ErrorKind::MissingRequiredArgument,
                "At least one input source is required",
            ));
        }
        if taxid_source && name_source {
            return Err(cmd.error(
                ErrorKind::ArgumentConflict,
                "taxid and name options are mutually exclusive",
            ));
        }
        if self.taxonomy.is_none() && self.info_list.is_none() && self.annotated.is_none() {
            return Err(cmd.error(
                ErrorKind::MissingRequiredArgument,
                "At least one output option is required",
            ));
        }
        if self.annotated.is_some() && self.reftree.is_none() {
            return Err(cmd.error(
                ErrorKind::MissingRequiredArgument,
                "--annotated needs a reference tree (--reftree)",
            ));
        }

        Ok(())
    }
}

fn parse_similarity(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("\"{}\" is not a number", s))?;

    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("similarity must be between 0 and 1, got {}", value))
    }
}
