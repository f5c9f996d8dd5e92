use strum_macros::{Display, EnumCount, EnumIter, EnumString};

pub mod taxonomy;

pub use taxonomy::{FuzzyMatch, TaxonomyStore};

/// Taxid of the root of the NCBI taxonomy
pub const ROOT: u32 = 1;

#[rustfmt::skip]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Display, EnumString, EnumCount, EnumIter)]
pub enum Rank {
    #[strum(serialize="no rank")]                     NoRank,
    #[strum(serialize="clade")]                       Clade,
    #[strum(serialize="acellular root")]              AcellularRoot,
    #[strum(serialize="cellular root")]               CellularRoot,
    #[strum(serialize="superkingdom")]                Superkingdom,
    #[strum(serialize="domain")]                      Domain,
    #[strum(serialize="realm")]                       Realm,
    #[strum(serialize="kingdom")]                     Kingdom,
    #[strum(serialize="subkingdom")]                  Subkingdom,
    #[strum(serialize="superphylum")]                 Superphylum,
    #[strum(serialize="phylum")]                      Phylum,
    #[strum(serialize="subphylum")]                   Subphylum,
    #[strum(serialize="superclass")]                  Superclass,
    #[strum(serialize="class")]                       Class,
    #[strum(serialize="subclass")]                    Subclass,
    #[strum(serialize="infraclass")]                  Infraclass,
    #[strum(serialize="cohort")]                      Cohort,
    #[strum(serialize="subcohort")]                   Subcohort,
    #[strum(serialize="superorder")]                  Superorder,
    #[strum(serialize="order")]                       Order,
    #[strum(serialize="suborder")]                    Suborder,
    #[strum(serialize="infraorder")]                  Infraorder,
    #[strum(serialize="parvorder")]                   Parvorder,
    #[strum(serialize="superfamily")]                 Superfamily,
    #[strum(serialize="family")]                      Family,
    #[strum(serialize="subfamily")]                   Subfamily,
    #[strum(serialize="tribe")]                       Tribe,
    #[strum(serialize="subtribe")]                    Subtribe,
    #[strum(serialize="genus")]                       Genus,
    #[strum(serialize="subgenus")]                    Subgenus,
    #[strum(serialize="section")]                     Section,
    #[strum(serialize="subsection")]                  Subsection,
    #[strum(serialize="series")]                      Series,
    #[strum(serialize="subseries")]                   Subseries,
    #[strum(serialize="species group")]               SpeciesGroup,
    #[strum(serialize="species subgroup")]            SpeciesSubgroup,
    #[strum(serialize="species")]                     Species,
    #[strum(serialize="forma specialis")]             FormaSpecialis,
    #[strum(serialize="subspecies")]                  Subspecies,
    #[strum(serialize="varietas")]                    Varietas,
    #[strum(serialize="subvariety")]                  Subvariety,
    #[strum(serialize="forma")]                       Forma,
    #[strum(serialize="serogroup")]                   Serogroup,
    #[strum(serialize="serotype")]                    Serotype,
    #[strum(serialize="strain")]                      Strain,
    #[strum(serialize="isolate")]                     Isolate,
    #[strum(serialize="biotype")]                     Biotype,
    #[strum(serialize="genotype")]                    Genotype,
    #[strum(serialize="morph")]                       Morph,
    #[strum(serialize="pathogroup")]                  Pathogroup,
}

#[derive(Debug)]
pub struct Taxon {
    pub name: String,
    pub rank: Rank,
    pub parent: u32,
}

impl Taxon {
    pub fn new(name: String, rank: Rank, parent: u32) -> Self {
        Taxon { name, rank, parent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn test_rank_strings_are_unique_and_parse_back() {
        let mut seen = std::collections::HashSet::new();
        for rank in Rank::iter() {
            assert!(seen.insert(rank.to_string()));
            assert_eq!(Rank::from_str(&rank.to_string()).unwrap(), rank);
        }
        assert_eq!(seen.len(), Rank::COUNT);
    }

    #[test]
    fn test_rank_parse_unknown() {
        assert_eq!(Rank::from_str("species").unwrap(), Rank::Species);
        assert!(Rank::from_str("hyperspecies").is_err());
    }
}
