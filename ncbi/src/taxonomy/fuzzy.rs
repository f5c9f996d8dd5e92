use log::debug;

use super::TaxonomyStore;

/// Best approximate match for a name that has no exact translation
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub taxid: u32,
    pub name: String,
    pub distance: usize,
    /// `1 - distance / len(query)`
    pub score: f64,
}

impl TaxonomyStore {
    /// Look for the name closest to `name` in Levenshtein distance.
    ///
    /// At most `ceil(len * (1 - similarity))` edits are allowed. Scientific names are searched
    /// first; synonyms only when no scientific name is close enough. Ties go to the lowest taxid.
    pub fn get_fuzzy_name_translation(&self, name: &str, similarity: f64) -> Option<FuzzyMatch> {
        let query = name.to_lowercase();
        let length = query.chars().count();
        if length == 0 {
            return None;
        }

        let max_distance = (length as f64 * (1.0 - similarity)).ceil().max(0.0) as usize;
        debug!("Trying fuzzy search for {} (max distance {})", name, max_distance);

        let scientific = self.taxa.iter().map(|(&id, t)| (id, t.name.as_str()));
        let synonyms = self.synonyms.iter().map(|(id, n)| (*id, n.as_str()));

        let (taxid, found, distance) = closest(&query, length, max_distance, scientific)
            .or_else(|| closest(&query, length, max_distance, synonyms))?;

        let score = 1.0 - distance as f64 / length as f64;
        debug!("Found {} (taxid {}) at distance {} ({:.2})", found, taxid, distance, score);

        Some(FuzzyMatch {
            taxid,
            name: found.to_string(),
            distance,
            score,
        })
    }
}

fn closest<'a>(
    query: &str,
    length: usize,
    max_distance: usize,
    candidates: impl Iterator<Item = (u32, &'a str)>,
) -> Option<(u32, &'a str, usize)> {
    let mut best: Option<(u32, &'a str, usize)> = None;

    for (taxid, candidate) in candidates {
        // The length difference is a lower bound for the edit distance
        if candidate.chars().count().abs_diff(length) > max_distance {
            continue;
        }

        let distance = strsim::levenshtein(query, &candidate.to_lowercase());
        if distance > max_distance {
            continue;
        }

        let better = match best {
            None => true,
            Some((best_id, _, best_distance)) => {
                distance < best_distance || (distance == best_distance && taxid < best_id)
            }
        };
        if better {
            best = Some((taxid, candidate, distance));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::sample_store;

    #[test]
    fn test_fuzzy_scientific_name() {
        let (_dir, store) = sample_store();
        let got = store.get_fuzzy_name_translation("Homo sapins", 0.8).unwrap();

        assert_eq!(got.taxid, 9606);
        assert_eq!(got.name, "Homo sapiens");
        assert_eq!(got.distance, 1);
        assert!((got.score - 10.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_falls_back_to_synonyms() {
        let (_dir, store) = sample_store();
        let got = store.get_fuzzy_name_translation("chimpanze", 0.8).unwrap();

        assert_eq!(got.taxid, 9598);
        assert_eq!(got.name, "chimpanzee");
    }

    #[test]
    fn test_fuzzy_respects_similarity() {
        let (_dir, store) = sample_store();

        assert!(store.get_fuzzy_name_translation("Homo sapins", 1.0).is_none());
        assert!(store.get_fuzzy_name_translation("Xyzzy plugh", 0.9).is_none());
        assert!(store.get_fuzzy_name_translation("", 0.5).is_none());
    }

    #[test]
    fn test_fuzzy_exact_name_scores_one() {
        let (_dir, store) = sample_store();
        let got = store.get_fuzzy_name_translation("MUS MUSCULUS", 0.9).unwrap();

        assert_eq!(got.taxid, 10090);
        assert_eq!(got.distance, 0);
        assert_eq!(got.score, 1.0);
    }
}
