use tempfile::TempDir;

use ncbi::TaxonomyStore;

const NODES: &str = "\
1\t|\t1\t|\tno rank\t|
131567\t|\t1\t|\tcellular root\t|
2759\t|\t131567\t|\tdomain\t|
40674\t|\t2759\t|\tclass\t|
9604\t|\t40674\t|\tfamily\t|
9605\t|\t9604\t|\tgenus\t|
9606\t|\t9605\t|\tspecies\t|
63221\t|\t9606\t|\tsubspecies\t|
741158\t|\t9606\t|\tsubspecies\t|
9596\t|\t9604\t|\tgenus\t|
9598\t|\t9596\t|\tspecies\t|
10088\t|\t40674\t|\tgenus\t|
10090\t|\t10088\t|\tspecies\t|
";

const NAMES: &str = "\
1\t|\troot\t|\t\t|\tscientific name\t|
131567\t|\tcellular organisms\t|\t\t|\tscientific name\t|
2759\t|\tEukaryota\t|\t\t|\tscientific name\t|
40674\t|\tMammalia\t|\t\t|\tscientific name\t|
9604\t|\tHominidae\t|\t\t|\tscientific name\t|
9605\t|\tHomo\t|\t\t|\tscientific name\t|
9606\t|\tHomo sapiens\t|\t\t|\tscientific name\t|
9606\t|\thuman\t|\t\t|\tgenbank common name\t|
63221\t|\tHomo sapiens neanderthalensis\t|\t\t|\tscientific name\t|
741158\t|\tHomo sapiens subsp. Denisova\t|\t\t|\tscientific name\t|
9596\t|\tPan\t|\t\t|\tscientific name\t|
9598\t|\tPan troglodytes\t|\t\t|\tscientific name\t|
10088\t|\tMus\t|\t\t|\tscientific name\t|
10090\t|\tMus musculus\t|\t\t|\tscientific name\t|
";

const MERGED: &str = "4444\t|\t9598\t|\n";

/// Write a small taxdump (hominids and the house mouse) into a temporary directory
pub fn sample_store() -> (TempDir, TaxonomyStore) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("nodes.dmp"), NODES).unwrap();
    std::fs::write(dir.path().join("names.dmp"), NAMES).unwrap();
    std::fs::write(dir.path().join("merged.dmp"), MERGED).unwrap();

    let store = TaxonomyStore::from_dir(dir.path()).unwrap();
    (dir, store)
}
