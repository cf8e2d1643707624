// tests/store.rs

mod common;
use crate::common::builders::JobSpecBuilder;

use std::collections::HashSet;

use proptest::prelude::*;
use simon::job::JobSpec;
use simon::store::JobStore;

fn spec_strategy() -> impl Strategy<Value = JobSpec> {
    (
        "[0-9a-f]{0,40}",
        proptest::collection::vec(any::<String>(), 0..8),
        "\\PC{1,40}",
        "\\PC{1,40}",
        prop_oneof![Just(String::new()), any::<String>()],
    )
        .prop_map(|(revision, patch, build, init, run)| {
            JobSpec::define(build, init, run, revision, patch)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn manifest_round_trips(spec in spec_strategy()) {
        let root = tempfile::tempdir().unwrap();
        let store = JobStore::new(root.path()).unwrap();
        let job = store.locate_fresh(spec.clone());

        store.persist(&job).unwrap();
        let loaded = store.load(&job.dir().display().to_string()).unwrap();

        prop_assert_eq!(loaded.spec(), &spec);
        // Loading is idempotent.
        let again = store.load(&job.dir().display().to_string()).unwrap();
        prop_assert_eq!(again.spec(), loaded.spec());
    }
}

#[test]
fn jobs_defined_in_sequence_get_distinct_sorted_dirs() {
    let root = tempfile::tempdir().unwrap();
    let store = JobStore::new(root.path()).unwrap();

    let dirs: Vec<_> = (0..50)
        .map(|i| {
            JobSpecBuilder::new()
                .build_cmd(&format!("echo {i}"))
                .persist_in(&store)
                .dir()
                .to_path_buf()
        })
        .collect();

    let unique: HashSet<_> = dirs.iter().collect();
    assert_eq!(unique.len(), dirs.len());

    let mut sorted = dirs.clone();
    sorted.sort();
    assert_eq!(sorted, dirs);
}

#[test]
fn fresh_paths_are_unique_across_threads() {
    let root = tempfile::tempdir().unwrap();
    let store = JobStore::new(root.path()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || (0..250).map(|_| store.fresh_path()).collect::<Vec<_>>())
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        for path in handle.join().unwrap() {
            assert!(all.insert(path), "duplicate fresh path");
        }
    }
    assert_eq!(all.len(), 1000);
}

#[test]
fn manifest_keeps_revision_and_patch() {
    let root = tempfile::tempdir().unwrap();
    let store = JobStore::new(root.path()).unwrap();
    let spec = JobSpecBuilder::new()
        .revision("3f2a9c1")
        .patch_line("--- a/sim.c")
        .patch_line("+++ b/sim.c")
        .build();

    let job = store.locate_fresh(spec.clone());
    store.persist(&job).unwrap();

    let json = std::fs::read_to_string(store.in_job(&job, "job_spec.json")).unwrap();
    assert!(json.contains("\"revision\": \"3f2a9c1\""), "{json}");

    let loaded = store
        .load(&store.normalize_identifier(job.dir()))
        .unwrap()
        .into_spec();
    assert_eq!(loaded, spec);
    assert_eq!(loaded.patch, vec!["--- a/sim.c", "+++ b/sim.c"]);
}
