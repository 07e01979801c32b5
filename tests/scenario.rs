//! End-to-end walk through insert, dump, delete, expiry and reload.

use skipcache::{Config, InsertOutcome, SkipList};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_reference_scenario() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store").join("dumpFile");

    let config = Config::default()
        .with_max_level(6)
        .with_ttl(Duration::from_secs(2))
        .with_cache_capacity(100)
        .with_store_path(&path);
    let list: SkipList<i32, String> = SkipList::new(config).unwrap();

    let inserts = [
        (1, "aaa"),
        (3, "bbb"),
        (3, "ccc"),
        (3, "ddd"),
        (5, "eee"),
        (6, "fff"),
        (7, "ggg"),
    ];
    let outcomes: Vec<InsertOutcome> = inserts
        .iter()
        .map(|(k, v)| list.insert(*k, v.to_string()))
        .collect();
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == InsertOutcome::AlreadyExists)
            .count(),
        2
    );
    assert_eq!(list.len(), 5);

    assert_eq!(list.dump_file().unwrap(), 5);
    let dumped = std::fs::read_to_string(&path).unwrap();
    assert_eq!(dumped, "1:aaa\n3:bbb\n5:eee\n6:fff\n7:ggg\n");

    assert!(list.delete(&5));
    assert!(list.delete(&7));
    assert_eq!(list.len(), 3);
    assert_eq!(list.keys(), vec![1, 3, 6]);

    thread::sleep(Duration::from_secs(3));

    assert_eq!(list.insert(6, "hhh".into()), InsertOutcome::AlreadyExists);
    assert_eq!(list.insert(9, "hhh".into()), InsertOutcome::Inserted);
    assert_eq!(list.len(), 4);

    assert_eq!(list.search(&3), None);
    assert_eq!(list.len(), 3);
    assert_eq!(list.search(&9), Some("hhh".to_string()));
    assert_eq!(list.search(&6), Some("fff".to_string()));

    // Key 1 expired too but is only collected once looked at or swept
    assert_eq!(list.sweep_expired(), 1);
    assert_eq!(list.keys(), vec![6, 9]);

    // The dump taken before the deletes still restores into an empty list
    let restored: SkipList<i32, String> =
        SkipList::new(Config::default().with_store_path(&path)).unwrap();
    let report = restored.load_file().unwrap();
    assert_eq!(report.inserted, 5);
    assert_eq!(report.skipped, 0);
    assert_eq!(
        restored.entries(),
        vec![
            (1, "aaa".to_string()),
            (3, "bbb".to_string()),
            (5, "eee".to_string()),
            (6, "fff".to_string()),
            (7, "ggg".to_string()),
        ]
    );
}

#[test]
fn test_string_keys() {
    let list: SkipList<String, String> =
        SkipList::new(Config::default().with_max_level(8)).unwrap();
    for word in ["pear", "apple", "fig", "kiwi"] {
        list.insert(word.to_string(), word.len().to_string());
    }
    assert_eq!(list.keys(), vec!["apple", "fig", "kiwi", "pear"]);
    assert_eq!(list.search(&"fig".to_string()), Some("3".to_string()));
    assert!(list.delete(&"apple".to_string()));
    assert_eq!(list.len(), 3);
}
