//! Tests for the favourites store

use super::*;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// In-memory storage whose records and failure switches stay reachable from the test
#[derive(Clone, Default)]
struct TestStorage {
    records: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
    fail_reads: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
}

impl TestStorage {
    fn with_record(value: &str) -> Self {
        let storage = Self::default();
        storage.records.borrow_mut().insert(FAVOURITES_KEY.to_string(), value.to_string());
        storage
    }

    fn record(&self) -> Option<String> {
        self.records.borrow().get(FAVOURITES_KEY).cloned()
    }

    fn stored_ids(&self) -> Vec<i64> {
        let record = self.record().unwrap_or_else(|| "[]".to_string());
        let movies: Vec<MovieSummary> = serde_json::from_str(&record).unwrap();
        movies.iter().map(|m| m.id).collect()
    }
}

impl Storage for TestStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        Ok(self.records.borrow().get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.writes.set(self.writes.get() + 1);
        self.records.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn movie(id: i64, title: &str) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/{}.jpg", id)),
        release_date: "2024-01-01".to_string(),
        vote_average: 7.0,
    }
}

fn ids(store: &FavouritesStore) -> Vec<i64> {
    store.list().iter().map(|m| m.id).collect()
}

#[test]
fn test_add_twice_then_remove() {
    let storage = TestStorage::default();
    let mut store = FavouritesStore::open(Box::new(storage.clone()));
    assert!(store.is_empty());

    assert!(store.add(movie(1, "A")));
    assert_eq!(ids(&store), vec![1]);

    assert!(!store.add(movie(1, "A")));
    assert_eq!(ids(&store), vec![1]);
    assert_eq!(store.list()[0].title, "A");

    let removed = store.remove(1);
    assert_eq!(removed.map(|m| m.id), Some(1));
    assert!(store.is_empty());
    assert_eq!(storage.stored_ids(), Vec::<i64>::new());
}

#[test]
fn test_duplicate_add_keeps_original_entry_and_order() {
    let mut store = FavouritesStore::open(Box::new(TestStorage::default()));
    store.add(movie(3, "Three"));
    store.add(movie(1, "One"));
    store.add(movie(2, "Two"));

    assert!(!store.add(movie(3, "Three (re-release)")));
    assert_eq!(ids(&store), vec![3, 1, 2]);
    assert_eq!(store.list()[0].title, "Three");
}

#[test]
fn test_remove_missing_id_is_noop_but_persists() {
    let storage = TestStorage::default();
    let mut store = FavouritesStore::open(Box::new(storage.clone()));
    store.add(movie(1, "A"));
    store.add(movie(2, "B"));
    let writes_before = storage.writes.get();

    assert!(store.remove(42).is_none());
    assert_eq!(ids(&store), vec![1, 2]);
    assert_eq!(storage.writes.get(), writes_before + 1);
    assert_eq!(storage.stored_ids(), vec![1, 2]);
}

#[test]
fn test_uniqueness_over_mixed_operations() {
    let mut store = FavouritesStore::open(Box::new(TestStorage::default()));
    let ops: [(bool, i64); 12] = [
        (true, 1), (true, 2), (true, 1), (false, 2), (true, 2), (true, 3),
        (false, 9), (true, 3), (false, 1), (true, 1), (true, 2), (true, 1),
    ];

    for (is_add, id) in ops {
        if is_add {
            store.add(movie(id, "m"));
        } else {
            store.remove(id);
        }
        let mut seen = HashSet::new();
        assert!(store.list().iter().all(|m| seen.insert(m.id)));
        assert_eq!(seen.len(), store.len());
    }
    assert_eq!(ids(&store), vec![2, 3, 1]);
    assert!(store.contains(3));
    assert!(!store.contains(9));
}

#[test]
fn test_every_mutation_rewrites_full_list() {
    let storage = TestStorage::default();
    let mut store = FavouritesStore::open(Box::new(storage.clone()));

    store.add(movie(10, "X"));
    assert_eq!(storage.stored_ids(), vec![10]);
    store.add(movie(20, "Y"));
    assert_eq!(storage.stored_ids(), vec![10, 20]);
    store.remove(10);
    assert_eq!(storage.stored_ids(), vec![20]);
}

#[test]
fn test_reload_reproduces_order() {
    let storage = TestStorage::default();
    {
        let mut store = FavouritesStore::open(Box::new(storage.clone()));
        for id in [5, 3, 8, 1] {
            store.add(movie(id, "m"));
        }
        store.remove(8);
    }

    let reloaded = FavouritesStore::open(Box::new(storage.clone()));
    assert_eq!(ids(&reloaded), vec![5, 3, 1]);
    assert!(reloaded.contains(1));
    assert!(!reloaded.contains(8));
}

#[test]
fn test_unparseable_record_starts_empty() {
    let storage = TestStorage::with_record("{ this is not json");
    let mut store = FavouritesStore::open(Box::new(storage.clone()));
    assert!(store.is_empty());
    assert!(store.is_persistent());
    assert_eq!(store.take_storage_warning(), None);

    store.add(movie(1, "A"));
    assert_eq!(storage.stored_ids(), vec![1]);
}

#[test]
fn test_record_with_repeated_ids_is_deduplicated() {
    let storage = TestStorage::with_record(
        r#"[{"id":1,"title":"First"},{"id":2,"title":"Two"},{"id":1,"title":"Again"}]"#,
    );
    let store = FavouritesStore::open(Box::new(storage));
    assert_eq!(ids(&store), vec![1, 2]);
    assert_eq!(store.list()[0].title, "First");
}

#[test]
fn test_read_failure_degrades_to_memory() {
    let storage = TestStorage::default();
    storage.fail_reads.set(true);
    let mut store = FavouritesStore::open(Box::new(storage.clone()));

    assert!(!store.is_persistent());
    assert!(store.take_storage_warning().is_some());

    assert!(store.add(movie(1, "A")));
    assert_eq!(ids(&store), vec![1]);
    assert_eq!(storage.record(), None);
    assert_eq!(store.take_storage_warning(), None);
}

#[test]
fn test_write_failure_reported_once() {
    let storage = TestStorage::default();
    let mut store = FavouritesStore::open(Box::new(storage.clone()));
    storage.fail_writes.set(true);

    assert!(store.add(movie(1, "A")));
    assert!(!store.is_persistent());
    let warning = store.take_storage_warning().unwrap();
    assert!(warning.contains("quota exceeded"));

    assert!(store.add(movie(2, "B")));
    store.remove(1);
    assert_eq!(ids(&store), vec![2]);
    assert_eq!(store.take_storage_warning(), None);

    // Storage recovering later must not be written to behind the user's back
    storage.fail_writes.set(false);
    store.add(movie(3, "C"));
    assert_eq!(storage.record(), None);
}

#[test]
fn test_file_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("movie_mingle");
    {
        let mut store = FavouritesStore::open(Box::new(FileStorage::new(&nested)));
        store.add(movie(550, "Fight Club"));
        store.add(movie(13, "Forrest Gump"));
    }

    let content = std::fs::read_to_string(nested.join("favourite_movies.json")).unwrap();
    assert!(content.starts_with('['));

    let store = FavouritesStore::open(Box::new(FileStorage::new(&nested)));
    assert_eq!(ids(&store), vec![550, 13]);
    assert_eq!(store.list()[1].poster_path.as_deref(), Some("/13.jpg"));
}

#[test]
fn test_file_storage_replaces_record_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path());
    storage.write(FAVOURITES_KEY, "[1]").unwrap();
    storage.write(FAVOURITES_KEY, "[2]").unwrap();

    assert_eq!(storage.read(FAVOURITES_KEY).unwrap().as_deref(), Some("[2]"));
    assert!(!dir.path().join("favourite_movies.json.tmp").exists());
}

#[test]
fn test_file_storage_ignores_stale_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path());
    storage.write(FAVOURITES_KEY, "[1]").unwrap();
    // Left behind by a write that never reached the rename
    std::fs::write(dir.path().join("favourite_movies.json.tmp"), "[{\"id\": 9").unwrap();

    assert_eq!(storage.read(FAVOURITES_KEY).unwrap().as_deref(), Some("[1]"));
    storage.write(FAVOURITES_KEY, "[3]").unwrap();
    assert_eq!(storage.read(FAVOURITES_KEY).unwrap().as_deref(), Some("[3]"));
}

#[test]
fn test_file_storage_missing_record() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    assert!(storage.read(FAVOURITES_KEY).unwrap().is_none());
}

#[test]
fn test_file_storage_unwritable_location() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "file").unwrap();

    let mut store = FavouritesStore::open(Box::new(FileStorage::new(&blocker)));
    assert!(store.add(movie(1, "A")));
    assert!(!store.is_persistent());
    assert!(store.take_storage_warning().is_some());
}
