//! Favourite movies, persisted as one JSON record
//!
//! The list is kept in insertion order and is unique by movie id. Every
//! mutation rewrites the whole record. If the backing storage fails the store
//! keeps working from memory for the rest of the session and reports the
//! failure exactly once.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::models::MovieSummary;

/// Storage key of the favourites record
pub const FAVOURITES_KEY: &str = "favourite_movies";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable key/value storage for serialized records
pub trait Storage {
    /// `Ok(None)` when nothing has been stored under `key` yet
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Replace the record under `key`
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per record inside a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read { path: path.display().to_string(), source }),
        }
    }

    /// Writes a sibling temp file and renames it over the record, so an
    /// interrupted write leaves the previous record intact
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.record_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&tmp_path, value))
            .and_then(|_| fs::rename(&tmp_path, &path))
            .map_err(|source| {
                fs::remove_file(&tmp_path).ok();
                StorageError::Write { path: path.display().to_string(), source }
            })
    }
}

pub struct FavouritesStore {
    movies: Vec<MovieSummary>,
    ids: HashSet<i64>,
    /// None once storage has failed; the list then lives in memory only
    storage: Option<Box<dyn Storage>>,
    storage_warning: Option<String>,
}

impl FavouritesStore {
    /// Create the store and load any previously saved list
    pub fn open(storage: Box<dyn Storage>) -> Self {
        let mut store = Self {
            movies: Vec::new(),
            ids: HashSet::new(),
            storage: Some(storage),
            storage_warning: None,
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };

        let content = match storage.read(FAVOURITES_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => return,
            Err(e) => {
                self.degrade(e);
                return;
            }
        };

        match serde_json::from_str::<Vec<MovieSummary>>(&content) {
            Ok(saved) => {
                // Tolerate hand-edited records with repeated ids: first one wins
                for movie in saved {
                    if self.ids.insert(movie.id) {
                        self.movies.push(movie);
                    }
                }
                tracing::info!(count = self.movies.len(), "loaded favourites");
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored favourites are unreadable, starting empty");
            }
        }
    }

    fn save(&mut self) {
        let Some(storage) = self.storage.as_mut() else {
            return;
        };

        let result = serde_json::to_string(&self.movies)
            .map_err(|e| StorageError::Unavailable(e.to_string()))
            .and_then(|content| storage.write(FAVOURITES_KEY, &content));

        if let Err(e) = result {
            self.degrade(e);
        }
    }

    fn degrade(&mut self, error: StorageError) {
        tracing::warn!(error = %error, "favourites storage failed, keeping favourites in memory");
        self.storage = None;
        self.storage_warning = Some(format!(
            "Favourites can't be saved ({}); changes will be lost when the app closes.",
            error
        ));
    }

    /// Append `movie` unless one with the same id is already present.
    /// Returns true when the movie was newly added.
    pub fn add(&mut self, movie: MovieSummary) -> bool {
        if !self.ids.insert(movie.id) {
            return false;
        }
        self.movies.push(movie);
        self.save();
        true
    }

    /// Drop any entry with `id`. Always persists, even when nothing matched.
    pub fn remove(&mut self, id: i64) -> Option<MovieSummary> {
        let removed = if self.ids.remove(&id) {
            self.movies
                .iter()
                .position(|m| m.id == id)
                .map(|pos| self.movies.remove(pos))
        } else {
            None
        };
        self.save();
        removed
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn list(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    /// The storage failure message, handed out only the first time
    pub fn take_storage_warning(&mut self) -> Option<String> {
        self.storage_warning.take()
    }
}

#[cfg(test)]
#[path = "favourites_tests.rs"]
mod favourites_tests;
