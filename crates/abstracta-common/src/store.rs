//! On-disk table store.
//!
//! Two JSON tables (author-level and journal-level publications) live in the
//! data directory and are overwritten wholesale at every stage boundary.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{AbstractaError, Result};
use crate::models::Publication;
use crate::settings::{OnExisting, Settings};

#[derive(Debug, Clone)]
pub struct DataStore {
    author_file: PathBuf,
    journal_file: PathBuf,
}

impl DataStore {
    pub fn new(author_file: impl Into<PathBuf>, journal_file: impl Into<PathBuf>) -> Self {
        Self {
            author_file: author_file.into(),
            journal_file: journal_file.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.author_data_file(), settings.journal_data_file())
    }

    pub fn author_file(&self) -> &Path {
        &self.author_file
    }

    pub fn journal_file(&self) -> &Path {
        &self.journal_file
    }

    /// Load both tables; fails if either file is missing.
    pub fn load_tables(&self) -> Result<(Vec<Publication>, Vec<Publication>)> {
        let authors = read_table(&self.author_file)?;
        let journals = read_table(&self.journal_file)?;
        Ok((authors, journals))
    }

    pub fn load_journal_table(&self) -> Result<Vec<Publication>> {
        read_table(&self.journal_file)
    }

    pub fn save_tables(&self, authors: &[Publication], journals: &[Publication]) -> Result<()> {
        write_table(&self.author_file, authors)?;
        write_table(&self.journal_file, journals)?;
        info!(
            authors = authors.len(),
            journals = journals.len(),
            "Data files saved"
        );
        Ok(())
    }
}

/// Decide whether a stage may (re)write `path` under the given policy.
///
/// Returns `Ok(false)` when the existing file should be reused.
pub fn should_write(path: &Path, policy: OnExisting) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    match policy {
        OnExisting::Overwrite => {
            info!(path = %path.display(), "Overwriting existing data file");
            Ok(true)
        }
        OnExisting::Reuse => {
            warn!(path = %path.display(), "Data file exists; reusing it");
            Ok(false)
        }
        OnExisting::Fail => Err(AbstractaError::AlreadyExists(path.display().to_string())),
    }
}

pub fn read_table(path: &Path) -> Result<Vec<Publication>> {
    if !path.exists() {
        return Err(AbstractaError::MissingDataFile(path.display().to_string()));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_table(path: &Path, rows: &[Publication]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, rows)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScholarName;
    use pretty_assertions::assert_eq;

    fn sample_rows() -> Vec<Publication> {
        let mut a = Publication::new("10.1/a", "Alpha", "J1");
        a.author = Some(ScholarName::new("Ada", "Lovelace"));
        a.abstract_text = Some("An abstract.".into());
        a.pub_year = Some(2021);
        let b = Publication::new("10.1/b", "Beta", "J2");
        vec![a, b]
    }

    #[test]
    fn test_save_then_load_tables() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("a.json"), dir.path().join("j.json"));
        let rows = sample_rows();
        store.save_tables(&rows, &rows[1..]).unwrap();
        let (authors, journals) = store.load_tables().unwrap();
        assert_eq!(authors, rows);
        assert_eq!(journals, rows[1..].to_vec());
    }

    #[test]
    fn test_load_missing_table_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("a.json"), dir.path().join("j.json"));
        assert!(matches!(store.load_tables(), Err(AbstractaError::MissingDataFile(_))));
    }

    #[test]
    fn test_should_write_policies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        assert!(should_write(&path, OnExisting::Fail).unwrap());

        write_table(&path, &sample_rows()).unwrap();
        assert!(should_write(&path, OnExisting::Overwrite).unwrap());
        assert!(!should_write(&path, OnExisting::Reuse).unwrap());
        assert!(matches!(
            should_write(&path, OnExisting::Fail),
            Err(AbstractaError::AlreadyExists(_))
        ));
    }
}
