use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One labelled photo: the image file plus the quantities we learn to predict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub filename: String,
    /// Total weight in kilograms.
    pub weight: f32,
    pub count: f32,
    #[serde(rename = "type")]
    pub bread_type: String,
}

impl CatalogRow {
    /// Resolve the row's image relative to the catalog's image directory.
    pub fn image_path(&self, image_dir: &Path) -> PathBuf {
        image_dir.join(&self.filename)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open catalog {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed catalog row {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

/// In-memory copy of the `filename,weight,count,type` table.
///
/// Rows are kept in file order. Nothing checks that the referenced images exist;
/// consumers find out when they open them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
}

impl Catalog {
    pub fn new(rows: Vec<CatalogRow>) -> Self {
        Self { rows }
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| CatalogError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_csv(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, CatalogError> {
        let mut rows = Vec::new();
        for (idx, record) in reader.deserialize::<CatalogRow>().enumerate() {
            // Header is line 1.
            let row = record.map_err(|source| CatalogError::Row {
                line: idx as u64 + 2,
                source,
            })?;
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogRow> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogRow;
    type IntoIter = std::slice::Iter<'a, CatalogRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
