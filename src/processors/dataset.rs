//! In-memory CSV dataset with a named text column

use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};

/// Ordered table loaded fully into memory
///
/// The row index of a record is its 0-based position after the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset, checking that every row matches the header width
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(TranslationError::MalformedRow {
                row_index: index,
                expected: headers.len(),
                got: row.len(),
            });
        }

        Ok(Self { headers, rows })
    }

    /// Load a delimited file with a header row; `.tsv` files are tab-separated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let dataset = Self::from_reader_with_delimiter(file, delimiter_for(path))?;
        info!("Loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Read comma-separated values with a header row from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_delimiter(reader, b',')
    }

    pub fn from_reader_with_delimiter<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TranslationError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Values of a column in row order
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// Append a column, or replace its values if it already exists
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(TranslationError::RowCountMismatch {
                expected: self.rows.len(),
                got: values.len(),
            });
        }

        match self.column_index(name) {
            Ok(index) => {
                debug!("Replacing existing column {}", name);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            Err(_) => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }

        Ok(())
    }

    /// Write the table with its header and no row-number column
    ///
    /// The delimiter follows the extension of `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::File::create(path).map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.to_writer_with_delimiter(file, delimiter_for(path))?;

        info!("Saved {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Write comma-separated values to any writer
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        self.to_writer_with_delimiter(writer, b',')
    }

    pub fn to_writer_with_delimiter<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Tab for `.tsv`/`.tab` files, comma otherwise
pub fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}
