//! Delimited-text source.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{TranslationError, TranslationResult};
use crate::progress::Progress;

use super::{is_blank, DataSource};

/// Options controlling how delimited text is tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter (default `,`).
    pub delimiter: u8,
    /// Quote character (default `"`).
    pub quote: u8,
    /// If `true`, the first record supplies column names and is not a row.
    ///
    /// When `false`, columns are named `att1`, `att2`, ... and the first record is data (or an
    /// annotation row, see [`crate::config::ConfigurationOptions::first_row_as_names`]).
    pub has_headers: bool,
    /// Trim surrounding whitespace from every field.
    pub trim: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            has_headers: true,
            trim: true,
        }
    }
}

#[derive(Debug, Clone)]
enum CsvOrigin {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

type BoxedReader = csv::Reader<Box<dyn Read + Send>>;

/// A [`DataSource`] over delimited text, read with the `csv` crate.
///
/// Path-backed sources re-open the file on every [`DataSource::reset`], so repeated passes never
/// hold the whole file in memory. Records shorter than the column count yield missing cells.
pub struct CsvSource {
    origin: CsvOrigin,
    options: CsvOptions,
    names: Vec<String>,
    reader: Option<BoxedReader>,
    current: Option<StringRecord>,
    lookahead: Option<StringRecord>,
    row: usize,
}

impl CsvSource {
    /// Open a delimited file.
    ///
    /// Returns [`TranslationError::SourceOpen`] if the file cannot be opened.
    pub fn from_path(path: impl AsRef<Path>, options: CsvOptions) -> TranslationResult<Self> {
        Self::open(CsvOrigin::Path(path.as_ref().to_path_buf()), options)
    }

    /// Read delimited text held in memory.
    pub fn from_text(text: impl Into<String>, options: CsvOptions) -> TranslationResult<Self> {
        let bytes: Arc<[u8]> = Arc::from(text.into().into_bytes());
        Self::open(CsvOrigin::Bytes(bytes), options)
    }

    fn open(origin: CsvOrigin, options: CsvOptions) -> TranslationResult<Self> {
        let mut source = Self {
            origin,
            options,
            names: Vec::new(),
            reader: None,
            current: None,
            lookahead: None,
            row: 0,
        };
        source.names = source.probe_names()?;
        source.reset(Progress::none())?;
        Ok(source)
    }

    fn open_reader(&self) -> TranslationResult<BoxedReader> {
        let input: Box<dyn Read + Send> = match &self.origin {
            CsvOrigin::Path(path) => {
                let file = File::open(path)
                    .map_err(|e| TranslationError::source_open(path.display().to_string(), e))?;
                Box::new(BufReader::new(file))
            }
            CsvOrigin::Bytes(bytes) => Box::new(Cursor::new(Arc::clone(bytes))),
        };
        Ok(ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(self.options.has_headers)
            .trim(if self.options.trim { Trim::All } else { Trim::None })
            .flexible(true)
            .from_reader(input))
    }

    fn probe_names(&self) -> TranslationResult<Vec<String>> {
        let mut rdr = self.open_reader()?;
        if self.options.has_headers {
            return Ok(rdr.headers()?.iter().map(str::to_string).collect());
        }
        let mut first = StringRecord::new();
        let width = if rdr.read_record(&mut first)? {
            first.len()
        } else {
            0
        };
        Ok((1..=width).map(|i| format!("att{i}")).collect())
    }

    fn fetch(&mut self) -> TranslationResult<Option<StringRecord>> {
        let Some(rdr) = self.reader.as_mut() else {
            return Ok(None);
        };
        let mut record = StringRecord::new();
        if rdr.read_record(&mut record)? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    fn cell(&self, col: usize) -> Option<&str> {
        self.current.as_ref()?.get(col)
    }
}

impl DataSource for CsvSource {
    fn source_id(&self) -> String {
        match &self.origin {
            CsvOrigin::Path(path) => path.display().to_string(),
            CsvOrigin::Bytes(bytes) => format!("csv text ({} bytes)", bytes.len()),
        }
    }

    fn reset(&mut self, _progress: Progress<'_>) -> TranslationResult<()> {
        self.reader = Some(self.open_reader()?);
        self.current = None;
        self.row = 0;
        self.lookahead = self.fetch()?;
        Ok(())
    }

    fn has_next(&self) -> bool {
        self.lookahead.is_some()
    }

    fn next(&mut self, progress: Progress<'_>) -> TranslationResult<()> {
        let Some(record) = self.lookahead.take() else {
            return Err(TranslationError::SourceExhausted { row: self.row });
        };
        self.current = Some(record);
        self.row += 1;
        progress.set_completed(self.row);
        self.lookahead = self.fetch()?;
        Ok(())
    }

    fn column_count(&self) -> usize {
        self.names.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn is_missing(&self, col: usize) -> bool {
        is_blank(self.cell(col))
    }

    fn get_string(&self, col: usize) -> Option<Cow<'_, str>> {
        self.cell(col).map(Cow::Borrowed)
    }

    fn close(&mut self) -> TranslationResult<()> {
        self.reader = None;
        self.current = None;
        self.lookahead = None;
        Ok(())
    }
}
