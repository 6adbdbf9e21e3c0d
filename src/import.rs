//! One-call import of a file into a [`Dataset`].
//!
//! [`import_from_path`] wires the pieces together the way an import dialog would: open a
//! [`DataSource`] for the file, probe a [`TranslationConfiguration`], apply persisted
//! [`ColumnOverride`]s, guess the remaining `Unknown` types, then read.
//!
//! - If [`ImportOptions::format`] is `None`, the format is inferred from the file extension.
//! - Excel workbooks require the Cargo feature `excel`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{ColumnOverride, ConfigurationOptions, TranslationConfiguration};
use crate::error::{TranslationError, TranslationResult};
use crate::progress::ProgressListener;
use crate::source::{CsvOptions, CsvSource, DataSource};
use crate::translate::{ReadOptions, Translator};
use crate::types::Dataset;

/// Default probe window used by [`ImportOptions::default`].
pub const DEFAULT_PROBE_ROWS: usize = 100;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Delimited text, tokenized with [`ImportOptions::csv`].
    Csv,
    /// Tab-separated text: [`ImportOptions::csv`] with the delimiter forced to `\t`.
    Tsv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl ImportFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Options controlling [`import_from_path`].
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<ImportFormat>,
    /// Tokenizer options for delimited text.
    pub csv: CsvOptions,
    /// Worksheet to read; `None` reads the first sheet.
    pub excel_sheet: Option<String>,
    /// Whether the first non-empty worksheet row holds column names.
    pub excel_has_headers: bool,
    /// Probe options for the initial configuration.
    pub configuration: ConfigurationOptions,
    /// Persisted per-column overrides applied after probing.
    pub overrides: Vec<ColumnOverride>,
    /// Rows inspected by the type guesser (`0` scans the whole file).
    pub max_probe_rows: usize,
    /// Options for the final read.
    pub read: ReadOptions,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            format: None,
            csv: CsvOptions::default(),
            excel_sheet: None,
            excel_has_headers: true,
            configuration: ConfigurationOptions::default(),
            overrides: Vec::new(),
            max_probe_rows: DEFAULT_PROBE_ROWS,
            read: ReadOptions::default(),
        }
    }
}

/// Import a file into a typed [`Dataset`].
///
/// Columns fixed by `options.overrides` keep their type; every other column is guessed from the
/// first `options.max_probe_rows` rows.
///
/// # Examples
///
/// ```no_run
/// use rust_data_translation::import::{import_from_path, ImportOptions};
///
/// # fn main() -> Result<(), rust_data_translation::TranslationError> {
/// let ds = import_from_path("people.csv", &ImportOptions::default())?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
///
/// ## Strict read with a persisted override
///
/// ```no_run
/// use rust_data_translation::config::ColumnOverride;
/// use rust_data_translation::import::{import_from_path, ImportOptions};
/// use rust_data_translation::translate::ReadOptions;
///
/// # fn main() -> Result<(), rust_data_translation::TranslationError> {
/// let overrides = ColumnOverride::parse_parameter_list(&[(
///     "0".to_string(),
///     "id.true.integer.id".to_string(),
/// )])?;
/// let opts = ImportOptions {
///     overrides,
///     read: ReadOptions::strict(),
///     ..Default::default()
/// };
/// let ds = import_from_path("people.csv", &opts)?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn import_from_path(path: impl AsRef<Path>, options: &ImportOptions) -> TranslationResult<Dataset> {
    import_with_progress(path, options, None)
}

/// Like [`import_from_path`], reporting guessing and reading progress to `listener`.
pub fn import_with_progress(
    path: impl AsRef<Path>,
    options: &ImportOptions,
    listener: Option<&dyn ProgressListener>,
) -> TranslationResult<Dataset> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };
    tracing::debug!(path = %path.display(), ?format, "importing");

    let source = open_source(path, format, options)?;
    let translator = Translator::new(source);

    let result = run_import(&translator, options, listener);
    let closed = translator.close();
    let dataset = result?;
    closed?;
    Ok(dataset)
}

fn run_import<S: DataSource>(
    translator: &Translator<S>,
    options: &ImportOptions,
    listener: Option<&dyn ProgressListener>,
) -> TranslationResult<Dataset> {
    let mut config = translator
        .configure(&options.configuration)?
        .with_overrides(&options.overrides)?;
    translator.guess_value_types(&mut config, options.max_probe_rows, listener)?;
    translator.read(&config, &options.read, listener)
}

/// Build the probe-time configuration for a file without reading it.
pub fn configure_from_path(
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> TranslationResult<TranslationConfiguration> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };
    let mut source = open_source(path, format, options)?;
    let config = TranslationConfiguration::from_source(&source, &options.configuration)
        .with_overrides(&options.overrides);
    source.close()?;
    config
}

/// Infer the import format from a path's extension.
pub fn infer_format_from_path(path: &Path) -> TranslationResult<ImportFormat> {
    let ext = path.extension().and_then(|s| s.to_str()).ok_or_else(|| {
        TranslationError::configuration(format!(
            "cannot infer format: path has no extension ({})",
            path.display()
        ))
    })?;

    ImportFormat::from_extension(ext).ok_or_else(|| {
        TranslationError::configuration(format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ))
    })
}

fn open_source(
    path: &Path,
    format: ImportFormat,
    options: &ImportOptions,
) -> TranslationResult<Box<dyn DataSource>> {
    match format {
        ImportFormat::Csv => Ok(Box::new(CsvSource::from_path(path, options.csv.clone())?)),
        ImportFormat::Tsv => {
            let csv = CsvOptions {
                delimiter: b'\t',
                ..options.csv.clone()
            };
            Ok(Box::new(CsvSource::from_path(path, csv)?))
        }
        ImportFormat::Excel => open_excel(path, options),
    }
}

fn open_excel(path: &Path, options: &ImportOptions) -> TranslationResult<Box<dyn DataSource>> {
    #[cfg(feature = "excel")]
    {
        use crate::source::{ExcelOptions, ExcelSource};

        let excel = ExcelOptions {
            sheet: options.excel_sheet.clone(),
            has_headers: options.excel_has_headers,
        };
        Ok(Box::new(ExcelSource::from_path(path, &excel)?))
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = options;
        Err(TranslationError::source_open(
            path.display().to_string(),
            "excel import not enabled (enable cargo feature 'excel')",
        ))
    }
}

/// Owned import request, e.g. for a job queue.
#[derive(Clone)]
pub struct ImportRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Options controlling the import.
    pub options: ImportOptions,
}

impl fmt::Debug for ImportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportRequest")
            .field("path", &self.path)
            .field("overrides", &self.options.overrides.len())
            .field("options", &self.options)
            .finish()
    }
}

impl ImportRequest {
    /// Execute the request by calling [`import_from_path`].
    pub fn run(&self) -> TranslationResult<Dataset> {
        import_from_path(&self.path, &self.options)
    }
}
