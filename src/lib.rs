//! `rust-data-translation` turns row-oriented tabular data from heterogeneous sources into one
//! uniformly-typed in-memory [`types::Dataset`].
//!
//! The engine has three stages:
//!
//! 1. a [`config::TranslationConfiguration`] is probed from a [`source::DataSource`] (column
//!    names, annotation rows) and refined by persisted overrides or edit commands;
//! 2. a [`guess::TypeGuesser`] infers a [`types::ValueType`] for every column still `Unknown`,
//!    widening along `Integer → Real → Date → Binominal → Polynominal`;
//! 3. a [`translate::Translator`] materializes the typed dataset, either fault-tolerantly
//!    (unparsable cells become missing) or strictly (the first bad cell aborts the read).
//!
//! The simplest entrypoint is [`import::import_from_path`], which runs all three stages on a
//! file and picks the format from its extension.
//!
//! ## What you can read
//!
//! - **Delimited text** ([`source::CsvSource`]): from a path or from in-memory text
//! - **Spreadsheets** ([`source::ExcelSource`], Cargo feature `excel`): `.xlsx`, `.xls`,
//!   `.xlsm`, `.xlsb`, `.ods`
//! - **Data frames and query results** ([`source::DataFrameSource`]): a Polars `DataFrame`, or
//!   with the default `sql` feature the result of a SQL query over registered frames
//! - **In-memory rows** ([`source::MemorySource`])
//!
//! ## Quick example: import a file
//!
//! ```no_run
//! use rust_data_translation::import::{import_from_path, ImportOptions};
//!
//! # fn main() -> Result<(), rust_data_translation::TranslationError> {
//! let ds = import_from_path("people.csv", &ImportOptions::default())?;
//! for attribute in &ds.attributes {
//!     println!("{}: {}", attribute.name, attribute.value_type);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Step by step: annotation rows, guessing and a fault-tolerant read
//!
//! ```rust
//! use rust_data_translation::config::{ConfigurationOptions, TranslationConfiguration};
//! use rust_data_translation::source::MemorySource;
//! use rust_data_translation::translate::{ReadOptions, Translator};
//! use rust_data_translation::types::{Value, ValueType};
//!
//! # fn main() -> Result<(), rust_data_translation::TranslationError> {
//! let source = MemorySource::from_strs(
//!     &["att1", "att2"],
//!     &[&["id", "score"], &["1", "0.5"], &["2", "n/a"], &["3", "1.5"]],
//! );
//! let translator = Translator::new(source);
//!
//! let options = ConfigurationOptions {
//!     first_row_as_names: true,
//!     ..Default::default()
//! };
//! let mut config = translator.configure(&options)?;
//! // The probe window counts the name row, so only "0.5" and "n/a" are seen: `score` is Binominal.
//! translator.guess_value_types(&mut config, 3, None)?;
//! assert_eq!(config.column(0).unwrap().value_type, ValueType::Integer);
//!
//! let config = config.apply(rust_data_translation::config::ColumnEdit::SetValueType {
//!     column: 1,
//!     value_type: ValueType::Real,
//! })?;
//! let ds = translator.read(&config, &ReadOptions::default(), None)?;
//! assert_eq!(ds.attribute_names().collect::<Vec<_>>(), vec!["id", "score"]);
//! assert_eq!(ds.rows[1][1], Value::Missing);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`source`]: the [`source::DataSource`] cursor contract and its adapters
//! - [`config`]: column metadata, annotation rows, persisted overrides, edit commands
//! - [`guess`]: value type inference
//! - [`translate`]: the [`translate::Translator`] and cancellation
//! - [`import`]: path-based one-call import
//! - [`types`]: the typed dataset
//! - [`observability`]: outcome observers and severities
//! - [`progress`]: progress listeners
//! - [`error`]: the error type shared by every stage
//!
//! ## Logging
//!
//! The crate emits `tracing` events (mostly at `debug`) and never installs a subscriber; attach
//! one in your binary to see them.

pub mod config;
pub mod date;
pub mod error;
pub mod guess;
pub mod import;
pub mod observability;
pub mod progress;
pub mod source;
pub mod translate;
pub mod types;

pub use error::{TranslationError, TranslationResult};
