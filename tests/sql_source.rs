#![cfg(feature = "sql")]

use polars::prelude::*;

use rust_data_translation::config::ConfigurationOptions;
use rust_data_translation::source::DataFrameSource;
use rust_data_translation::translate::{ReadOptions, Translator};
use rust_data_translation::types::{Value, ValueType};
use rust_data_translation::TranslationError;

fn orders() -> DataFrame {
    df!(
        "id" => &[1i64, 2, 3, 4],
        "customer" => &["ada", "grace", "ada", "linus"],
        "amount" => &[Some(10.5f64), Some(3.0), None, Some(7.25)],
    )
    .unwrap()
}

#[test]
fn query_result_is_translated_with_dtype_hints() {
    let source = DataFrameSource::from_sql(
        vec![("orders".to_string(), orders())],
        "SELECT id, customer, amount FROM orders WHERE customer <> 'linus' ORDER BY id",
    )
    .unwrap();
    let translator = Translator::new(source);
    let mut config = translator
        .configure(&ConfigurationOptions {
            trust_source_types: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(config.unknown_indices(), vec![1]);

    translator.guess_value_types(&mut config, 0, None).unwrap();
    assert_eq!(config.column(1).unwrap().value_type, ValueType::Binominal);

    let ds = translator.read(&config, &ReadOptions::strict(), None).unwrap();
    assert_eq!(ds.row_count(), 3);
    assert_eq!(
        ds.rows[0],
        vec![Value::Integer(1), Value::Nominal(0), Value::Real(10.5)]
    );
    assert_eq!(ds.rows[2][2], Value::Missing);
    assert_eq!(ds.display_value(1, 1).as_deref(), Some("grace"));
}

#[test]
fn invalid_query_is_a_source_open_error() {
    let err = DataFrameSource::from_sql(
        vec![("orders".to_string(), orders())],
        "SELECT nope FROM missing_table",
    )
    .err()
    .unwrap();
    assert!(matches!(err, TranslationError::SourceOpen { .. }));
}
