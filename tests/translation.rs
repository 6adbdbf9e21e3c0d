use std::sync::{Arc, Mutex};

use rust_data_translation::config::{
    AnnotationKind, ColumnEdit, ConfigurationOptions, TranslationConfiguration,
};
use rust_data_translation::observability::{
    ParseIssue, TranslationContext, TranslationObserver, TranslationSeverity, TranslationStats,
};
use polars::prelude::df;

use rust_data_translation::source::{DataFrameSource, MemorySource};
use rust_data_translation::translate::{ReadOptions, Translator};
use rust_data_translation::types::{Role, Value, ValueType};
use rust_data_translation::TranslationError;

#[derive(Default)]
struct RecordingObserver {
    issues: Mutex<Vec<ParseIssue>>,
    successes: Mutex<Vec<TranslationStats>>,
    failures: Mutex<Vec<TranslationSeverity>>,
    alerts: Mutex<Vec<TranslationSeverity>>,
}

impl TranslationObserver for RecordingObserver {
    fn on_success(&self, _ctx: &TranslationContext, stats: TranslationStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(
        &self,
        _ctx: &TranslationContext,
        severity: TranslationSeverity,
        _error: &TranslationError,
    ) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(
        &self,
        _ctx: &TranslationContext,
        severity: TranslationSeverity,
        _error: &TranslationError,
    ) {
        self.alerts.lock().unwrap().push(severity);
    }

    fn on_unparsable(&self, _ctx: &TranslationContext, issue: &ParseIssue) {
        self.issues.lock().unwrap().push(issue.clone());
    }
}

fn integer_column(values: &[&str]) -> (Translator<MemorySource>, TranslationConfiguration) {
    let rows: Vec<&[&str]> = values.iter().map(std::slice::from_ref).collect();
    let translator = Translator::new(MemorySource::from_strs(&["v"], &rows));
    let config = translator
        .configure(&ConfigurationOptions::default())
        .unwrap()
        .apply(ColumnEdit::SetValueType {
            column: 0,
            value_type: ValueType::Integer,
        })
        .unwrap();
    (translator, config)
}

#[test]
fn tolerant_read_stores_bad_cells_as_missing() {
    let (translator, config) = integer_column(&["1", "2", "bad", "4"]);
    let obs = Arc::new(RecordingObserver::default());
    let opts = ReadOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    let ds = translator.read(&config, &opts, None).unwrap();
    let values: Vec<Value> = ds.rows.iter().map(|r| r[0].clone()).collect();
    assert_eq!(
        values,
        vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Missing,
            Value::Integer(4)
        ]
    );

    let issues = obs.issues.lock().unwrap().clone();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].row, 2);
    assert_eq!(issues[0].raw, "bad");
    assert_eq!(issues[0].column, "v");

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![TranslationStats {
            rows: 4,
            annotation_rows: 0,
            unparsable_cells: 1
        }]
    );
}

#[test]
fn strict_read_aborts_on_first_bad_cell() {
    let (translator, config) = integer_column(&["1", "oops", "bad", "4"]);
    let obs = Arc::new(RecordingObserver::default());
    let opts = ReadOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: TranslationSeverity::Error,
        ..ReadOptions::strict()
    };

    let err = translator.read(&config, &opts, None).unwrap_err();
    match err {
        TranslationError::UnparsableValue {
            row, column, raw, ..
        } => {
            assert_eq!(row, 1);
            assert_eq!(column, "v");
            assert_eq!(raw, "oops");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        obs.failures.lock().unwrap().clone(),
        vec![TranslationSeverity::Error]
    );
    assert_eq!(
        obs.alerts.lock().unwrap().clone(),
        vec![TranslationSeverity::Error]
    );
    assert!(obs.issues.lock().unwrap().is_empty());

    // the translator is back to idle and can read again
    let ds = translator.read(&config, &ReadOptions::default(), None).unwrap();
    assert_eq!(ds.row_count(), 4);
}

#[test]
fn annotation_rows_are_never_materialized() {
    let source = MemorySource::from_strs(
        &["c1", "c2", "c3"],
        &[
            &["weight", "", "label"],
            &["kg", "cm", ""],
            &["1", "2", "a"],
            &["3", "4", "b"],
        ],
    );
    let total_rows = source.row_count();
    let translator = Translator::new(source);
    let options = ConfigurationOptions {
        annotations: vec![
            (0, AnnotationKind::Name),
            (1, AnnotationKind::Custom("Unit".to_string())),
        ],
        ..Default::default()
    };
    let mut config = translator.configure(&options).unwrap();
    translator.guess_value_types(&mut config, 0, None).unwrap();

    let ds = translator.read(&config, &ReadOptions::default(), None).unwrap();
    assert_eq!(ds.row_count(), total_rows - 2);
    // an empty name cell keeps the source name
    assert_eq!(
        ds.attribute_names().collect::<Vec<_>>(),
        vec!["weight", "c2", "label"]
    );
    assert_eq!(ds.attributes[0].annotations.get("Unit").map(String::as_str), Some("kg"));
    assert_eq!(ds.attributes[1].annotations.get("Unit").map(String::as_str), Some("cm"));
    // a blank custom annotation cell still attaches the key
    assert_eq!(ds.attributes[2].annotations.get("Unit").map(String::as_str), Some(""));
    assert_eq!(ds.attributes[0].value_type, ValueType::Integer);
    assert_eq!(ds.rows[0][0], Value::Integer(1));
}

#[test]
fn name_row_renames_only_selected_columns() {
    let translator = Translator::new(MemorySource::from_strs(
        &["a", "b", "c"],
        &[&["first", "second", "third"], &["1", "2", "3"]],
    ));
    let config = translator
        .configure(&ConfigurationOptions {
            first_row_as_names: true,
            ..Default::default()
        })
        .unwrap()
        .apply(ColumnEdit::SetSelected {
            column: 1,
            selected: false,
        })
        .unwrap();

    let ds = translator.read(&config, &ReadOptions::default(), None).unwrap();
    assert_eq!(
        ds.attribute_names().collect::<Vec<_>>(),
        vec!["first", "third"]
    );
    assert_eq!(ds.rows, vec![vec![Value::Nominal(0), Value::Nominal(0)]]);
    assert_eq!(ds.display_value(0, 1).as_deref(), Some("3"));
}

#[test]
fn max_rows_counts_source_rows() {
    let source = MemorySource::from_strs(
        &["n"],
        &[&["header"], &["1"], &["2"], &["3"], &["4"]],
    );
    let translator = Translator::new(source);
    let mut config = translator
        .configure(&ConfigurationOptions {
            first_row_as_names: true,
            ..Default::default()
        })
        .unwrap();
    translator.guess_value_types(&mut config, 0, None).unwrap();

    let limited = ReadOptions {
        max_rows: Some(3),
        ..Default::default()
    };
    assert_eq!(translator.read(&config, &limited, None).unwrap().row_count(), 2);

    for unlimited in [None, Some(0)] {
        let opts = ReadOptions {
            max_rows: unlimited,
            ..Default::default()
        };
        assert_eq!(translator.read(&config, &opts, None).unwrap().row_count(), 4);
    }
}

#[test]
fn user_names_and_roles_apply_after_the_read() {
    let translator = Translator::new(MemorySource::from_strs(
        &["a", "b", "c"],
        &[&["Alpha", "Beta", "Gamma"], &["1", "x", "y"]],
    ));
    let config = translator
        .configure(&ConfigurationOptions {
            first_row_as_names: true,
            ..Default::default()
        })
        .unwrap();
    let edits = [
        ColumnEdit::Rename {
            column: 0,
            name: "id".to_string(),
        },
        ColumnEdit::SetRole {
            column: 0,
            role: Role::Id,
        },
        ColumnEdit::SetRole {
            column: 1,
            role: Role::Label,
        },
        ColumnEdit::SetRole {
            column: 2,
            role: Role::Label,
        },
    ];
    let config = edits
        .into_iter()
        .try_fold(config, |c, edit| c.apply(edit))
        .unwrap();

    let ds = translator.read(&config, &ReadOptions::default(), None).unwrap();
    assert_eq!(
        ds.attribute_names().collect::<Vec<_>>(),
        vec!["id", "Beta", "Gamma"]
    );
    assert_eq!(ds.special(&Role::Id).map(|a| a.name.as_str()), Some("id"));
    // the later attribute keeps a duplicated special role
    assert_eq!(ds.special(&Role::Label).map(|a| a.name.as_str()), Some("Gamma"));
    assert_eq!(ds.attributes[1].role, Role::Regular);
}

#[test]
fn unknown_types_finalize_to_polynominal() {
    let translator = Translator::new(MemorySource::from_strs(&["v"], &[&["1"], &["2"]]));
    let config = translator
        .configure(&ConfigurationOptions::default())
        .unwrap();
    let ds = translator.read(&config, &ReadOptions::default(), None).unwrap();
    assert_eq!(ds.attributes[0].value_type, ValueType::Polynominal);
    assert_eq!(
        ds.column_strings(0),
        vec![Some("1".to_string()), Some("2".to_string())]
    );
}

#[test]
fn binominal_overflow_is_a_coercion_failure() {
    let translator = Translator::new(MemorySource::from_strs(
        &["s"],
        &[&["a"], &["b"], &["c"]],
    ));
    let config = translator
        .configure(&ConfigurationOptions::default())
        .unwrap()
        .apply(ColumnEdit::SetValueType {
            column: 0,
            value_type: ValueType::Binominal,
        })
        .unwrap();

    let ds = translator.read(&config, &ReadOptions::default(), None).unwrap();
    assert_eq!(ds.rows[2][0], Value::Missing);

    let err = translator
        .read(&config, &ReadOptions::strict(), None)
        .unwrap_err();
    assert!(matches!(err, TranslationError::UnparsableValue { row: 2, .. }));
}

#[test]
fn closed_translator_rejects_reads() {
    let (translator, config) = integer_column(&["1"]);
    translator.close().unwrap();
    assert!(translator.is_closed());
    assert!(matches!(
        translator.read(&config, &ReadOptions::default(), None),
        Err(TranslationError::Closed)
    ));
    assert!(matches!(
        translator.configure(&ConfigurationOptions::default()),
        Err(TranslationError::Closed)
    ));
    // closing again is a no-op
    translator.close().unwrap();
}

#[test]
fn whole_floats_beyond_i64_widen_to_real() {
    let frame = df!("v" => &[1.0f64, 1e20]).unwrap();
    let translator = Translator::new(DataFrameSource::new("frame", frame));
    let mut config = translator.configure(&ConfigurationOptions::default()).unwrap();
    translator.guess_value_types(&mut config, 0, None).unwrap();
    assert_eq!(config.column(0).unwrap().value_type, ValueType::Real);

    let ds = translator.read(&config, &ReadOptions::strict(), None).unwrap();
    assert_eq!(ds.rows[0][0], Value::Real(1.0));
    assert_eq!(ds.rows[1][0], Value::Real(1e20));
}
