use rust_data_translation::config::{ColumnEdit, ConfigurationOptions, TranslationConfiguration};
use rust_data_translation::guess::TypeGuesser;
use rust_data_translation::progress::Progress;
use rust_data_translation::source::MemorySource;
use rust_data_translation::translate::{CancellationToken, ReadOptions, Translator};
use rust_data_translation::types::{Value, ValueType};

fn names_first() -> ConfigurationOptions {
    ConfigurationOptions {
        first_row_as_names: true,
        ..Default::default()
    }
}

fn abc_source() -> MemorySource {
    MemorySource::from_strs(
        &["A", "B", "C"],
        &[
            &["Name1", "Name2", "Name3"],
            &["1", "x", "2024-01-01"],
            &["2", "y", "2024-01-02"],
            &["3", "x", "2024-01-03"],
            &["4", "y", "2024-01-04"],
            &["5", "x", "2024-01-05"],
        ],
    )
}

fn types_of(config: &TranslationConfiguration) -> Vec<ValueType> {
    config.columns().iter().map(|c| c.value_type).collect()
}

#[test]
fn name_row_integers_pairs_and_dates() {
    let translator = Translator::new(abc_source());
    let mut config = translator.configure(&names_first()).unwrap();

    let report = translator.guess_value_types(&mut config, 0, None).unwrap();
    assert_eq!(report.rows_scanned, 6);
    assert_eq!(
        types_of(&config),
        vec![ValueType::Integer, ValueType::Binominal, ValueType::Date]
    );

    let ds = translator.read(&config, &ReadOptions::default(), None).unwrap();
    assert_eq!(ds.row_count(), 5);
    assert_eq!(
        ds.attribute_names().collect::<Vec<_>>(),
        vec!["Name1", "Name2", "Name3"]
    );
    assert_eq!(ds.rows[0][0], Value::Integer(1));
    assert_eq!(
        ds.column_strings(1),
        vec![
            Some("x".to_string()),
            Some("y".to_string()),
            Some("x".to_string()),
            Some("y".to_string()),
            Some("x".to_string()),
        ]
    );
    assert!(matches!(ds.rows[4][2], Value::Timestamp(_)));
}

#[test]
fn name_row_is_not_a_value_for_guessing() {
    // Without the annotation the header text forces every column to a categorical type.
    let translator = Translator::new(abc_source());
    let mut config = translator
        .configure(&ConfigurationOptions::default())
        .unwrap();
    translator.guess_value_types(&mut config, 0, None).unwrap();
    assert_eq!(
        types_of(&config),
        vec![ValueType::Polynominal, ValueType::Polynominal, ValueType::Polynominal]
    );
}

#[test]
fn all_integer_column_stays_integer() {
    let mut src = MemorySource::from_strs(&["n"], &[&["10"], &["-3"], &[""], &["0"]]);
    let mut config = TranslationConfiguration::from_source(&src, &ConfigurationOptions::default());
    TypeGuesser::new(0)
        .guess(&mut config, &mut src, Progress::none(), &CancellationToken::new())
        .unwrap();
    assert_eq!(types_of(&config), vec![ValueType::Integer]);
}

#[test]
fn third_distinct_value_makes_polynominal_for_good() {
    let mut src = MemorySource::from_strs(
        &["s"],
        &[&["red"], &["blue"], &["green"], &["red"], &["blue"]],
    );
    let mut config = TranslationConfiguration::from_source(&src, &ConfigurationOptions::default());
    TypeGuesser::new(0)
        .guess(&mut config, &mut src, Progress::none(), &CancellationToken::new())
        .unwrap();
    assert_eq!(types_of(&config), vec![ValueType::Polynominal]);
}

#[test]
fn probe_window_decides_what_is_seen() {
    let rows: &[&[&str]] = &[&["1"], &["2"], &["2.5"], &["abc"]];

    let mut src = MemorySource::from_strs(&["v"], rows);
    let mut config = TranslationConfiguration::from_source(&src, &ConfigurationOptions::default());
    TypeGuesser::new(2)
        .guess(&mut config, &mut src, Progress::none(), &CancellationToken::new())
        .unwrap();
    assert_eq!(types_of(&config), vec![ValueType::Integer]);

    let mut config = TranslationConfiguration::from_source(&src, &ConfigurationOptions::default());
    TypeGuesser::new(3)
        .guess(&mut config, &mut src, Progress::none(), &CancellationToken::new())
        .unwrap();
    assert_eq!(types_of(&config), vec![ValueType::Real]);
}

#[test]
fn declared_types_are_left_alone() {
    let translator = Translator::new(MemorySource::from_strs(&["a", "b"], &[&["1", "2"]]));
    let config = translator
        .configure(&ConfigurationOptions::default())
        .unwrap()
        .apply(ColumnEdit::SetValueType {
            column: 0,
            value_type: ValueType::String,
        })
        .unwrap();
    let mut guessed = config.clone();
    let report = translator.guess_value_types(&mut guessed, 0, None).unwrap();
    assert_eq!(report.columns_guessed, 1);
    assert_eq!(types_of(&guessed), vec![ValueType::String, ValueType::Integer]);
    // the edit produced a new configuration; the original is untouched by guessing
    assert_eq!(types_of(&config), vec![ValueType::String, ValueType::Unknown]);
}

#[test]
fn custom_date_pattern_is_used_for_guessing() {
    let mut src = MemorySource::from_strs(&["d"], &[&["31.12.2020"], &["01.01.2021"]]);
    let options = ConfigurationOptions {
        date_pattern: "%d.%m.%Y".to_string(),
        ..Default::default()
    };
    let mut config = TranslationConfiguration::from_source(&src, &options);
    TypeGuesser::new(0)
        .guess(&mut config, &mut src, Progress::none(), &CancellationToken::new())
        .unwrap();
    assert_eq!(types_of(&config), vec![ValueType::Date]);
}
