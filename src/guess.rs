//! Value type inference over a bounded probe window.
//!
//! Every column whose type is still [`ValueType::Unknown`] gets an independent [`ColumnGuess`]
//! that starts at [`GuessState::Integer`] and only ever widens:
//!
//! | state        | accepts a cell when                                   | on failure    |
//! |--------------|-------------------------------------------------------|---------------|
//! | `Integer`    | it parses as an integer                               | `Real`        |
//! | `Real`       | it parses as a floating point number                  | `Date`        |
//! | `Date`       | it parses with the configured date pattern            | `Binominal`   |
//! | `Binominal`  | it is one of at most two distinct strings seen so far | `Polynominal` |
//! | `Polynominal`| always                                                | (absorbing)   |
//!
//! After a failure the same cell is re-validated against the next state. Missing cells never
//! cause widening, and annotation rows are skipped.

use crate::config::TranslationConfiguration;
use crate::date::DateFormat;
use crate::error::TranslationResult;
use crate::progress::Progress;
use crate::source::DataSource;
use crate::translate::CancellationToken;
use crate::types::ValueType;

/// A type hypothesis in the widening order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GuessState {
    Integer,
    Real,
    Date,
    Binominal,
    Polynominal,
}

/// State entered when the current state rejects a cell.
const ON_FAILURE: [(GuessState, GuessState); 4] = [
    (GuessState::Integer, GuessState::Real),
    (GuessState::Real, GuessState::Date),
    (GuessState::Date, GuessState::Binominal),
    (GuessState::Binominal, GuessState::Polynominal),
];

impl GuessState {
    pub const INITIAL: GuessState = GuessState::Integer;

    /// Next state after a failed validation. `Polynominal` maps to itself.
    pub fn on_failure(self) -> GuessState {
        ON_FAILURE
            .iter()
            .find(|(from, _)| *from == self)
            .map_or(GuessState::Polynominal, |(_, to)| *to)
    }

    pub fn is_terminal(self) -> bool {
        self == GuessState::Polynominal
    }

    pub fn value_type(self) -> ValueType {
        match self {
            GuessState::Integer => ValueType::Integer,
            GuessState::Real => ValueType::Real,
            GuessState::Date => ValueType::Date,
            GuessState::Binominal => ValueType::Binominal,
            GuessState::Polynominal => ValueType::Polynominal,
        }
    }

    /// Position of a value type in the widening order, if it is part of it.
    pub fn from_value_type(value_type: ValueType) -> Option<GuessState> {
        match value_type {
            ValueType::Integer => Some(GuessState::Integer),
            ValueType::Real => Some(GuessState::Real),
            ValueType::Date => Some(GuessState::Date),
            ValueType::Binominal => Some(GuessState::Binominal),
            ValueType::Polynominal => Some(GuessState::Polynominal),
            _ => None,
        }
    }
}

/// Up to two distinct strings, plus a sentinel set once a third one was offered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinctPair {
    slots: [Option<String>; 2],
    overflowed: bool,
}

impl DistinctPair {
    /// Record `value` if it is new and a slot is free.
    ///
    /// Returns `false` once more than two distinct values were offered; stays `false` afterwards.
    pub fn offer(&mut self, value: &str) -> bool {
        if self.overflowed {
            return false;
        }
        for slot in &mut self.slots {
            match slot {
                Some(seen) if seen == value => return true,
                Some(_) => {}
                None => {
                    *slot = Some(value.to_string());
                    return true;
                }
            }
        }
        self.overflowed = true;
        false
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().flatten().map(String::as_str)
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }
}

/// Working state of one guessed column.
#[derive(Debug, Clone)]
pub struct ColumnGuess {
    pub column: usize,
    state: GuessState,
    seen: DistinctPair,
}

impl ColumnGuess {
    pub fn new(column: usize) -> Self {
        Self {
            column,
            state: GuessState::INITIAL,
            seen: DistinctPair::default(),
        }
    }

    pub fn state(&self) -> GuessState {
        self.state
    }

    /// Validate the current row's cell, widening until some state accepts it.
    pub fn observe<S: DataSource + ?Sized>(&mut self, source: &S, format: &DateFormat) {
        while !self.accepts(source, format) {
            self.state = self.state.on_failure();
        }
    }

    fn accepts<S: DataSource + ?Sized>(&mut self, source: &S, format: &DateFormat) -> bool {
        let col = self.column;
        match self.state {
            GuessState::Integer => source.get_integer(col).is_some(),
            GuessState::Real => source.get_number(col).is_some(),
            GuessState::Date => source.get_date(col, format).is_some(),
            GuessState::Binominal => source
                .get_string(col)
                .is_some_and(|value| self.seen.offer(&value)),
            GuessState::Polynominal => true,
        }
    }
}

/// Outcome of one guessing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessReport {
    /// Source rows consumed, annotation rows included.
    pub rows_scanned: usize,
    /// Number of columns whose type was written back.
    pub columns_guessed: usize,
    /// The pass stopped early because cancellation was requested.
    pub cancelled: bool,
}

/// Infers value types for columns that are still [`ValueType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeGuesser {
    max_probe_rows: usize,
}

impl TypeGuesser {
    /// `max_probe_rows == 0` scans the whole source.
    pub fn new(max_probe_rows: usize) -> Self {
        Self { max_probe_rows }
    }

    pub fn max_probe_rows(&self) -> usize {
        self.max_probe_rows
    }

    /// Run one guessing pass and write the hypotheses back into `config`.
    ///
    /// Per-value validation failures are never errors; only source errors are returned. If
    /// `cancel` fires, the hypotheses gathered so far are still written back.
    pub fn guess<S: DataSource + ?Sized>(
        &self,
        config: &mut TranslationConfiguration,
        source: &mut S,
        progress: Progress<'_>,
        cancel: &CancellationToken,
    ) -> TranslationResult<GuessReport> {
        let mut guesses: Vec<ColumnGuess> = config
            .unknown_indices()
            .into_iter()
            .filter(|&col| col < source.column_count())
            .map(ColumnGuess::new)
            .collect();
        let mut report = GuessReport::default();
        if guesses.is_empty() {
            tracing::debug!("no columns of unknown type; skipping guessing pass");
            return Ok(report);
        }

        let format = config.date_format().clone();
        source.reset(progress)?;
        if self.max_probe_rows > 0 {
            progress.set_total(self.max_probe_rows);
        }

        let mut row = 0usize;
        while source.has_next() && (self.max_probe_rows == 0 || row < self.max_probe_rows) {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            source.next(progress)?;
            if config.annotation(row).is_none() {
                for guess in guesses.iter_mut().filter(|g| !g.state.is_terminal()) {
                    if !source.is_missing(guess.column) {
                        guess.observe(&*source, &format);
                    }
                }
            }
            row += 1;
            if guesses.iter().all(|g| g.state.is_terminal()) {
                break;
            }
        }
        report.rows_scanned = row;

        for guess in &guesses {
            if let Some(column) = config.column_mut(guess.column) {
                column.value_type = guess.state.value_type();
            }
        }
        report.columns_guessed = guesses.len();

        tracing::debug!(
            rows = report.rows_scanned,
            columns = report.columns_guessed,
            cancelled = report.cancelled,
            "value types guessed"
        );
        progress.complete();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnGuess, DistinctPair, GuessState, TypeGuesser};
    use crate::config::{ConfigurationOptions, TranslationConfiguration};
    use crate::date::DateFormat;
    use crate::progress::Progress;
    use crate::source::{DataSource, MemorySource};
    use crate::translate::CancellationToken;
    use crate::types::ValueType;

    #[test]
    fn transition_table_walks_the_lattice() {
        let mut s = GuessState::INITIAL;
        let mut seen = vec![s];
        while !s.is_terminal() {
            let next = s.on_failure();
            assert!(next > s);
            s = next;
            seen.push(s);
        }
        assert_eq!(
            seen,
            vec![
                GuessState::Integer,
                GuessState::Real,
                GuessState::Date,
                GuessState::Binominal,
                GuessState::Polynominal
            ]
        );
        assert_eq!(GuessState::Polynominal.on_failure(), GuessState::Polynominal);
    }

    #[test]
    fn distinct_pair_overflow_is_sticky() {
        let mut pair = DistinctPair::default();
        assert!(pair.offer("x"));
        assert!(pair.offer("y"));
        assert!(pair.offer("x"));
        assert!(!pair.offer("z"));
        assert!(pair.is_overflowed());
        assert!(!pair.offer("x"));
        assert_eq!(pair.values().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    fn observe_all(values: &[&str]) -> GuessState {
        let rows: Vec<&[&str]> = values.iter().map(std::slice::from_ref).collect();
        let mut src = MemorySource::from_strs(&["v"], &rows);
        src.reset(Progress::none()).unwrap();
        let mut guess = ColumnGuess::new(0);
        while src.has_next() {
            src.next(Progress::none()).unwrap();
            if !src.is_missing(0) {
                guess.observe(&src, &DateFormat::default());
            }
        }
        guess.state()
    }

    #[test]
    fn failed_value_is_revalidated_against_next_state() {
        assert_eq!(observe_all(&["1", "2"]), GuessState::Integer);
        assert_eq!(observe_all(&["1", "2.5"]), GuessState::Real);
        assert_eq!(observe_all(&["2024-01-01", "2024-01-02"]), GuessState::Date);
        assert_eq!(observe_all(&["2024-01-01", "x"]), GuessState::Binominal);
        assert_eq!(observe_all(&["a", "b", "c"]), GuessState::Polynominal);
        assert_eq!(observe_all(&["a", "", "b"]), GuessState::Binominal);
    }

    #[test]
    fn numbers_after_binominal_do_not_narrow() {
        assert_eq!(observe_all(&["yes", "1", "2"]), GuessState::Polynominal);
        assert_eq!(observe_all(&["yes", "1", "1"]), GuessState::Binominal);
    }

    #[test]
    fn probe_window_limits_rows_and_skips_known_columns() {
        let mut src = MemorySource::from_strs(
            &["a", "b"],
            &[&["1", "x"], &["2", "y"], &["3.5", "z"]],
        );
        let mut config = TranslationConfiguration::from_source(&src, &ConfigurationOptions::default())
            .apply(crate::config::ColumnEdit::SetValueType {
                column: 1,
                value_type: ValueType::String,
            })
            .unwrap();
        let report = TypeGuesser::new(2)
            .guess(&mut config, &mut src, Progress::none(), &CancellationToken::new())
            .unwrap();
        assert_eq!(report.rows_scanned, 2);
        assert_eq!(report.columns_guessed, 1);
        assert_eq!(config.column(0).unwrap().value_type, ValueType::Integer);
        assert_eq!(config.column(1).unwrap().value_type, ValueType::String);
    }

    #[test]
    fn cancelled_pass_still_writes_back() {
        let mut src = MemorySource::from_strs(&["a"], &[&["1"], &["x"]]);
        let mut config =
            TranslationConfiguration::from_source(&src, &ConfigurationOptions::default());
        let token = CancellationToken::new();
        token.cancel();
        let report = TypeGuesser::new(0)
            .guess(&mut config, &mut src, Progress::none(), &token)
            .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.rows_scanned, 0);
        assert_eq!(config.column(0).unwrap().value_type, ValueType::Integer);
    }
}
