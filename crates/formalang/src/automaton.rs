//! Deterministic finite automata described as a state×symbol transition
//! table, plus the sentence recognizer.

use crate::types::{Map, Set};
use std::fmt;

/// A finite-state machine as a grid: one row per state, one column per input
/// symbol, each cell holding the optional next state.
///
/// Every state always has a row, possibly with all-empty cells. At most one
/// start state exists; any number of states may be end states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    pub symbols: Vec<String>,
    pub states: Vec<String>,
    pub start_state: Option<String>,
    pub end_states: Set<String>,
    pub productions: Map<String, Map<String, Option<String>>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a freshly-named state (`Q0`, `Q1`, …) with an empty transition
    /// row. The first state added becomes the start state and, while no end
    /// state exists, an end state as well.
    pub fn add_state(&mut self) -> String {
        let state = format!("Q{}", self.states.len());

        self.productions.entry(state.clone()).or_insert_with(|| {
            self.symbols
                .iter()
                .map(|symbol| (symbol.clone(), None))
                .collect()
        });
        self.states.push(state.clone());

        if self.start_state.is_none() {
            self.set_start_state(&state);
        }
        if self.end_states.is_empty() {
            self.toggle_end_state(&state);
        }

        state
    }

    /// Appends a freshly-named input symbol (`a`–`z`, then `a1`, `b1`, …) and
    /// an empty cell for it to every existing row.
    pub fn add_symbol(&mut self) -> String {
        let count = self.symbols.len();
        let letter = (b'a' + (count % 26) as u8) as char;
        let symbol = match count / 26 {
            0 => letter.to_string(),
            wrap => format!("{letter}{wrap}"),
        };

        for row in self.productions.values_mut() {
            row.insert(symbol.clone(), None);
        }
        self.symbols.push(symbol.clone());

        symbol
    }

    /// Removes a state row. Removing the start state falls back to the first
    /// remaining state; removing an end state drops it from the end set.
    pub fn remove_state(&mut self, state: &str) {
        self.states.retain(|s| s != state);
        self.productions.shift_remove(state);

        if self.start_state.as_deref() == Some(state) {
            self.start_state = self.states.first().cloned();
        }
        if self.end_states.contains(state) {
            self.toggle_end_state(state);
        }
    }

    /// Removes a symbol column from the table and from every row.
    pub fn remove_symbol(&mut self, symbol: &str) {
        self.symbols.retain(|s| s != symbol);
        for row in self.productions.values_mut() {
            row.shift_remove(symbol);
        }
    }

    /// Makes `state` the single start state, overwriting any previous one.
    pub fn set_start_state(&mut self, state: &str) {
        self.start_state = Some(state.to_owned());
    }

    /// Flips membership of `state` in the end-state set.
    pub fn toggle_end_state(&mut self, state: &str) {
        if !self.end_states.shift_remove(state) {
            self.end_states.insert(state.to_owned());
        }
    }

    /// Writes the cell for `state` × `symbol`. Unknown states are ignored.
    pub fn set_transition(&mut self, state: &str, symbol: &str, next: Option<&str>) {
        if let Some(row) = self.productions.get_mut(state) {
            row.insert(symbol.to_owned(), next.map(str::to_owned));
        }
    }

    /// The next state for `state` × `symbol`, if that cell is filled.
    pub fn transition(&self, state: &str, symbol: &str) -> Option<&str> {
        self.productions
            .get(state)?
            .get(symbol)?
            .as_deref()
    }
}

/// One transition taken during recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub current_state: String,
    pub read_symbol: String,
    pub next_state: String,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --{}--> {}",
            self.current_state, self.read_symbol, self.next_state
        )
    }
}

/// The outcome of a recognition walk: acceptance plus the transitions taken,
/// which are reported even when the sentence is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    pub recognized: bool,
    pub steps: Vec<Step>,
}

/// A transition table together with an input sentence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiniteAutomaton {
    pub table: TransitionTable,
    pub sentence: String,
}

impl FiniteAutomaton {
    pub fn new(table: TransitionTable, sentence: impl Into<String>) -> Self {
        Self {
            table,
            sentence: sentence.into(),
        }
    }

    /// Walks the sentence through the table, one character at a time,
    /// starting from the start state. A missing cell stops the scan
    /// immediately; the sentence is accepted iff every character was consumed
    /// and the final state is an end state.
    ///
    /// This is a recomputation from the current table and sentence on every
    /// call, not an incremental update.
    pub fn recognize(&self) -> Recognition {
        let mut steps = Vec::new();
        let mut failed = false;
        let mut current = self.table.start_state.clone();

        for ch in self.sentence.chars() {
            let symbol = ch.to_string();
            let next = current
                .as_deref()
                .and_then(|state| self.table.transition(state, &symbol))
                .map(str::to_owned);
            match (&current, next) {
                (Some(state), Some(next)) => {
                    steps.push(Step {
                        current_state: state.clone(),
                        read_symbol: symbol,
                        next_state: next.clone(),
                    });
                    current = Some(next);
                }
                _ => {
                    failed = true;
                    break;
                }
            }
        }

        let recognized = !failed
            && current
                .as_deref()
                .map_or(false, |state| self.table.end_states.contains(state));

        Recognition { recognized, steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TransitionTable {
        let mut table = TransitionTable::new();
        let q0 = table.add_state();
        let q1 = table.add_state();
        let a = table.add_symbol();
        let b = table.add_symbol();

        // Q0 was auto-toggled as end state; only Q1 should accept.
        table.toggle_end_state(&q0);
        table.toggle_end_state(&q1);

        table.set_transition(&q0, &a, Some(&q1));
        table.set_transition(&q1, &b, Some(&q1));
        table
    }

    #[test]
    fn state_and_symbol_naming() {
        let mut table = TransitionTable::new();
        assert_eq!(table.add_state(), "Q0");
        assert_eq!(table.add_state(), "Q1");
        assert_eq!(table.add_symbol(), "a");
        assert_eq!(table.add_symbol(), "b");

        assert_eq!(table.start_state.as_deref(), Some("Q0"));
        assert!(table.end_states.contains("Q0"));

        // Every row carries a cell for every symbol.
        for state in &table.states {
            let row = &table.productions[state.as_str()];
            assert_eq!(row.len(), table.symbols.len());
        }
    }

    #[test]
    fn symbol_names_wrap_after_the_alphabet() {
        let mut table = TransitionTable::new();
        let names: Vec<String> = (0..28).map(|_| table.add_symbol()).collect();
        assert_eq!(names[0], "a");
        assert_eq!(names[25], "z");
        assert_eq!(names[26], "a1");
        assert_eq!(names[27], "b1");
    }

    #[test]
    fn removing_the_start_state_falls_back() {
        let mut table = TransitionTable::new();
        let q0 = table.add_state();
        table.add_state();
        table.remove_state(&q0);

        assert_eq!(table.states, vec!["Q1"]);
        assert_eq!(table.start_state.as_deref(), Some("Q1"));
        assert!(table.end_states.is_empty(), "Q0 was the only end state");
        assert!(!table.productions.contains_key("Q0"));

        table.remove_state("Q1");
        assert_eq!(table.start_state, None);
    }

    #[test]
    fn removing_a_symbol_clears_every_row() {
        let mut table = sample_table();
        table.remove_symbol("a");
        assert_eq!(table.symbols, vec!["b"]);
        for row in table.productions.values() {
            assert!(!row.contains_key("a"));
        }
    }

    #[test]
    fn recognizes_sentence_and_reports_trace() {
        let automaton = FiniteAutomaton::new(sample_table(), "ab");
        let recognition = automaton.recognize();

        assert!(recognition.recognized);
        assert_eq!(
            recognition.steps,
            vec![
                Step {
                    current_state: "Q0".into(),
                    read_symbol: "a".into(),
                    next_state: "Q1".into(),
                },
                Step {
                    current_state: "Q1".into(),
                    read_symbol: "b".into(),
                    next_state: "Q1".into(),
                },
            ]
        );
    }

    #[test]
    fn rejects_on_missing_transition_without_consuming_the_rest() {
        let automaton = FiniteAutomaton::new(sample_table(), "ba");
        let recognition = automaton.recognize();

        assert!(!recognition.recognized);
        assert!(recognition.steps.is_empty());
    }

    #[test]
    fn rejects_when_final_state_is_not_an_end_state() {
        let mut table = sample_table();
        // Make Q1 a non-end state again; Q0 accepts instead.
        table.toggle_end_state("Q1");
        table.toggle_end_state("Q0");

        let automaton = FiniteAutomaton::new(table, "ab");
        let recognition = automaton.recognize();

        assert!(!recognition.recognized);
        assert_eq!(recognition.steps.len(), 2, "the trace is still reported");
    }

    #[test]
    fn empty_sentence_is_accepted_iff_start_is_an_end_state() {
        let mut table = TransitionTable::new();
        table.add_state();
        let accepting = FiniteAutomaton::new(table.clone(), "");
        assert!(accepting.recognize().recognized);

        table.toggle_end_state("Q0");
        let rejecting = FiniteAutomaton::new(table, "");
        assert!(!rejecting.recognize().recognized);
    }
}
