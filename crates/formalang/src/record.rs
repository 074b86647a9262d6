//! JSON-shaped interchange records.
//!
//! The core has no file format of its own; it exchanges these records with
//! external collaborators (persistence, UI). Sentential forms travel as raw
//! concatenated strings and are re-tokenized against the record's own
//! alphabets on the way in, so serializing and reconstructing a grammar or a
//! transition table is lossless, glyphs included. Missing fields default to
//! empty collections; defending against otherwise malformed records is the
//! collaborator's concern.

use crate::automaton::TransitionTable;
use crate::grammar::Grammar;
use crate::rule::ProductionRule;
use crate::symbol::{SententialForm, Symbol, EPSILON};
use crate::types::{Map, Set};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    #[serde(default)]
    pub left_side: String,
    #[serde(default)]
    pub right_side: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarRecord {
    #[serde(default)]
    pub non_terminal_symbols: Vec<String>,
    #[serde(default)]
    pub terminal_symbols: Vec<String>,
    #[serde(default)]
    pub production_set_symbol: String,
    #[serde(default)]
    pub production_start_symbol: String,
    #[serde(default)]
    pub production_rules: Vec<RuleRecord>,
}

/// The automaton record is the transition table itself; empty cells travel
/// as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionTableRecord {
    #[serde(default)]
    pub productions: Map<String, Map<String, String>>,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub start_state: String,
    #[serde(default)]
    pub end_states: Vec<String>,
}

impl Grammar {
    /// Reconstructs a grammar from its interchange record, tokenizing every
    /// sentential form against the record's alphabets.
    pub fn from_record(record: &GrammarRecord) -> Self {
        let non_terminal_symbols: Set<Symbol> = record
            .non_terminal_symbols
            .iter()
            .map(|s| Symbol::from(s.as_str()))
            .collect();
        let terminal_symbols: Set<Symbol> = record
            .terminal_symbols
            .iter()
            .map(|s| Symbol::from(s.as_str()))
            .collect();

        let known: Set<Symbol> = non_terminal_symbols
            .iter()
            .chain(terminal_symbols.iter())
            .cloned()
            .chain([Symbol::from(EPSILON)])
            .collect();

        let production_rules = record
            .production_rules
            .iter()
            .map(|rule| {
                ProductionRule::new(
                    SententialForm::tokenize(&rule.left_side, &known),
                    rule.right_side
                        .iter()
                        .map(|alt| SententialForm::tokenize(alt, &known))
                        .collect(),
                )
            })
            .collect();

        Self {
            non_terminal_symbols,
            terminal_symbols,
            production_set_symbol: Symbol::from(record.production_set_symbol.as_str()),
            production_start_symbol: Symbol::from(record.production_start_symbol.as_str()),
            production_rules,
        }
    }

    /// Serializes the grammar into its interchange record.
    pub fn to_record(&self) -> GrammarRecord {
        GrammarRecord {
            non_terminal_symbols: self
                .non_terminal_symbols
                .iter()
                .map(ToString::to_string)
                .collect(),
            terminal_symbols: self
                .terminal_symbols
                .iter()
                .map(ToString::to_string)
                .collect(),
            production_set_symbol: self.production_set_symbol.to_string(),
            production_start_symbol: self.production_start_symbol.to_string(),
            production_rules: self
                .production_rules
                .iter()
                .map(|rule| RuleRecord {
                    left_side: rule.left_side.to_string(),
                    right_side: rule.right_side.iter().map(ToString::to_string).collect(),
                })
                .collect(),
        }
    }
}

impl TransitionTable {
    /// Reconstructs a transition table from its interchange record. Every
    /// declared state receives a full row even if the record omits cells.
    pub fn from_record(record: &TransitionTableRecord) -> Self {
        let mut productions: Map<String, Map<String, Option<String>>> = Map::default();
        for state in &record.states {
            let cells = record.productions.get(state);
            let row = record
                .symbols
                .iter()
                .map(|symbol| {
                    let next = cells
                        .and_then(|row| row.get(symbol))
                        .filter(|next| !next.is_empty())
                        .cloned();
                    (symbol.clone(), next)
                })
                .collect();
            productions.insert(state.clone(), row);
        }

        Self {
            symbols: record.symbols.clone(),
            states: record.states.clone(),
            start_state: (!record.start_state.is_empty()).then(|| record.start_state.clone()),
            end_states: record.end_states.iter().cloned().collect(),
            productions,
        }
    }

    /// Serializes the transition table into its interchange record.
    pub fn to_record(&self) -> TransitionTableRecord {
        TransitionTableRecord {
            productions: self
                .productions
                .iter()
                .map(|(state, row)| {
                    let cells = row
                        .iter()
                        .map(|(symbol, next)| {
                            (symbol.clone(), next.clone().unwrap_or_default())
                        })
                        .collect();
                    (state.clone(), cells)
                })
                .collect(),
            symbols: self.symbols.clone(),
            states: self.states.clone(),
            start_state: self.start_state.clone().unwrap_or_default(),
            end_states: self.end_states.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::ARROW;

    #[test]
    fn grammar_round_trip_is_lossless() {
        let json = format!(
            r#"{{
                "nonTerminalSymbols": ["S", "A"],
                "terminalSymbols": ["a", "b"],
                "productionSetSymbol": "P",
                "productionStartSymbol": "S",
                "productionRules": [
                    {{"leftSide": "S", "rightSide": ["aA", "b"]}},
                    {{"leftSide": "A", "rightSide": ["a", "{EPSILON}"]}}
                ]
            }}"#
        );
        let record: GrammarRecord = serde_json::from_str(&json).unwrap();
        let grammar = Grammar::from_record(&record);
        assert!(grammar.is_completed());
        assert_eq!(grammar.to_record(), record);

        // The glyphs survive a full serialize/deserialize cycle verbatim.
        let reencoded = serde_json::to_string(&grammar.to_record()).unwrap();
        assert!(reencoded.contains(EPSILON));
        let reparsed: GrammarRecord = serde_json::from_str(&reencoded).unwrap();
        assert_eq!(reparsed, record);
    }

    #[test]
    fn grammar_round_trip_with_multi_character_symbols() {
        let record = GrammarRecord {
            non_terminal_symbols: vec!["Expr".into(), "Term".into()],
            terminal_symbols: vec!["id".into(), "+".into()],
            production_set_symbol: "P".into(),
            production_start_symbol: "Expr".into(),
            production_rules: vec![
                RuleRecord {
                    left_side: "Expr".into(),
                    right_side: vec!["Term+Expr".into(), "Term".into()],
                },
                RuleRecord {
                    left_side: "Term".into(),
                    right_side: vec!["id".into()],
                },
            ],
        };
        let grammar = Grammar::from_record(&record);
        assert_eq!(grammar.to_record(), record);

        let first = &grammar.production_rules[0].right_side[0];
        assert_eq!(first.len(), 3, "multi-character symbols stay single tokens");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let record: GrammarRecord = serde_json::from_str("{}").unwrap();
        let grammar = Grammar::from_record(&record);
        assert!(!grammar.is_completed());
        assert!(grammar.production_rules.is_empty());
    }

    #[test]
    fn arrow_glyph_is_fixed_in_the_formalism() {
        // The rendering layer never re-encodes the arrow.
        assert_eq!(ARROW, "\u{279c}");
        assert_eq!(EPSILON, "\u{3b5}");
    }

    #[test]
    fn table_round_trip_is_lossless() {
        let mut table = TransitionTable::new();
        let q0 = table.add_state();
        let q1 = table.add_state();
        let a = table.add_symbol();
        table.add_symbol();
        table.toggle_end_state(&q1);
        table.set_transition(&q0, &a, Some(&q1));

        let record = table.to_record();
        assert_eq!(record.productions["Q0"]["a"], "Q1");
        assert_eq!(record.productions["Q0"]["b"], "");
        assert_eq!(record.start_state, "Q0");

        let rebuilt = TransitionTable::from_record(&record);
        assert_eq!(rebuilt, table);
        assert_eq!(rebuilt.to_record(), record);
    }

    #[test]
    fn table_record_fills_missing_rows() {
        let record = TransitionTableRecord {
            states: vec!["Q0".into(), "Q1".into()],
            symbols: vec!["a".into()],
            ..Default::default()
        };
        let table = TransitionTable::from_record(&record);
        assert_eq!(table.productions.len(), 2);
        assert_eq!(table.transition("Q1", "a"), None);
        assert_eq!(table.start_state, None);
    }
}
