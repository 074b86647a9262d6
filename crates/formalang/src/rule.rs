//! Production rules and their classification predicates.

use crate::symbol::{SententialForm, Symbol, ARROW};
use crate::types::Set;
use crate::util::display_fn;
use std::fmt;

/// One rewrite rule: a left-hand sentential form and an ordered set of
/// right-hand alternatives.
///
/// Duplicate alternatives are allowed and insertion order is meaningful for
/// display. The rule does not know the grammar it belongs to; the predicates
/// take the grammar's alphabets as explicit parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionRule {
    pub left_side: SententialForm,
    pub right_side: Vec<SententialForm>,
}

impl ProductionRule {
    pub fn new(left_side: SententialForm, right_side: Vec<SententialForm>) -> Self {
        Self {
            left_side,
            right_side,
        }
    }

    /// Appends the empty sentence to the list of alternatives.
    pub fn add_empty_sentence(&mut self) {
        self.right_side.push(SententialForm::epsilon());
    }

    /// Whether the rule is completely defined: a non-empty left side and at
    /// least one alternative.
    pub fn is_completed(&self) -> bool {
        !self.left_side.is_empty() && !self.right_side.is_empty()
    }

    /// Renders `left ➜ alt₁ | alt₂ | …`, or the empty string if either side
    /// is unset.
    pub fn to_formalism_string(&self) -> String {
        if !self.is_completed() {
            return String::new();
        }
        format!(
            "{} {} {}",
            self.left_side,
            ARROW,
            display_fn(|f| {
                for (i, alt) in self.right_side.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", alt)?;
                }
                Ok(())
            })
        )
    }

    /// Whether the rule fits a regular grammar: the left side is exactly one
    /// non-terminal and every alternative is a single terminal, a terminal
    /// followed by a single non-terminal, or the empty sentence.
    pub fn is_regular(&self, non_terminals: &Set<Symbol>, terminals: &Set<Symbol>) -> bool {
        let Some(left) = self.left_side.as_single() else {
            return false;
        };
        if !non_terminals.contains(left.as_str()) {
            return false;
        }

        self.right_side.iter().all(|alt| match alt.symbols() {
            [s] => s.is_epsilon() || terminals.contains(s.as_str()),
            [t, n] => terminals.contains(t.as_str()) && non_terminals.contains(n.as_str()),
            _ => false,
        })
    }

    /// Whether the rule fits a context-free grammar: the left side is exactly
    /// one non-terminal and no alternative is the empty sentence.
    pub fn is_context_free(&self, non_terminals: &Set<Symbol>, _terminals: &Set<Symbol>) -> bool {
        let Some(left) = self.left_side.as_single() else {
            return false;
        };
        if !non_terminals.contains(left.as_str()) {
            return false;
        }

        self.right_side.iter().all(|alt| !alt.is_epsilon())
    }

    /// Whether the rule fits a context-sensitive grammar: the left side holds
    /// at least one non-terminal and every alternative is a non-empty
    /// sentence at least as long as the left side.
    pub fn is_context_sensitive(
        &self,
        non_terminals: &Set<Symbol>,
        _terminals: &Set<Symbol>,
    ) -> bool {
        if !self
            .left_side
            .symbols()
            .iter()
            .any(|s| non_terminals.contains(s.as_str()))
        {
            return false;
        }

        self.right_side
            .iter()
            .all(|alt| !alt.is_epsilon() && alt.len() >= self.left_side.len())
    }
}

impl fmt::Display for ProductionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formalism_string())
    }
}
