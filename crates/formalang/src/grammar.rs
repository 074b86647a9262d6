//! The grammar data model: validation, Chomsky classification, completeness
//! and sentence generation.

use crate::rule::ProductionRule;
use crate::symbol::{SententialForm, Symbol, EPSILON};
use crate::types::Set;
use crate::util;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// Symbol used to represent the grammar itself in the formalism rendering.
const GRAMMAR_SYMBOL: char = 'G';

/// Indentation of the production rules inside the rule-set rendering.
const INDENT: &str = "    ";

/// Upper bound on rewrite iterations during sentence generation, so cyclic
/// grammars always terminate.
const MAX_REWRITE_STEPS: usize = 100;

/// Chomsky hierarchy ranks. The variants are declared from least to most
/// restricted, so the derived ordering matches the hierarchy
/// (`Unrestricted < ContextSensitive < ContextFree < Regular`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GrammarClass {
    Unrestricted,
    ContextSensitive,
    ContextFree,
    Regular,
}

impl fmt::Display for GrammarClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted => f.write_str("unrestricted"),
            Self::ContextSensitive => f.write_str("context-sensitive"),
            Self::ContextFree => f.write_str("context-free"),
            Self::Regular => f.write_str("regular"),
        }
    }
}

/// A problem reported by [`Grammar::validate`]. Problems are data, not
/// failures: the caller decides whether an invalid grammar may still be
/// classified, displayed or used for generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationProblem {
    #[error("some symbols appear as both non-terminal and terminal symbols ({})", .symbols.join(", "))]
    AlphabetOverlap { symbols: Vec<String> },

    #[error("the production start symbol is not among the non-terminal symbols")]
    StartSymbolNotNonTerminal,

    #[error("the production start symbol must not be among the terminal symbols")]
    StartSymbolIsTerminal,

    #[error("there is no production rule for the production start symbol")]
    MissingStartRule,

    #[error("there are duplicate production rules ({})", .left_sides.join(", "))]
    DuplicateRules { left_sides: Vec<String> },
}

/// A grammar: the 4-tuple of alphabets and distinguished symbols plus the
/// production rules.
///
/// The invariants (disjoint alphabets, start symbol membership, unique left
/// sides) are checked by [`validate`], not enforced at construction, so a
/// grammar under edition may be transiently inconsistent.
///
/// [`validate`]: Grammar::validate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    pub non_terminal_symbols: Set<Symbol>,
    pub terminal_symbols: Set<Symbol>,
    pub production_set_symbol: Symbol,
    pub production_start_symbol: Symbol,
    pub production_rules: Vec<ProductionRule>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenizes `text` against this grammar's alphabets (plus the
    /// empty-sentence symbol).
    pub fn sentential_form(&self, text: &str) -> SententialForm {
        let known: Set<Symbol> = self
            .non_terminal_symbols
            .iter()
            .chain(self.terminal_symbols.iter())
            .cloned()
            .chain([Symbol::from(EPSILON)])
            .collect();
        SententialForm::tokenize(text, &known)
    }

    /// Checks the grammar invariants and returns the list of problems found,
    /// recomputed from the current state on every call. An empty list means
    /// the grammar is well-formed; it does not imply [`is_completed`].
    ///
    /// [`is_completed`]: Grammar::is_completed
    pub fn validate(&self) -> Vec<ValidationProblem> {
        let mut problems = Vec::new();

        let non_terminals: Vec<Symbol> = self.non_terminal_symbols.iter().cloned().collect();
        let terminals: Vec<Symbol> = self.terminal_symbols.iter().cloned().collect();
        let overlap: Vec<String> = util::intersection(&non_terminals, &terminals)
            .iter()
            .map(ToString::to_string)
            .collect();
        if !overlap.is_empty() {
            problems.push(ValidationProblem::AlphabetOverlap { symbols: overlap });
        }

        let start = &self.production_start_symbol;
        if !start.is_empty() {
            if !self.non_terminal_symbols.contains(start.as_str()) {
                problems.push(ValidationProblem::StartSymbolNotNonTerminal);
            }
            if self.terminal_symbols.contains(start.as_str()) {
                problems.push(ValidationProblem::StartSymbolIsTerminal);
            }
        }

        let mut generators: Vec<&SententialForm> = Vec::new();
        let mut duplicated: Vec<String> = Vec::new();
        for rule in &self.production_rules {
            let left = &rule.left_side;
            if left.is_empty() {
                continue;
            }
            if generators.contains(&left) {
                let name = left.to_string();
                if !duplicated.contains(&name) {
                    duplicated.push(name);
                }
            } else {
                generators.push(left);
            }
        }

        if !start.is_empty() && !generators.iter().any(|l| l.as_single() == Some(start)) {
            problems.push(ValidationProblem::MissingStartRule);
        }

        if !duplicated.is_empty() {
            problems.push(ValidationProblem::DuplicateRules {
                left_sides: duplicated,
            });
        }

        problems
    }

    /// Whether the grammar definition is complete: all four symbol fields are
    /// set, at least one rule exists and every rule is itself completed.
    pub fn is_completed(&self) -> bool {
        !self.non_terminal_symbols.is_empty()
            && !self.terminal_symbols.is_empty()
            && !self.production_set_symbol.is_empty()
            && !self.production_start_symbol.is_empty()
            && !self.production_rules.is_empty()
            && self.production_rules.iter().all(ProductionRule::is_completed)
    }

    /// Classifies the grammar in the Chomsky hierarchy by the shape of its
    /// rules: start at regular and demote one rank per failed sweep. The
    /// ranks strictly nest, so classification never re-promotes.
    pub fn classify(&self) -> GrammarClass {
        let nt = &self.non_terminal_symbols;
        let t = &self.terminal_symbols;
        let rules = &self.production_rules;

        let mut class = GrammarClass::Regular;
        if rules.iter().any(|r| !r.is_regular(nt, t)) {
            class = GrammarClass::ContextFree;
        }
        if class == GrammarClass::ContextFree && rules.iter().any(|r| !r.is_context_free(nt, t)) {
            class = GrammarClass::ContextSensitive;
        }
        if class == GrammarClass::ContextSensitive
            && rules.iter().any(|r| !r.is_context_sensitive(nt, t))
        {
            class = GrammarClass::Unrestricted;
        }
        class
    }

    /// The alternatives of the first rule whose left side is exactly
    /// `symbol`, or an empty slice if no such rule exists.
    pub fn get_productions(&self, symbol: &Symbol) -> &[SententialForm] {
        self.production_rules
            .iter()
            .find(|r| r.left_side.as_single() == Some(symbol))
            .map(|r| r.right_side.as_slice())
            .unwrap_or(&[])
    }

    /// Generates a random sentence by repeatedly rewriting the leftmost
    /// non-terminal, or `None` if the grammar is not completed.
    ///
    /// Rewriting stops after 100 iterations, so the result may still contain
    /// non-terminals for cyclic grammars; empty-sentence symbols are stripped
    /// from the final string.
    pub fn generate_sentence(&self) -> Option<String> {
        self.generate_sentence_with_rng(&mut rand::thread_rng())
    }

    /// [`generate_sentence`] with a caller-provided source of randomness.
    ///
    /// [`generate_sentence`]: Grammar::generate_sentence
    pub fn generate_sentence_with_rng(&self, rng: &mut impl Rng) -> Option<String> {
        if !self.is_completed() {
            return None;
        }

        let mut sentence = SententialForm::from(self.production_start_symbol.clone());
        for _ in 0..MAX_REWRITE_STEPS {
            let found = sentence
                .find_first_of(&self.non_terminal_symbols)
                .map(|(index, symbol)| (index, symbol.clone()));
            let Some((index, symbol)) = found else {
                break;
            };
            let Some(replacement) = self.get_productions(&symbol).choose(rng).cloned() else {
                // A non-terminal without productions cannot be rewritten any
                // further; degrade gracefully instead of spinning.
                break;
            };
            tracing::trace!(%sentence, %symbol, %replacement, "rewrite");
            sentence = sentence.replace_at(index, &replacement);
        }

        Some(sentence.strip_epsilon().to_string())
    }

    /// Draws a pair of sample sentences, retrying up to five times to make
    /// the second differ from the first. Returns an empty vector while the
    /// grammar cannot generate, and possibly a duplicate pair once the
    /// retries are exhausted.
    pub fn generated_sentences(&self) -> Vec<String> {
        self.generated_sentences_with_rng(&mut rand::thread_rng())
    }

    /// [`generated_sentences`] with a caller-provided source of randomness.
    ///
    /// [`generated_sentences`]: Grammar::generated_sentences
    pub fn generated_sentences_with_rng(&self, rng: &mut impl Rng) -> Vec<String> {
        let Some(a) = self.generate_sentence_with_rng(rng) else {
            return Vec::new();
        };

        let mut b = String::new();
        for _ in 0..5 {
            if let Some(sentence) = self.generate_sentence_with_rng(rng) {
                b = sentence;
            }
            if b != a {
                break;
            }
        }

        vec![a, b]
    }

    /// Mints a fresh non-terminal by appending apostrophes to `base` until
    /// the name is unused, registers it and returns it.
    pub fn create_non_terminal_symbol(&mut self, base: &str) -> Symbol {
        let mut name = base.to_owned();
        while self.non_terminal_symbols.contains(name.as_str()) {
            name.push('\'');
        }
        let symbol = Symbol::from(name);
        self.non_terminal_symbols.insert(symbol.clone());
        symbol
    }

    /// Deletes every rule whose left side is one of `symbols`.
    pub fn remove_symbol_rules(&mut self, symbols: &[Symbol]) {
        self.production_rules
            .retain(|r| !matches!(r.left_side.as_single(), Some(s) if symbols.contains(s)));
    }

    /// Appends a rule to the grammar.
    pub fn add_production_rule(&mut self, rule: ProductionRule) {
        self.production_rules.push(rule);
    }

    /// Removes the rule at `index`, if present.
    pub fn remove_rule(&mut self, index: usize) {
        if index < self.production_rules.len() {
            self.production_rules.remove(index);
        }
    }

    /// Renders the full formalism, or the empty string while any part of the
    /// definition is missing:
    ///
    /// ```text
    /// G = ({S}, {a}, P, S)
    /// P = {
    ///     S ➜ aS | ε
    /// }
    /// ```
    pub fn to_formalism_string(&self) -> String {
        let nt = self
            .non_terminal_symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let t = self
            .terminal_symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let p = &self.production_set_symbol;
        let s = &self.production_start_symbol;

        let rules: Vec<String> = self
            .production_rules
            .iter()
            .map(ProductionRule::to_formalism_string)
            .filter(|f| !f.is_empty())
            .map(|f| format!("{INDENT}{f}"))
            .collect();

        if nt.is_empty() || t.is_empty() || p.is_empty() || s.is_empty() || rules.is_empty() {
            return String::new();
        }

        format!(
            "{GRAMMAR_SYMBOL} = ({{{nt}}}, {{{t}}}, {p}, {s})\n{p} = {{\n{}\n}}",
            rules.join(",\n")
        )
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formalism_string())
    }
}
