//! Symbols and sentential forms.

use crate::types::Set;
use std::borrow::Borrow;
use std::fmt;

/// Symbol denoting the empty sentence (U+03B5). Preserved verbatim through
/// serialization.
pub const EPSILON: &str = "\u{3b5}";

/// Symbol separating the left side from the right side of a rule in the
/// formalism rendering (U+279C).
pub const ARROW: &str = "\u{279c}";

/// An opaque symbol token. Whether it is a terminal or a non-terminal is
/// decided by the alphabets of the grammar it appears in, not by the token
/// itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_epsilon(&self) -> bool {
        self.0 == EPSILON
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// An ordered sequence of symbol tokens.
///
/// Storing forms as raw concatenated strings and locating symbols by
/// substring search is ambiguous once an alphabet contains multi-character
/// symbols, so forms are kept tokenized; the raw string only exists at the
/// interchange boundary (see [`tokenize`]).
///
/// [`tokenize`]: SententialForm::tokenize
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SententialForm(Vec<Symbol>);

impl SententialForm {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    /// The form holding only the empty-sentence symbol.
    pub fn epsilon() -> Self {
        Self(vec![Symbol::from(EPSILON)])
    }

    /// Splits `text` into symbol tokens by greedy longest-match against
    /// `alphabet`. Characters matching no known symbol become single-character
    /// tokens, so rendering a tokenized form always reproduces `text` exactly.
    pub fn tokenize(text: &str, alphabet: &Set<Symbol>) -> Self {
        let mut symbols = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            let matched = alphabet
                .iter()
                .filter(|s| !s.is_empty() && rest.starts_with(s.as_str()))
                .max_by_key(|s| s.as_str().len());
            match matched {
                Some(symbol) => {
                    rest = &rest[symbol.as_str().len()..];
                    symbols.push(symbol.clone());
                }
                None => {
                    let mut chars = rest.chars();
                    if let Some(ch) = chars.next() {
                        symbols.push(Symbol::from(ch.to_string()));
                    }
                    rest = chars.as_str();
                }
            }
        }
        Self(symbols)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Symbol> {
        self.0.first()
    }

    /// The single symbol this form consists of, if its length is exactly one.
    pub fn as_single(&self) -> Option<&Symbol> {
        match &self.0[..] {
            [symbol] => Some(symbol),
            _ => None,
        }
    }

    /// Whether this form is exactly the empty sentence.
    pub fn is_epsilon(&self) -> bool {
        matches!(&self.0[..], [symbol] if symbol.is_epsilon())
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.0.contains(symbol)
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.0.push(symbol);
    }

    /// The form holding the tokens from position `from` onwards.
    pub fn suffix(&self, from: usize) -> Self {
        Self(self.0[from.min(self.0.len())..].to_vec())
    }

    pub fn concat(&self, other: &Self) -> Self {
        let mut symbols = self.0.clone();
        symbols.extend(other.0.iter().cloned());
        Self(symbols)
    }

    /// A copy with the token at `index` replaced by the tokens of
    /// `replacement`.
    pub fn replace_at(&self, index: usize, replacement: &Self) -> Self {
        let mut symbols = Vec::with_capacity(self.0.len() + replacement.0.len());
        symbols.extend(self.0[..index].iter().cloned());
        symbols.extend(replacement.0.iter().cloned());
        symbols.extend(self.0[index + 1..].iter().cloned());
        Self(symbols)
    }

    /// A copy without any occurrence of `symbol`.
    pub fn without(&self, symbol: &Symbol) -> Self {
        Self(self.0.iter().filter(|s| *s != symbol).cloned().collect())
    }

    /// A copy without any empty-sentence token.
    pub fn strip_epsilon(&self) -> Self {
        Self(self.0.iter().filter(|s| !s.is_epsilon()).cloned().collect())
    }

    /// Position and symbol of the leftmost token belonging to `alphabet`.
    pub fn find_first_of(&self, alphabet: &Set<Symbol>) -> Option<(usize, &Symbol)> {
        self.0
            .iter()
            .enumerate()
            .find(|(_, s)| alphabet.contains(s.as_str()))
    }
}

impl fmt::Display for SententialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            f.write_str(symbol.as_str())?;
        }
        Ok(())
    }
}

impl From<Symbol> for SententialForm {
    fn from(symbol: Symbol) -> Self {
        Self(vec![symbol])
    }
}

impl FromIterator<Symbol> for SententialForm {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alphabet(symbols: &[&str]) -> Set<Symbol> {
        symbols.iter().copied().map(Symbol::from).collect()
    }

    #[test]
    fn tokenize_single_character_symbols() {
        let form = SententialForm::tokenize("aSb", &alphabet(&["S", "a", "b"]));
        let expected = [Symbol::from("a"), Symbol::from("S"), Symbol::from("b")];
        assert_eq!(form.symbols(), expected);
        assert_eq!(form.to_string(), "aSb");
    }

    #[test]
    fn tokenize_prefers_longest_match() {
        // "if" must win over "i" even though "i" is listed first.
        let form = SententialForm::tokenize("ifx", &alphabet(&["i", "if", "x"]));
        let expected = [Symbol::from("if"), Symbol::from("x")];
        assert_eq!(form.symbols(), expected);
        assert_eq!(form.to_string(), "ifx");
    }

    #[test]
    fn tokenize_falls_back_to_characters() {
        let form = SententialForm::tokenize("a?b", &alphabet(&["a", "b"]));
        assert_eq!(form.len(), 3);
        assert_eq!(form.to_string(), "a?b");
    }

    #[test]
    fn replace_and_strip() {
        let alphabet = alphabet(&["S", "a", EPSILON]);
        let form = SententialForm::tokenize("aSa", &alphabet);
        let replaced = form.replace_at(1, &SententialForm::epsilon());
        assert_eq!(replaced.to_string(), format!("a{EPSILON}a"));
        assert_eq!(replaced.strip_epsilon().to_string(), "aa");
    }

    #[test]
    fn find_first_of_is_leftmost() {
        let known = alphabet(&["S", "A", "a"]);
        let nt = alphabet(&["A", "S"]);
        let form = SententialForm::tokenize("aSA", &known);
        let (index, symbol) = form.find_first_of(&nt).unwrap();
        assert_eq!(index, 1);
        assert_eq!(*symbol, "S");
    }
}
