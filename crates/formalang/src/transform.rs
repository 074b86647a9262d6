//! Grammar-to-grammar rewrite passes.
//!
//! Every pass deep-copies its input and returns a new [`Grammar`]; the input
//! is never mutated. The passes compose left-to-right in the order
//! [`remove_useless_symbols`] → [`remove_empty_productions`] → [`factor`] →
//! [`remove_left_recursion`]; running them out of order is unsupported.

use crate::grammar::Grammar;
use crate::rule::ProductionRule;
use crate::symbol::{SententialForm, Symbol};
use crate::types::{Map, Set};
use crate::util;

/// Upper bound on leading-symbol substitution sweeps per rule, so cyclic
/// substitution chains always terminate.
const MAX_SUBSTITUTION_PASSES: usize = 100;

/// Non-terminals other than the start symbol that never appear in the
/// productions of any *other* non-terminal.
pub fn find_unreachable_symbols(grammar: &Grammar) -> Vec<Symbol> {
    let start = &grammar.production_start_symbol;
    let mut unreachable = Vec::new();
    for candidate in &grammar.non_terminal_symbols {
        if candidate == start {
            continue;
        }
        let mentioned = grammar
            .non_terminal_symbols
            .iter()
            .filter(|other| *other != candidate)
            .flat_map(|other| grammar.get_productions(other))
            .any(|alternative| alternative.contains(candidate));
        if !mentioned {
            unreachable.push(candidate.clone());
        }
    }
    unreachable
}

/// Left symbols of rules where every alternative mentions the left symbol
/// itself, i.e. the rule has no production escaping the self-reference.
///
/// This is a shallow syntactic heuristic, not a real generating-symbol
/// analysis: it misses multi-step chains. See
/// [`find_non_generating_symbols`] for the fixed-point analysis.
pub fn find_sterile_symbols(grammar: &Grammar) -> Vec<Symbol> {
    let mut sterile = Vec::new();
    for rule in &grammar.production_rules {
        let Some(left) = rule.left_side.as_single() else {
            continue;
        };
        if rule.right_side.iter().all(|alt| alt.contains(left)) {
            sterile.push(left.clone());
        }
    }
    util::dedup(&sterile)
}

/// Non-terminals that cannot derive any terminal string, computed as the
/// complement of the usual fixed point: a symbol generates iff some
/// alternative consists only of terminals, empty sentences and generating
/// symbols.
pub fn find_non_generating_symbols(grammar: &Grammar) -> Vec<Symbol> {
    let mut generating: Set<Symbol> = Set::default();
    loop {
        let mut changed = false;
        for rule in &grammar.production_rules {
            let Some(left) = rule.left_side.as_single() else {
                continue;
            };
            if generating.contains(left.as_str()) {
                continue;
            }
            let generates = rule.right_side.iter().any(|alternative| {
                alternative.symbols().iter().all(|s| {
                    s.is_epsilon()
                        || grammar.terminal_symbols.contains(s.as_str())
                        || generating.contains(s.as_str())
                })
            });
            if generates {
                generating.insert(left.clone());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    grammar
        .non_terminal_symbols
        .iter()
        .filter(|nt| !generating.contains(nt.as_str()))
        .cloned()
        .collect()
}

/// Removes unreachable and sterile non-terminals, their rules, and every
/// alternative mentioning a removed symbol.
#[tracing::instrument(skip_all)]
pub fn remove_useless_symbols(grammar: &Grammar) -> Grammar {
    let mut output = grammar.clone();

    let sterile = find_sterile_symbols(grammar);
    let unreachable = find_unreachable_symbols(grammar);
    let removed = util::union(&sterile, &unreachable);
    if removed.is_empty() {
        return output;
    }
    tracing::debug!(?removed, "removing useless symbols");

    let kept: Vec<Symbol> = output.non_terminal_symbols.iter().cloned().collect();
    output.non_terminal_symbols = util::difference(&kept, &removed).into_iter().collect();
    output.remove_symbol_rules(&removed);
    for rule in &mut output.production_rules {
        rule.right_side
            .retain(|alternative| !removed.iter().any(|s| alternative.contains(s)));
        rule.right_side = util::dedup(&rule.right_side);
    }

    output
}

/// Eliminates empty productions.
///
/// For each rule carrying the empty sentence: if its left symbol is the
/// start symbol, a new start symbol with productions `{old start, ε}` is
/// prepended to the alphabet and rule list and becomes the start symbol.
/// Every alternative mentioning the nullable symbol gains a copy with all
/// its occurrences removed, then the empty sentence is dropped from the
/// nullable symbol's own rule and alternatives are deduplicated.
#[tracing::instrument(skip_all)]
pub fn remove_empty_productions(grammar: &Grammar) -> Grammar {
    let mut output = grammar.clone();

    // Snapshot of the nullable left symbols: rules synthesized below must
    // not be re-processed, otherwise the fresh start rule would lose its ε.
    let targets: Vec<Symbol> = grammar
        .production_rules
        .iter()
        .filter(|r| r.right_side.iter().any(SententialForm::is_epsilon))
        .filter_map(|r| r.left_side.as_single().cloned())
        .collect();

    for symbol in targets {
        tracing::debug!(%symbol, "eliminating empty production");

        if symbol == output.production_start_symbol {
            let fresh = output.create_non_terminal_symbol(symbol.as_str());
            let mut non_terminals: Set<Symbol> = Set::default();
            non_terminals.insert(fresh.clone());
            non_terminals.extend(output.non_terminal_symbols.iter().cloned());
            output.non_terminal_symbols = non_terminals;
            output.production_rules.insert(
                0,
                ProductionRule::new(
                    SententialForm::from(fresh.clone()),
                    vec![
                        SententialForm::from(symbol.clone()),
                        SententialForm::epsilon(),
                    ],
                ),
            );
            output.production_start_symbol = fresh;
        }

        for rule in &mut output.production_rules {
            let mut added = Vec::new();
            for alternative in &rule.right_side {
                if alternative.contains(&symbol) {
                    let stripped = alternative.without(&symbol);
                    if !stripped.is_empty() {
                        added.push(stripped);
                    }
                }
            }
            rule.right_side.extend(added);
        }

        for rule in &mut output.production_rules {
            if rule.left_side.as_single() == Some(&symbol) {
                rule.right_side.retain(|alt| !alt.is_epsilon());
            }
            rule.right_side = util::dedup(&rule.right_side);
        }
    }

    output
}

/// Substitutes the leading non-terminal of every non-start, non-self-recursive
/// alternative by that symbol's own productions, repeatedly, in place.
fn replace_starting_symbols(grammar: &mut Grammar) {
    let start = grammar.production_start_symbol.clone();
    for index in 0..grammar.production_rules.len() {
        let Some(left) = grammar.production_rules[index].left_side.as_single().cloned() else {
            continue;
        };
        if left == start {
            continue;
        }

        let mut alternatives = grammar.production_rules[index].right_side.clone();
        let mut passes_left = MAX_SUBSTITUTION_PASSES;
        loop {
            let mut changed = false;
            let mut next = Vec::with_capacity(alternatives.len());
            for alternative in &alternatives {
                let leading = alternative
                    .first()
                    .filter(|s| grammar.non_terminal_symbols.contains(s.as_str()) && **s != left)
                    .cloned();
                match leading {
                    Some(leading) => {
                        let productions = grammar.get_productions(&leading);
                        if productions.is_empty() {
                            next.push(alternative.clone());
                        } else {
                            let remainder = alternative.suffix(1);
                            for production in productions {
                                next.push(production.concat(&remainder));
                            }
                            changed = true;
                        }
                    }
                    None => next.push(alternative.clone()),
                }
            }
            alternatives = next;
            passes_left -= 1;
            if !changed || passes_left == 0 {
                break;
            }
        }
        grammar.production_rules[index].right_side = alternatives;
    }
}

/// Left-factors the grammar.
///
/// After leading-symbol substitution, alternatives longer than one symbol
/// are grouped by their first symbol; each group with more than one member
/// moves its suffixes into a freshly minted non-terminal. Singleton groups
/// and single-symbol alternatives pass through unchanged. Minted rules are
/// appended right after their originating rule.
#[tracing::instrument(skip_all)]
pub fn factor(grammar: &Grammar) -> Grammar {
    let mut output = grammar.clone();
    replace_starting_symbols(&mut output);

    let mut index = 0;
    while index < output.production_rules.len() {
        let rule = &output.production_rules[index];
        let Some(left) = rule.left_side.as_single().cloned() else {
            index += 1;
            continue;
        };
        let alternatives = rule.right_side.clone();

        let mut group_sizes: Map<Symbol, usize> = Map::default();
        for alternative in &alternatives {
            if alternative.len() > 1 {
                if let Some(first) = alternative.first() {
                    *group_sizes.entry(first.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut new_alternatives = Vec::with_capacity(alternatives.len());
        let mut new_rules = Vec::new();
        let mut factored: Set<Symbol> = Set::default();
        for alternative in &alternatives {
            if alternative.len() <= 1 {
                new_alternatives.push(alternative.clone());
                continue;
            }
            let Some(first) = alternative.first().cloned() else {
                continue;
            };
            if group_sizes.get(&first).copied().unwrap_or(0) <= 1 {
                new_alternatives.push(alternative.clone());
            } else if factored.insert(first.clone()) {
                let fresh = output.create_non_terminal_symbol(left.as_str());
                tracing::debug!(%left, %first, %fresh, "factoring common prefix");
                let suffixes: Vec<SententialForm> = alternatives
                    .iter()
                    .filter(|alt| alt.len() > 1 && alt.first() == Some(&first))
                    .map(|alt| alt.suffix(1))
                    .collect();
                new_rules.push(ProductionRule::new(
                    SententialForm::from(fresh.clone()),
                    suffixes,
                ));
                new_alternatives.push(SententialForm::new(vec![first, fresh]));
            }
            // Later members of an already-factored group are covered by the
            // minted rule.
        }

        output.production_rules[index].right_side = new_alternatives;
        let inserted = new_rules.len();
        for (offset, new_rule) in new_rules.into_iter().enumerate() {
            output.production_rules.insert(index + 1 + offset, new_rule);
        }
        index += 1 + inserted;
    }

    output
}

/// Eliminates direct left recursion.
///
/// Every alternative starting with the rule's own left symbol mints a fresh
/// right-recursive helper `X' → { remainder·X', ε }`; the surviving
/// alternatives are expanded by the cross product with all minted helpers.
/// Rules without left recursion are left unchanged.
#[tracing::instrument(skip_all)]
pub fn remove_left_recursion(grammar: &Grammar) -> Grammar {
    let mut output = grammar.clone();

    let mut index = 0;
    while index < output.production_rules.len() {
        let rule = &output.production_rules[index];
        let Some(left) = rule.left_side.as_single().cloned() else {
            index += 1;
            continue;
        };
        let alternatives = rule.right_side.clone();

        let mut fresh_symbols = Vec::new();
        let mut new_rules = Vec::new();
        let mut survivors = Vec::new();
        for alternative in &alternatives {
            if alternative.len() > 1 && alternative.first() == Some(&left) {
                let fresh = output.create_non_terminal_symbol(left.as_str());
                tracing::debug!(%left, %fresh, "eliminating left recursion");
                let mut recursive = alternative.suffix(1);
                recursive.push(fresh.clone());
                new_rules.push(ProductionRule::new(
                    SententialForm::from(fresh.clone()),
                    vec![recursive, SententialForm::epsilon()],
                ));
                fresh_symbols.push(fresh);
            } else {
                survivors.push(alternative.clone());
            }
        }

        if fresh_symbols.is_empty() {
            index += 1;
            continue;
        }

        let mut expanded = Vec::with_capacity(survivors.len() * fresh_symbols.len());
        for alternative in &survivors {
            for fresh in &fresh_symbols {
                expanded.push(alternative.concat(&SententialForm::from(fresh.clone())));
            }
        }
        output.production_rules[index].right_side = expanded;

        let inserted = new_rules.len();
        for (offset, new_rule) in new_rules.into_iter().enumerate() {
            output.production_rules.insert(index + 1 + offset, new_rule);
        }
        index += 1 + inserted;
    }

    output
}
