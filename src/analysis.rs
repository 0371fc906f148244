// Copyright (c) 2018 Fabian Schuiki

//! Productivity and reachability of nonterminals.
//!
//! A nonterminal is productive if it derives at least one string of
//! terminals, and reachable if it appears in some derivation from the start
//! symbol. Nonterminals lacking either property never contribute to an
//! accepted input. The parser does not need this analysis; it merely helps to
//! spot mistakes in a grammar.

use std::iter::repeat;
use std::mem::swap;
use bit_set::BitSet;
use grammar::{Grammar, NonterminalId, Symbol};

/// The productive and reachable nonterminals of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    productive: BitSet,
    reachable: BitSet,
    bound: usize,
}

impl Analysis {
    /// Analyze a grammar with respect to a start symbol.
    pub fn compute(grammar: &Grammar, start: NonterminalId) -> Analysis {
        Analysis {
            productive: compute_productive(grammar),
            reachable: compute_reachable(grammar, start),
            bound: grammar.nonterminal_id_bound(),
        }
    }

    /// Whether a nonterminal derives some string of terminals.
    pub fn is_productive(&self, id: NonterminalId) -> bool {
        self.productive.contains(id.as_usize())
    }

    /// Whether a nonterminal can be reached from the start symbol.
    pub fn is_reachable(&self, id: NonterminalId) -> bool {
        self.reachable.contains(id.as_usize())
    }

    /// The nonterminals that are unproductive or unreachable.
    pub fn useless(&self) -> Vec<NonterminalId> {
        (0..self.bound)
            .filter(|&i| !self.productive.contains(i) || !self.reachable.contains(i))
            .map(NonterminalId::from_usize)
            .collect()
    }
}

/// Determine the productive nonterminals.
///
/// Processes the nonterminals in rounds. Whenever a nonterminal turns out to
/// be productive, all nonterminals with a rule mentioning it are revisited in
/// the next round.
fn compute_productive(grammar: &Grammar) -> BitSet {
    let num_nonterm = grammar.nonterminal_id_bound();
    let mut productive = BitSet::with_capacity(num_nonterm);
    let mut update = BitSet::with_capacity(num_nonterm);
    let mut next_update = BitSet::with_capacity(num_nonterm);

    // Track which nonterminals have rules mentioning each nonterminal.
    let mut deps: Vec<BitSet> = repeat(BitSet::with_capacity(num_nonterm))
        .take(num_nonterm)
        .collect();
    for rule in grammar.rules() {
        update.insert(rule.name().as_usize());
        for symbol in rule.symbols() {
            if let Symbol::Nonterminal(id) = *symbol {
                deps[id.as_usize()].insert(rule.name().as_usize());
            }
        }
    }

    while !update.is_empty() {
        for current in update.iter() {
            if productive.contains(current) {
                continue;
            }
            let id = NonterminalId::from_usize(current);
            let any_productive = grammar.rules_for_nonterminal(id).any(|&rule_id| {
                grammar.rule(rule_id).symbols().iter().all(|symbol| match *symbol {
                    Symbol::Terminal(_) => true,
                    Symbol::Nonterminal(nt) => productive.contains(nt.as_usize()),
                })
            });
            if any_productive {
                productive.insert(current);
                next_update.union_with(&deps[current]);
            }
        }
        swap(&mut update, &mut next_update);
        next_update.clear();
    }

    productive
}

/// Determine the nonterminals reachable from `start`.
fn compute_reachable(grammar: &Grammar, start: NonterminalId) -> BitSet {
    let mut reachable = BitSet::with_capacity(grammar.nonterminal_id_bound());
    let mut todo = vec![start];
    reachable.insert(start.as_usize());
    while let Some(current) = todo.pop() {
        for &rule_id in grammar.rules_for_nonterminal(current) {
            for symbol in grammar.rule(rule_id).symbols() {
                if let Symbol::Nonterminal(id) = *symbol {
                    if reachable.insert(id.as_usize()) {
                        todo.push(id);
                    }
                }
            }
        }
    }
    reachable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn useless_nonterminals() {
        // S -> A B | A A; A -> a; B -> B B; C -> a
        let mut g = Grammar::new();
        let s = g.add_nonterminal("S");
        let a = g.add_nonterminal("A");
        let b = g.add_nonterminal("B");
        let c = g.add_nonterminal("C");
        let ta = g.add_terminal("a");
        g.add_binary_rule(s, a, b);
        g.add_binary_rule(s, a, a);
        g.add_terminal_rule(a, ta);
        g.add_binary_rule(b, b, b);
        g.add_terminal_rule(c, ta);

        let analysis = Analysis::compute(&g, s);
        assert!(analysis.is_productive(s));
        assert!(analysis.is_productive(a));
        assert!(!analysis.is_productive(b));
        assert!(analysis.is_productive(c));
        assert!(analysis.is_reachable(b));
        assert!(!analysis.is_reachable(c));
        assert_eq!(analysis.useless(), vec![b, c]);
    }

    #[test]
    fn productivity_propagates_upwards() {
        // S -> X Y; X -> Y Y; Y -> b
        let mut g = Grammar::new();
        let s = g.add_nonterminal("S");
        let x = g.add_nonterminal("X");
        let y = g.add_nonterminal("Y");
        let tb = g.add_terminal("b");
        g.add_binary_rule(s, x, y);
        g.add_binary_rule(x, y, y);
        g.add_terminal_rule(y, tb);

        let analysis = Analysis::compute(&g, s);
        assert!(analysis.is_productive(s));
        assert!(analysis.is_productive(x));
        assert!(analysis.useless().is_empty());
    }

    #[test]
    fn start_without_rules() {
        let mut g = Grammar::new();
        let s = g.add_nonterminal("S");
        let analysis = Analysis::compute(&g, s);
        assert!(analysis.is_reachable(s));
        assert!(!analysis.is_productive(s));
        assert_eq!(analysis.useless(), vec![s]);
    }
}
