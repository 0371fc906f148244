// Copyright (c) 2018 Fabian Schuiki

//! Data structures representing a grammar in Chomsky Normal Form.
//!
//! Every production of such a grammar either rewrites a nonterminal into a
//! single terminal, or into exactly two nonterminals. The grammar keeps one
//! lookup table for each of the two kinds, mapping a right-hand side to the
//! set of nonterminals that derive it in one step.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::slice;
use bit_set::{self, BitSet};
use indexmap::{set, IndexSet};
use Pretty;

/// A grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: IndexSet<Rule>,
    nonterms: HashMap<String, NonterminalId>,
    terms: HashMap<String, TerminalId>,
    nonterm_names: Vec<String>,
    nonterm_rules: Vec<Vec<RuleId>>,
    term_names: Vec<String>,
    term_table: HashMap<TerminalId, NonterminalSet>,
    pair_table: HashMap<(NonterminalId, NonterminalId), NonterminalSet>,
    empty: NonterminalSet,
}

/// A single rule within a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    name: NonterminalId,
    symbols: Vec<Symbol>,
}

/// A symbol of a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A terminal.
    Terminal(TerminalId),
    /// A nonterminal.
    Nonterminal(NonterminalId),
}

/// A unique nonterminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonterminalId(usize);

/// A unique terminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(usize);

/// A unique rule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(usize);

/// A set of nonterminals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonterminalSet(BitSet);

/// An iterator over the nonterminals in a set, in increasing ID order.
pub struct NonterminalSetIter<'a>(bit_set::Iter<'a, u32>);

/// An iterator over the rule IDs of a grammar.
pub type RuleIdsIter<'a> = slice::Iter<'a, RuleId>;

/// The right-hand side shapes permitted in Chomsky Normal Form.
enum Shape {
    Terminal(TerminalId),
    Pair(NonterminalId, NonterminalId),
}

impl Grammar {
    /// Create a new empty grammar.
    pub fn new() -> Grammar {
        Grammar {
            rules: IndexSet::new(),
            nonterms: HashMap::new(),
            terms: HashMap::new(),
            nonterm_names: Vec::new(),
            nonterm_rules: Vec::new(),
            term_names: Vec::new(),
            term_table: HashMap::new(),
            pair_table: HashMap::new(),
            empty: NonterminalSet::new(),
        }
    }

    /// Add a nonterminal.
    ///
    /// Returns the existing ID if a nonterminal with the same name has been
    /// added before.
    pub fn add_nonterminal<S: Into<String>>(&mut self, name: S) -> NonterminalId {
        let name = name.into();
        let next_id = NonterminalId(self.nonterm_names.len());
        if let Some(&id) = self.nonterms.get(&name) {
            id
        } else {
            self.nonterms.insert(name.clone(), next_id);
            self.nonterm_names.push(name);
            self.nonterm_rules.push(Vec::new());
            next_id
        }
    }

    /// Add a terminal.
    ///
    /// Terminals and nonterminals live in separate namespaces. A terminal may
    /// carry the same name as a nonterminal.
    pub fn add_terminal<S: Into<String>>(&mut self, name: S) -> TerminalId {
        let name = name.into();
        let next_id = TerminalId(self.term_names.len());
        if let Some(&id) = self.terms.get(&name) {
            id
        } else {
            self.terms.insert(name.clone(), next_id);
            self.term_names.push(name);
            next_id
        }
    }

    /// Look up a nonterminal by name.
    pub fn nonterminal(&self, name: &str) -> Option<NonterminalId> {
        self.nonterms.get(name).cloned()
    }

    /// Look up a terminal by name.
    pub fn terminal(&self, name: &str) -> Option<TerminalId> {
        self.terms.get(name).cloned()
    }

    /// Get the name of a nonterminal.
    pub fn nonterminal_name(&self, id: NonterminalId) -> &str {
        &self.nonterm_names[id.as_usize()]
    }

    /// Get the name of a terminal.
    pub fn terminal_name(&self, id: TerminalId) -> &str {
        &self.term_names[id.as_usize()]
    }

    /// The upper bound on nonterminal IDs.
    ///
    /// Basically returns the largest nonterminal ID + 1. Can be used as
    /// capacity for containers that will hold nonterminals.
    pub fn nonterminal_id_bound(&self) -> usize {
        self.nonterm_names.len()
    }

    /// The upper bound on terminal IDs.
    pub fn terminal_id_bound(&self) -> usize {
        self.term_names.len()
    }

    /// Add a rule to the grammar.
    ///
    /// Fails if the rule is not in Chomsky Normal Form, i.e. if its
    /// right-hand side is neither a single terminal nor a pair of
    /// nonterminals. Adding a rule that is already present has no effect and
    /// returns the ID of the existing rule.
    pub fn add_rule(&mut self, rule: Rule) -> Result<RuleId, GrammarError> {
        let shape = match *rule.symbols() {
            [Symbol::Terminal(t)] => Shape::Terminal(t),
            [Symbol::Nonterminal(a), Symbol::Nonterminal(b)] => Shape::Pair(a, b),
            [] => {
                return Err(GrammarError::EmptyRule {
                    lhs: self.nonterminal_name(rule.name).to_string(),
                })
            }
            [Symbol::Nonterminal(rhs)] => {
                return Err(GrammarError::UnitRule {
                    lhs: self.nonterminal_name(rule.name).to_string(),
                    rhs: self.nonterminal_name(rhs).to_string(),
                })
            }
            [_, _] => {
                return Err(GrammarError::TerminalInPair {
                    lhs: self.nonterminal_name(rule.name).to_string(),
                })
            }
            ref symbols => {
                return Err(GrammarError::TooManySymbols {
                    lhs: self.nonterminal_name(rule.name).to_string(),
                    count: symbols.len(),
                })
            }
        };
        Ok(self.insert_rule(rule, shape))
    }

    /// Add the rule `lhs -> terminal`.
    pub fn add_terminal_rule(&mut self, lhs: NonterminalId, terminal: TerminalId) -> RuleId {
        let rule = Rule::new(lhs, vec![terminal.into()]);
        self.insert_rule(rule, Shape::Terminal(terminal))
    }

    /// Add the rule `lhs -> left right`.
    pub fn add_binary_rule(
        &mut self,
        lhs: NonterminalId,
        left: NonterminalId,
        right: NonterminalId,
    ) -> RuleId {
        let rule = Rule::new(lhs, vec![left.into(), right.into()]);
        self.insert_rule(rule, Shape::Pair(left, right))
    }

    fn insert_rule(&mut self, rule: Rule, shape: Shape) -> RuleId {
        let lhs = rule.name;
        let (index, inserted) = self.rules.insert_full(rule);
        let id = RuleId(index);
        if !inserted {
            return id;
        }
        self.nonterm_rules[lhs.as_usize()].push(id);
        let set = match shape {
            Shape::Terminal(t) => self.term_table.entry(t).or_insert_with(NonterminalSet::new),
            Shape::Pair(a, b) => self.pair_table
                .entry((a, b))
                .or_insert_with(NonterminalSet::new),
        };
        set.insert(lhs);
        id
    }

    /// The nonterminals that derive a terminal in one step.
    ///
    /// Returns the empty set if there is no such production.
    pub fn lhs_for_terminal(&self, terminal: TerminalId) -> &NonterminalSet {
        self.term_table.get(&terminal).unwrap_or(&self.empty)
    }

    /// The nonterminals that derive the sequence `left right` in one step.
    ///
    /// Returns the empty set if there is no such production.
    pub fn lhs_for_pair(&self, left: NonterminalId, right: NonterminalId) -> &NonterminalSet {
        self.pair_table.get(&(left, right)).unwrap_or(&self.empty)
    }

    /// The rules in this grammar, in the order they were added.
    pub fn rules(&self) -> set::Iter<Rule> {
        self.rules.iter()
    }

    /// The rules for a specific nonterminal in the grammar.
    pub fn rules_for_nonterminal(&self, id: NonterminalId) -> RuleIdsIter {
        self.nonterm_rules[id.as_usize()].iter()
    }

    /// Access a single rule of this grammar.
    ///
    /// Panics if the id does not belong to this grammar.
    pub fn rule(&self, id: RuleId) -> &Rule {
        self.rules
            .get_index(id.as_usize())
            .expect("rule id does not belong to this grammar")
    }
}

impl Rule {
    /// Create a new rule.
    pub fn new(name: NonterminalId, symbols: Vec<Symbol>) -> Rule {
        Rule {
            name: name,
            symbols: symbols,
        }
    }

    /// The name of this rule.
    pub fn name(&self) -> NonterminalId {
        self.name
    }

    /// The symbols in this production.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Get a pretty printer for this rule.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Rule> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ->", self.item.name.pretty(self.ctx))?;
        for symbol in &self.item.symbols {
            write!(f, " {}", symbol.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl Symbol {
    /// Get a pretty printer for this symbol.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl From<TerminalId> for Symbol {
    fn from(id: TerminalId) -> Symbol {
        Symbol::Terminal(id)
    }
}

impl From<NonterminalId> for Symbol {
    fn from(id: NonterminalId) -> Symbol {
        Symbol::Nonterminal(id)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Symbol> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.item {
            Symbol::Terminal(id) => write!(f, "'{}'", id.pretty(self.ctx)),
            Symbol::Nonterminal(id) => write!(f, "{}", id.pretty(self.ctx)),
        }
    }
}

impl NonterminalId {
    /// Create a nonterminal id from a usize.
    pub fn from_usize(id: usize) -> NonterminalId {
        NonterminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this nonterminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, NonterminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.nonterminal_name(self.item))
    }
}

impl TerminalId {
    /// Create a terminal id from a usize.
    pub fn from_usize(id: usize) -> TerminalId {
        TerminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this terminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, TerminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.terminal_name(self.item))
    }
}

impl RuleId {
    /// Create a rule id from a usize.
    pub fn from_usize(id: usize) -> RuleId {
        RuleId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl NonterminalSet {
    /// Create an empty set.
    pub fn new() -> NonterminalSet {
        NonterminalSet(BitSet::new())
    }

    /// Add a nonterminal. Returns `true` if it was not present before.
    pub fn insert(&mut self, id: NonterminalId) -> bool {
        self.0.insert(id.as_usize())
    }

    /// Check whether a nonterminal is in the set.
    pub fn contains(&self, id: NonterminalId) -> bool {
        self.0.contains(id.as_usize())
    }

    /// Add all nonterminals of another set to this one.
    pub fn union_with(&mut self, other: &NonterminalSet) {
        self.0.union_with(&other.0)
    }

    /// Check whether every nonterminal of this set is also in `other`.
    pub fn is_subset(&self, other: &NonterminalSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// The number of nonterminals in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the nonterminals in the set.
    pub fn iter(&self) -> NonterminalSetIter {
        NonterminalSetIter(self.0.iter())
    }

    /// Get a pretty printer for this set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> Iterator for NonterminalSetIter<'a> {
    type Item = NonterminalId;

    fn next(&mut self) -> Option<NonterminalId> {
        self.0.next().map(NonterminalId)
    }
}

impl<'a> IntoIterator for &'a NonterminalSet {
    type Item = NonterminalId;
    type IntoIter = NonterminalSetIter<'a>;

    fn into_iter(self) -> NonterminalSetIter<'a> {
        self.iter()
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a NonterminalSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (index, id) in self.item.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id.pretty(self.ctx))?;
        }
        write!(f, "}}")
    }
}

/// A rule that cannot be added to a grammar in Chomsky Normal Form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// The right-hand side is empty.
    EmptyRule {
        /// The rule's nonterminal.
        lhs: String,
    },
    /// The right-hand side is a single nonterminal.
    UnitRule {
        /// The rule's nonterminal.
        lhs: String,
        /// The nonterminal on the right-hand side.
        rhs: String,
    },
    /// The right-hand side has two symbols, at least one of which is a
    /// terminal.
    TerminalInPair {
        /// The rule's nonterminal.
        lhs: String,
    },
    /// The right-hand side has more than two symbols.
    TooManySymbols {
        /// The rule's nonterminal.
        lhs: String,
        /// The number of symbols on the right-hand side.
        count: usize,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GrammarError::EmptyRule { ref lhs } => {
                write!(f, "rule for `{}` has an empty right-hand side", lhs)
            }
            GrammarError::UnitRule { ref lhs, ref rhs } => write!(
                f,
                "rule `{} -> {}` rewrites into a single nonterminal",
                lhs, rhs
            ),
            GrammarError::TerminalInPair { ref lhs } => write!(
                f,
                "rule for `{}` mixes terminals into a two-symbol right-hand side",
                lhs
            ),
            GrammarError::TooManySymbols { ref lhs, count } => write!(
                f,
                "rule for `{}` has {} symbols on its right-hand side, at most 2 are allowed",
                lhs, count
            ),
        }
    }
}

impl Error for GrammarError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut g = Grammar::new();
        let a = g.add_nonterminal("A");
        assert_eq!(g.add_nonterminal("A"), a);
        let t = g.add_terminal("a");
        assert_eq!(g.add_terminal(String::from("a")), t);
        assert_eq!(g.nonterminal("A"), Some(a));
        assert_eq!(g.terminal("a"), Some(t));
        assert_eq!(g.nonterminal("a"), None);
        assert_eq!(g.nonterminal_id_bound(), 1);
        assert_eq!(g.terminal_id_bound(), 1);
    }

    #[test]
    fn terminal_and_nonterminal_names_do_not_collide() {
        let mut g = Grammar::new();
        let nt_ab = g.add_nonterminal("AB");
        let nt_a = g.add_nonterminal("A");
        let nt_b = g.add_nonterminal("B");
        let t_ab = g.add_terminal("AB");
        g.add_terminal_rule(nt_a, t_ab);
        g.add_binary_rule(nt_b, nt_a, nt_b);
        assert_eq!(g.nonterminal_name(nt_ab), g.terminal_name(t_ab));
        assert!(g.lhs_for_terminal(t_ab).contains(nt_a));
        assert!(!g.lhs_for_terminal(t_ab).contains(nt_b));
        assert!(g.lhs_for_pair(nt_a, nt_b).contains(nt_b));
        assert!(!g.lhs_for_pair(nt_a, nt_b).contains(nt_a));
    }

    #[test]
    fn absent_keys_yield_empty_sets() {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let t_a = g.add_terminal("a");
        assert!(g.lhs_for_terminal(t_a).is_empty());
        assert!(g.lhs_for_pair(nt_s, nt_s).is_empty());
    }

    #[test]
    fn rules_are_sets() {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let nt_a = g.add_nonterminal("A");
        let t_a = g.add_terminal("a");
        let r1 = g.add_terminal_rule(nt_a, t_a);
        let r2 = g.add_terminal_rule(nt_a, t_a);
        let r3 = g.add_binary_rule(nt_s, nt_a, nt_a);
        let r4 = g
            .add_rule(Rule::new(nt_s, vec![nt_a.into(), nt_a.into()]))
            .unwrap();
        assert_eq!(r1, r2);
        assert_eq!(r3, r4);
        assert_eq!(g.rules().count(), 2);
        assert_eq!(g.rules_for_nonterminal(nt_s).cloned().collect::<Vec<_>>(), vec![r3]);
        assert_eq!(g.lhs_for_terminal(t_a).len(), 1);
        assert_eq!(g.lhs_for_pair(nt_a, nt_a).len(), 1);
    }

    #[test]
    fn ambiguous_right_hand_sides() {
        let mut g = Grammar::new();
        let nt_a = g.add_nonterminal("A");
        let nt_c = g.add_nonterminal("C");
        let t_a = g.add_terminal("a");
        g.add_terminal_rule(nt_a, t_a);
        g.add_terminal_rule(nt_c, t_a);
        let set: Vec<_> = g.lhs_for_terminal(t_a).iter().collect();
        assert_eq!(set, vec![nt_a, nt_c]);
        assert_eq!(format!("{}", g.lhs_for_terminal(t_a).pretty(&g)), "{A, C}");
    }

    #[test]
    fn rejects_rules_outside_cnf() {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let nt_a = g.add_nonterminal("A");
        let t_a = g.add_terminal("a");
        assert_eq!(
            g.add_rule(Rule::new(nt_s, vec![])),
            Err(GrammarError::EmptyRule { lhs: "S".into() })
        );
        assert_eq!(
            g.add_rule(Rule::new(nt_s, vec![nt_a.into()])),
            Err(GrammarError::UnitRule {
                lhs: "S".into(),
                rhs: "A".into(),
            })
        );
        assert_eq!(
            g.add_rule(Rule::new(nt_s, vec![t_a.into(), nt_a.into()])),
            Err(GrammarError::TerminalInPair { lhs: "S".into() })
        );
        assert_eq!(
            g.add_rule(Rule::new(nt_s, vec![nt_a.into(), nt_a.into(), nt_a.into()])),
            Err(GrammarError::TooManySymbols {
                lhs: "S".into(),
                count: 3,
            })
        );
        assert_eq!(g.rules().count(), 0);
    }

    #[test]
    fn pretty_rules() {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let nt_a = g.add_nonterminal("A");
        let t_a = g.add_terminal("a");
        let r1 = g.add_binary_rule(nt_s, nt_a, nt_a);
        let r2 = g.add_terminal_rule(nt_a, t_a);
        assert_eq!(format!("{}", g.rule(r1).pretty(&g)), "S -> A A");
        assert_eq!(format!("{}", g.rule(r2).pretty(&g)), "A -> 'a'");
    }
}
