// Copyright (c) 2018 Fabian Schuiki

//! The CYK chart.
//!
//! A chart records, for every span of the input, the set of nonterminals that
//! derive the symbols covered by that span. It is filled bottom-up by span
//! length: the cells of length one are looked up directly in the grammar's
//! terminal productions, and each longer cell is the union over all ways of
//! splitting its span in two and all pairs of nonterminals already derived
//! for the two halves. All cells of one length only depend on shorter cells,
//! so each length tier is completed before the next one is started.

use std::fmt;

use forest::Forest;
use grammar::{Grammar, NonterminalId, NonterminalSet, TerminalId};
use Pretty;

/// A parser that fills charts for a fixed grammar.
///
/// The parser only borrows the grammar, so any number of parsers can share
/// one grammar, including across threads.
#[derive(Debug, Clone, Copy)]
pub struct ChartParser<'g> {
    grammar: &'g Grammar,
}

/// A completed chart for one input sequence.
#[derive(Debug, Clone)]
pub struct Chart<'g> {
    grammar: &'g Grammar,
    symbols: Vec<String>,
    terminals: Vec<Option<TerminalId>>,
    separator: &'static str,
    /// Flat arena of cells, indexed by `start * (n + 1) + length`.
    cells: Vec<NonterminalSet>,
    empty: NonterminalSet,
}

/// A contiguous range of input symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// The index of the first symbol covered.
    pub start: usize,
    /// The number of symbols covered.
    pub length: usize,
}

/// A non-empty chart cell, as reported by `Chart::dump`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDump {
    /// The index of the first symbol covered by the cell.
    pub start: usize,
    /// The number of symbols covered by the cell.
    pub length: usize,
    /// The covered input symbols.
    pub substring: String,
    /// The nonterminals deriving the covered symbols, in increasing ID order.
    pub nonterminals: Vec<NonterminalId>,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, length: usize) -> Span {
        Span {
            start: start,
            length: length,
        }
    }

    /// The index one past the last symbol covered.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Split the span after `offset` symbols.
    pub fn split(&self, offset: usize) -> (Span, Span) {
        (
            Span::new(self.start, offset),
            Span::new(self.start + offset, self.length - offset),
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}+{}", self.start, self.length)
    }
}

impl<'g> ChartParser<'g> {
    /// Create a new parser for a grammar.
    pub fn new(grammar: &'g Grammar) -> ChartParser<'g> {
        ChartParser { grammar: grammar }
    }

    /// The grammar this parser uses.
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Fill a chart for a sequence of input symbols.
    ///
    /// Each symbol is looked up by name among the grammar's terminals. Symbols
    /// the grammar does not know are not derived by any nonterminal.
    pub fn parse<S: AsRef<str>>(&self, input: &[S]) -> Chart<'g> {
        let symbols = input.iter().map(|s| s.as_ref().to_string()).collect();
        self.build(symbols, " ")
    }

    /// Fill a chart for a string, treating every character as one symbol.
    pub fn parse_chars(&self, input: &str) -> Chart<'g> {
        let symbols = input.chars().map(|c| c.to_string()).collect();
        self.build(symbols, "")
    }

    /// Check whether `start` derives the entire input.
    ///
    /// The empty input is never accepted.
    pub fn accepts<S: AsRef<str>>(&self, input: &[S], start: NonterminalId) -> bool {
        self.parse(input).accepts(start)
    }

    /// Compute the derivation forest of `start` over the entire input.
    ///
    /// Returns `None` if the input is rejected.
    pub fn forest_for<S: AsRef<str>>(&self, input: &[S], start: NonterminalId) -> Option<Forest> {
        self.parse(input).forest(start)
    }

    fn build(&self, symbols: Vec<String>, separator: &'static str) -> Chart<'g> {
        let n = symbols.len();
        let terminals = symbols
            .iter()
            .map(|s| self.grammar.terminal(s))
            .collect();
        let mut chart = Chart {
            grammar: self.grammar,
            symbols: symbols,
            terminals: terminals,
            separator: separator,
            cells: vec![NonterminalSet::new(); n * (n + 1)],
            empty: NonterminalSet::new(),
        };

        // Spans of length one are derived directly from the terminals.
        for start in 0..n {
            if let Some(terminal) = chart.terminals[start] {
                let index = chart.index(start, 1);
                chart.cells[index] = self.grammar.lhs_for_terminal(terminal).clone();
            }
        }

        // Longer spans only read shorter ones. Compute a whole tier before
        // storing it.
        for length in 2..n + 1 {
            let tier: Vec<NonterminalSet> = (0..n - length + 1)
                .map(|start| chart.derive(Span::new(start, length)))
                .collect();
            for (start, cell) in tier.into_iter().enumerate() {
                let index = chart.index(start, length);
                chart.cells[index] = cell;
            }
        }

        debug!(
            "filled chart for {} symbols, {} non-empty cells",
            n,
            chart.cells.iter().filter(|c| !c.is_empty()).count()
        );
        chart
    }
}

impl<'g> Chart<'g> {
    fn index(&self, start: usize, length: usize) -> usize {
        start * (self.symbols.len() + 1) + length
    }

    /// Compute the nonterminals covering a span from the cells of its
    /// shorter sub-spans.
    fn derive(&self, span: Span) -> NonterminalSet {
        let mut cell = NonterminalSet::new();
        for offset in 1..span.length {
            let (left_span, right_span) = span.split(offset);
            let lefts = self.cell(left_span.start, left_span.length);
            let rights = self.cell(right_span.start, right_span.length);
            for left in lefts {
                for right in rights {
                    cell.union_with(self.grammar.lhs_for_pair(left, right));
                }
            }
        }
        if !cell.is_empty() {
            trace!("cell {}: {}", span, cell.pretty(self.grammar));
        }
        cell
    }

    /// The grammar this chart was filled with.
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// The number of input symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the input was empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The input symbols.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// The terminal at an input position, if the grammar knows the symbol.
    pub fn terminal(&self, position: usize) -> Option<TerminalId> {
        self.terminals.get(position).and_then(|&t| t)
    }

    /// The nonterminals deriving the `length` symbols at `start`.
    ///
    /// Spans of length zero or reaching past the end of the input yield the
    /// empty set.
    pub fn cell(&self, start: usize, length: usize) -> &NonterminalSet {
        if length == 0 || start + length > self.len() {
            return &self.empty;
        }
        &self.cells[self.index(start, length)]
    }

    /// The whole input.
    pub fn span(&self) -> Span {
        Span::new(0, self.len())
    }

    /// The input symbols covered by a span, joined into one string.
    pub fn substring(&self, span: Span) -> String {
        let end = span.end().min(self.len());
        let start = span.start.min(end);
        self.symbols[start..end].join(self.separator)
    }

    /// Check whether `start` derives the entire input.
    pub fn accepts(&self, start: NonterminalId) -> bool {
        !self.is_empty() && self.cell(0, self.len()).contains(start)
    }

    /// Extract the derivation forest of `start` over the entire input.
    ///
    /// Returns `None` if the input is rejected.
    pub fn forest(&self, start: NonterminalId) -> Option<Forest> {
        Forest::build(self, start)
    }

    /// List all non-empty cells, ordered by start and then by length.
    pub fn dump(&self) -> Vec<CellDump> {
        let n = self.len();
        let mut cells = Vec::new();
        for start in 0..n {
            for length in 1..n - start + 1 {
                let cell = self.cell(start, length);
                if cell.is_empty() {
                    continue;
                }
                cells.push(CellDump {
                    start: start,
                    length: length,
                    substring: self.substring(Span::new(start, length)),
                    nonterminals: cell.iter().collect(),
                });
            }
        }
        cells
    }

    /// Get a pretty printer for this chart.
    pub fn pretty(&self) -> Pretty<&'g Grammar, &Self> {
        Pretty::new(self.grammar, self)
    }
}

impl<'a, 'g> fmt::Display for Pretty<&'g Grammar, &'a Chart<'g>> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let dump = self.item.dump();
        for (index, cell) in dump.iter().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(f, "{}+{} \"{}\": {{", cell.start, cell.length, cell.substring)?;
            for (i, &nt) in cell.nonterminals.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", nt.pretty(self.ctx))?;
            }
            write!(f, "}}")?;
        }
        if dump.is_empty() {
            write!(f, "<empty>")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S -> A B | B C; A -> B A | a; B -> C C | b; C -> A B | a
    fn textbook() -> (Grammar, [NonterminalId; 4]) {
        let mut g = Grammar::new();
        let s = g.add_nonterminal("S");
        let a = g.add_nonterminal("A");
        let b = g.add_nonterminal("B");
        let c = g.add_nonterminal("C");
        let ta = g.add_terminal("a");
        let tb = g.add_terminal("b");
        g.add_binary_rule(s, a, b);
        g.add_binary_rule(s, b, c);
        g.add_binary_rule(a, b, a);
        g.add_terminal_rule(a, ta);
        g.add_binary_rule(b, c, c);
        g.add_terminal_rule(b, tb);
        g.add_binary_rule(c, a, b);
        g.add_terminal_rule(c, ta);
        (g, [s, a, b, c])
    }

    fn ids(set: &NonterminalSet) -> Vec<NonterminalId> {
        set.iter().collect()
    }

    #[test]
    fn textbook_cells() {
        let (g, [s, a, b, c]) = textbook();
        let chart = ChartParser::new(&g).parse_chars("baaba");
        assert_eq!(ids(chart.cell(0, 1)), vec![b]);
        assert_eq!(ids(chart.cell(1, 1)), vec![a, c]);
        assert_eq!(ids(chart.cell(0, 2)), vec![s, a]);
        assert_eq!(ids(chart.cell(1, 2)), vec![b]);
        assert_eq!(ids(chart.cell(2, 2)), vec![s, c]);
        assert!(chart.cell(0, 3).is_empty());
        assert_eq!(ids(chart.cell(1, 3)), vec![b]);
        assert_eq!(ids(chart.cell(2, 3)), vec![b]);
        assert!(chart.cell(0, 4).is_empty());
        assert_eq!(ids(chart.cell(1, 4)), vec![s, a, c]);
        assert_eq!(ids(chart.cell(0, 5)), vec![s, a, c]);
        assert!(chart.accepts(s));
    }

    #[test]
    fn rejects_bbbbb() {
        let (g, [s, _, b, _]) = textbook();
        let chart = ChartParser::new(&g).parse_chars("bbbbb");
        assert!(!chart.accepts(s));
        for start in 0..5 {
            assert_eq!(ids(chart.cell(start, 1)), vec![b]);
            for length in 2..6 - start {
                assert!(chart.cell(start, length).is_empty());
            }
        }
    }

    #[test]
    fn empty_input() {
        let (g, [s, a, b, c]) = textbook();
        let parser = ChartParser::new(&g);
        let chart = parser.parse_chars("");
        assert!(chart.is_empty());
        for &nt in &[s, a, b, c] {
            assert!(!chart.accepts(nt));
        }
        assert!(chart.dump().is_empty());
        assert!(chart.forest(s).is_none());
        assert!(!parser.accepts::<&str>(&[], s));
    }

    #[test]
    fn out_of_range_cells_are_empty() {
        let (g, _) = textbook();
        let chart = ChartParser::new(&g).parse_chars("ab");
        assert!(chart.cell(0, 0).is_empty());
        assert!(chart.cell(1, 2).is_empty());
        assert!(chart.cell(7, 1).is_empty());
    }

    #[test]
    fn unknown_symbols_are_not_derived() {
        let (g, [s, _, _, _]) = textbook();
        let chart = ChartParser::new(&g).parse(&["b", "x", "a"]);
        assert_eq!(chart.terminal(1), None);
        assert!(chart.cell(1, 1).is_empty());
        assert!(chart.cell(0, 2).is_empty());
        assert!(!chart.accepts(s));
    }

    #[test]
    fn dump_is_row_major() {
        let (g, [s, a, b, _]) = textbook();
        let chart = ChartParser::new(&g).parse_chars("baaba");
        let dump = chart.dump();
        assert_eq!(dump.len(), 13);
        assert_eq!(
            dump[0],
            CellDump {
                start: 0,
                length: 1,
                substring: "b".into(),
                nonterminals: vec![b],
            }
        );
        assert_eq!(
            dump[1],
            CellDump {
                start: 0,
                length: 2,
                substring: "ba".into(),
                nonterminals: vec![s, a],
            }
        );
        assert_eq!(dump[2].length, 5);
        assert_eq!(dump[2].substring, "baaba");
        let order: Vec<_> = dump.iter().map(|c| (c.start, c.length)).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn token_substrings_are_space_separated() {
        let (g, _) = textbook();
        let chart = ChartParser::new(&g).parse(&["b", "a"]);
        assert_eq!(chart.substring(chart.span()), "b a");
        assert_eq!(
            format!("{}", chart.pretty()),
            "0+1 \"b\": {B}\n0+2 \"b a\": {S, A}\n1+1 \"a\": {A, C}"
        );
    }

    #[test]
    fn spans() {
        let span = Span::new(2, 5);
        assert_eq!(span.end(), 7);
        assert_eq!(span.split(2), (Span::new(2, 2), Span::new(4, 3)));
        assert_eq!(format!("{}", span), "2+5");
    }
}
