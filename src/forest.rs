// Copyright (c) 2018 Fabian Schuiki

//! Derivation forests.
//!
//! A forest captures every way in which a nonterminal derives an input. Each
//! node stands for a nonterminal covering a span, and is present exactly once
//! no matter how many derivations share it. Nodes over a single symbol are
//! leaves, all others list every split and every pair of child nodes that
//! justify them.

use std::ops::Index;
use std::slice;
use indexmap::IndexSet;

use chart::{Chart, Span};
use grammar::{NonterminalId, TerminalId};

/// A shared derivation forest.
#[derive(Debug, Clone)]
pub struct Forest {
    keys: IndexSet<(NonterminalId, Span)>,
    nodes: Vec<ForestNode>,
}

/// A unique identifier for a node in a forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ForestNodeId(usize);

/// A nonterminal covering a span, together with its derivations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestNode {
    nonterminal: NonterminalId,
    span: Span,
    kind: NodeKind,
}

/// How a forest node is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The node covers a single input symbol.
    Leaf(TerminalId),
    /// The node covers two or more symbols, split in one of several ways.
    Branch(Vec<Derivation>),
}

/// One way of deriving a branch node from two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Derivation {
    /// The number of symbols covered by the left child.
    pub split: usize,
    /// The node covering the first `split` symbols.
    pub left: ForestNodeId,
    /// The node covering the remaining symbols.
    pub right: ForestNodeId,
}

/// An iterator over the nodes of a forest.
pub type NodesIter<'a> = slice::Iter<'a, ForestNode>;

impl Forest {
    /// Extract the forest of `start` over the entire input of a chart.
    ///
    /// Returns `None` if `start` does not derive the input.
    pub fn build(chart: &Chart, start: NonterminalId) -> Option<Forest> {
        if !chart.accepts(start) {
            return None;
        }
        let grammar = chart.grammar();
        let mut keys = IndexSet::new();
        let mut kinds = Vec::new();
        let mut todo = Vec::new();
        intern(&mut keys, &mut kinds, &mut todo, start, chart.span());

        while let Some(index) = todo.pop() {
            let (nonterminal, span) = match keys.get_index(index) {
                Some(&key) => key,
                None => unreachable!(),
            };
            if span.length == 1 {
                kinds[index] = match chart.terminal(span.start) {
                    Some(terminal) => NodeKind::Leaf(terminal),
                    None => unreachable!("nonterminal derived from unknown symbol"),
                };
                continue;
            }
            let mut derivations = Vec::new();
            for offset in 1..span.length {
                let (left_span, right_span) = span.split(offset);
                let lefts = chart.cell(left_span.start, left_span.length);
                let rights = chart.cell(right_span.start, right_span.length);
                for left in lefts {
                    for right in rights {
                        if !grammar.lhs_for_pair(left, right).contains(nonterminal) {
                            continue;
                        }
                        let left = intern(&mut keys, &mut kinds, &mut todo, left, left_span);
                        let right = intern(&mut keys, &mut kinds, &mut todo, right, right_span);
                        derivations.push(Derivation {
                            split: offset,
                            left: left,
                            right: right,
                        });
                    }
                }
            }
            trace!(
                "{} over {} has {} derivations",
                nonterminal.pretty(grammar),
                span,
                derivations.len()
            );
            kinds[index] = NodeKind::Branch(derivations);
        }

        let nodes = keys
            .iter()
            .zip(kinds.into_iter())
            .map(|(&(nonterminal, span), kind)| ForestNode {
                nonterminal: nonterminal,
                span: span,
                kind: kind,
            })
            .collect();
        let forest = Forest {
            keys: keys,
            nodes: nodes,
        };
        debug!(
            "forest of {} has {} nodes",
            start.pretty(grammar),
            forest.len()
        );
        Some(forest)
    }

    /// The node for the start symbol over the entire input.
    pub fn root(&self) -> ForestNodeId {
        ForestNodeId(0)
    }

    /// The number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Access a single node.
    pub fn node(&self, id: ForestNodeId) -> &ForestNode {
        &self.nodes[id.0]
    }

    /// The nodes of the forest. The position of a node is its ID.
    pub fn nodes(&self) -> NodesIter {
        self.nodes.iter()
    }

    /// Find the node for a nonterminal over a span.
    pub fn find(&self, nonterminal: NonterminalId, span: Span) -> Option<ForestNodeId> {
        self.keys
            .get_full(&(nonterminal, span))
            .map(|(index, _)| ForestNodeId(index))
    }

    /// Whether the input has more than one derivation tree.
    pub fn is_ambiguous(&self) -> bool {
        self.nodes.iter().any(|node| match node.kind {
            NodeKind::Branch(ref ds) => ds.len() > 1,
            NodeKind::Leaf(_) => false,
        })
    }

    /// The number of distinct derivation trees, saturating at `u64::MAX`.
    pub fn tree_count(&self) -> u64 {
        // Children always cover shorter spans than their parents.
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by_key(|&index| self.nodes[index].span.length);
        let mut counts = vec![0u64; self.nodes.len()];
        for index in order {
            counts[index] = match self.nodes[index].kind {
                NodeKind::Leaf(_) => 1,
                NodeKind::Branch(ref ds) => ds.iter().fold(0u64, |acc, d| {
                    acc.saturating_add(counts[d.left.0].saturating_mul(counts[d.right.0]))
                }),
            };
        }
        counts.get(0).cloned().unwrap_or(0)
    }
}

/// Look up the node for a nonterminal over a span, allocating it and
/// scheduling it for expansion if it does not exist yet.
fn intern(
    keys: &mut IndexSet<(NonterminalId, Span)>,
    kinds: &mut Vec<NodeKind>,
    todo: &mut Vec<usize>,
    nonterminal: NonterminalId,
    span: Span,
) -> ForestNodeId {
    let (index, inserted) = keys.insert_full((nonterminal, span));
    if inserted {
        kinds.push(NodeKind::Branch(Vec::new()));
        todo.push(index);
    }
    ForestNodeId(index)
}

impl Index<ForestNodeId> for Forest {
    type Output = ForestNode;

    fn index(&self, index: ForestNodeId) -> &ForestNode {
        self.node(index)
    }
}

impl ForestNodeId {
    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl ForestNode {
    /// The nonterminal this node derives.
    pub fn nonterminal(&self) -> NonterminalId {
        self.nonterminal
    }

    /// The span of input covered.
    pub fn span(&self) -> Span {
        self.span
    }

    /// How this node is derived.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The derivations of a branch node. Empty for leaves.
    pub fn derivations(&self) -> &[Derivation] {
        match self.kind {
            NodeKind::Branch(ref ds) => ds,
            NodeKind::Leaf(_) => &[],
        }
    }
}
