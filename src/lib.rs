// Copyright (c) 2018 Fabian Schuiki

//! A CYK recognizer for grammars in Chomsky Normal Form.
//!
//! Build a `grammar::Grammar`, either programmatically or from a textual
//! description via `desc::parse`, then fill a `chart::Chart` for an input with
//! a `chart::ChartParser`. The chart answers whether a nonterminal derives
//! the input and yields a shared `forest::Forest` of all derivations.

#![deny(missing_docs)]

extern crate bit_set;
extern crate indexmap;
#[macro_use]
extern crate log;

pub mod analysis;
pub mod chart;
pub mod desc;
pub mod forest;
pub mod grammar;
pub mod lexer;

/// A pretty printer.
pub struct Pretty<C, T> {
    ctx: C,
    item: T,
}

impl<C, T> Pretty<C, T> {
    pub(crate) fn new(ctx: C, item: T) -> Pretty<C, T> {
        Pretty { ctx, item }
    }
}
