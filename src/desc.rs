// Copyright (c) 2018 Fabian Schuiki

//! A parser for grammar descriptions.
//!
//! A description lists the rules of a grammar in Chomsky Normal Form, with
//! alternatives separated by `|`. Bare identifiers name nonterminals, quoted
//! identifiers name terminals. An optional `start` declaration selects the
//! start symbol; otherwise the first rule's nonterminal is used.
//!
//! ```text
//! start S;
//! S : A B | B C ;
//! A : B A | 'a' ;
//! B : C C | 'b' ;
//! C : A B | 'a' ;
//! ```

use std::error::Error;
use std::fmt;
use std::str::CharIndices;

use grammar::{Grammar, GrammarError, NonterminalId, Rule, Symbol};
use lexer::{Keyword, Lexer, Token};

/// A grammar loaded from a description.
#[derive(Debug, Clone)]
pub struct Description {
    /// The grammar.
    pub grammar: Grammar,
    /// The start symbol, if the description declares one or has any rules.
    pub start: Option<NonterminalId>,
}

/// An error encountered while loading a grammar description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescError {
    /// The description is malformed.
    Syntax {
        /// The byte offset at which the error was detected.
        offset: usize,
        /// What went wrong.
        message: String,
    },
    /// A rule is not in Chomsky Normal Form.
    Grammar(GrammarError),
}

impl fmt::Display for DescError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DescError::Syntax {
                offset,
                ref message,
            } => write!(f, "syntax error at offset {}: {}", offset, message),
            DescError::Grammar(ref err) => write!(f, "invalid rule: {}", err),
        }
    }
}

impl Error for DescError {}

impl From<GrammarError> for DescError {
    fn from(err: GrammarError) -> DescError {
        DescError::Grammar(err)
    }
}

/// Parse a grammar description.
pub fn parse(input: &str) -> Result<Description, DescError> {
    let mut parser = Parser {
        tokens: Lexer::new(input.char_indices()),
        end: input.len(),
        grammar: Grammar::new(),
        start: None,
        first: None,
    };
    parser.parse_desc()?;
    let start = parser.start.or(parser.first);
    Ok(Description {
        grammar: parser.grammar,
        start: start,
    })
}

struct Parser<'a> {
    tokens: Lexer<CharIndices<'a>>,
    end: usize,
    grammar: Grammar,
    start: Option<NonterminalId>,
    first: Option<NonterminalId>,
}

impl<'a> Parser<'a> {
    fn parse_desc(&mut self) -> Result<(), DescError> {
        while let Some((offset, _, token)) = self.tokens.next() {
            match token {
                Token::Semicolon => (),
                Token::Keyword(Keyword::Start) => {
                    let name = self.expect_ident("start symbol")?;
                    self.expect(Token::Semicolon, "`;`")?;
                    let id = self.grammar.add_nonterminal(name);
                    self.start = Some(id);
                }
                Token::Ident(name) => {
                    let lhs = self.grammar.add_nonterminal(name);
                    if self.first.is_none() {
                        self.first = Some(lhs);
                    }
                    self.expect(Token::Colon, "`:`")?;
                    self.parse_alternatives(lhs)?;
                }
                other => return Err(unexpected(offset, &other, "rule or `start` declaration")),
            }
        }
        Ok(())
    }

    /// Parse `seq ('|' seq)* ';'` and add one rule per sequence.
    fn parse_alternatives(&mut self, lhs: NonterminalId) -> Result<(), DescError> {
        let mut symbols = Vec::new();
        loop {
            let (offset, _, token) = match self.tokens.next() {
                Some(x) => x,
                None => return Err(self.eof("`;`")),
            };
            let last = token == Token::Semicolon;
            match token {
                Token::Ident(name) => symbols.push(Symbol::from(self.grammar.add_nonterminal(name))),
                Token::Terminal(name) => symbols.push(Symbol::from(self.grammar.add_terminal(name))),
                Token::Pipe | Token::Semicolon => {
                    let rule = Rule::new(lhs, symbols.drain(..).collect());
                    let id = self.grammar.add_rule(rule)?;
                    trace!("added rule {}", self.grammar.rule(id).pretty(&self.grammar));
                    if last {
                        return Ok(());
                    }
                }
                other => return Err(unexpected(offset, &other, "symbol, `|` or `;`")),
            }
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, DescError> {
        match self.tokens.next() {
            Some((_, _, Token::Ident(name))) => Ok(name),
            Some((offset, _, other)) => Err(unexpected(offset, &other, what)),
            None => Err(self.eof(what)),
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), DescError> {
        match self.tokens.next() {
            Some((_, _, ref token)) if *token == expected => Ok(()),
            Some((offset, _, other)) => Err(unexpected(offset, &other, what)),
            None => Err(self.eof(what)),
        }
    }

    fn eof(&self, what: &str) -> DescError {
        DescError::Syntax {
            offset: self.end,
            message: format!("expected {}, found end of input", what),
        }
    }
}

fn unexpected(offset: usize, token: &Token, what: &str) -> DescError {
    let found = match *token {
        Token::Keyword(Keyword::Start) => "keyword `start`".to_string(),
        Token::Ident(ref name) => format!("`{}`", name),
        Token::Terminal(ref name) => format!("`'{}'`", name),
        Token::Unterminated(_) => "unterminated quote".to_string(),
        Token::Colon => "`:`".to_string(),
        Token::Semicolon => "`;`".to_string(),
        Token::Pipe => "`|`".to_string(),
    };
    DescError::Syntax {
        offset: offset,
        message: format!("expected {}, found {}", what, found),
    }
}
