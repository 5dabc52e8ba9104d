//! Lazy token stream and containerization.
//!
//! [`tokenize`] walks a document once into a flat [`Token`] list. [`containerize`] then
//! groups that flat list into a tree: every `{`/`[`/`(` token becomes a [`Container`]
//! holding its interior tokens (themselves possibly containers), and the whole document
//! becomes an implicit root container of kind [`ContainerKind::Open`]. [`Container::slice`]
//! extracts a sub-range of a container's children as its own container, always of kind
//! `Open`, since a slice owns none of the original delimiters.
//!
//! This module is independently correct and tested against the grammar in its own
//! right, but the XJS parser does not consume its output — see the XJS parser module
//! docs for why.

use crate::error::{CoreError, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Word(String),
    Symbol(char),
    Number(f64),
    SingleQuote(String),
    DoubleQuote(String),
    TripleQuote(String),
    LineComment(String),
    HashComment(String),
    BlockComment(String),
    Break,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

/// Tokenize an entire document into a flat stream.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut reader = Reader::new(input);
    let mut tokens = Vec::new();
    while let Some(c) = reader.current() {
        let line = reader.line();
        let column = reader.column();
        let start = reader.index();
        let kind = match c {
            '\n' => {
                reader.read();
                TokenKind::Break
            }
            ' ' | '\t' | '\r' => {
                reader.skip_line_whitespace();
                continue;
            }
            '#' => {
                reader.read();
                TokenKind::HashComment(reader.read_hash_comment())
            }
            '/' if reader.remaining().starts_with("//") => {
                reader.read();
                reader.read();
                TokenKind::LineComment(reader.read_line_comment())
            }
            '/' if reader.remaining().starts_with("/*") => {
                reader.read();
                reader.read();
                TokenKind::BlockComment(reader.read_block_comment()?)
            }
            '\'' | '"' => {
                let triple: String = core::iter::repeat(c).take(3).collect();
                if reader.remaining().starts_with(triple.as_str()) {
                    reader.read();
                    reader.read();
                    reader.read();
                    let text = reader.read_multi(c)?;
                    TokenKind::TripleQuote(text)
                } else {
                    reader.read();
                    let text = reader.read_quoted(c)?;
                    if c == '\'' {
                        TokenKind::SingleQuote(text)
                    } else {
                        TokenKind::DoubleQuote(text)
                    }
                }
            }
            c if c.is_ascii_digit() || (c == '-' && starts_number(&reader)) => {
                TokenKind::Number(reader.read_number()?)
            }
            c if is_word_char(c) => {
                reader.start_capture();
                while reader.current().is_some_and(is_word_char) {
                    reader.read();
                }
                TokenKind::Word(reader.end_capture()?.to_string())
            }
            c => {
                reader.read();
                TokenKind::Symbol(c)
            }
        };
        let end = reader.index();
        tokens.push(Token {
            kind,
            start,
            end,
            line,
            column,
        });
    }
    Ok(tokens)
}

fn starts_number(reader: &Reader<'_>) -> bool {
    reader.remaining()[1..].chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Open,
    Brace,
    Bracket,
    Paren,
}

#[derive(Debug, Clone)]
pub enum Node {
    Leaf(Token),
    Container(Container),
}

#[derive(Debug, Clone)]
pub struct Container {
    pub kind: ContainerKind,
    pub children: Vec<Node>,
    pub open: Option<Token>,
    pub close: Option<Token>,
}

impl Container {
    pub fn iter(&self) -> core::slice::Iter<'_, Node> {
        self.children.iter()
    }

    /// Cut a sub-range of this container's children into a standalone container. The
    /// result is always [`ContainerKind::Open`] with no open/close tokens of its own — a
    /// slice never inherits the delimiters of the container it was cut from, the same way
    /// the document root itself is an implicit, delimiter-less container.
    pub fn slice(&self, range: impl core::ops::RangeBounds<usize>) -> Container {
        use core::ops::Bound;
        let start = match range.start_bound() {
            Bound::Included(&n) => n,
            Bound::Excluded(&n) => n + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&n) => n + 1,
            Bound::Excluded(&n) => n,
            Bound::Unbounded => self.children.len(),
        };
        Container {
            kind: ContainerKind::Open,
            children: self.children[start..end].to_vec(),
            open: None,
            close: None,
        }
    }
}

/// Group a flat token stream into a tree of containers.
pub fn containerize(tokens: Vec<Token>) -> Result<Container> {
    let mut stack: Vec<Container> = vec![Container {
        kind: ContainerKind::Open,
        children: Vec::new(),
        open: None,
        close: None,
    }];
    let mut opens: Vec<Token> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Symbol('{' | '[' | '(') => {
                let kind = match token.kind {
                    TokenKind::Symbol('{') => ContainerKind::Brace,
                    TokenKind::Symbol('[') => ContainerKind::Bracket,
                    _ => ContainerKind::Paren,
                };
                opens.push(token);
                stack.push(Container {
                    kind,
                    children: Vec::new(),
                    open: None,
                    close: None,
                });
            }
            TokenKind::Symbol('}' | ']' | ')') => {
                let closing = matching_kind(token.kind.clone());
                if stack.last().map(|c| c.kind) != Some(closing) {
                    return Err(CoreError::syntax(
                        token.line,
                        token.column,
                        "unmatched closing delimiter",
                    ));
                }
                let mut finished = stack.pop().expect("checked above");
                finished.open = opens.pop();
                finished.close = Some(token);
                stack
                    .last_mut()
                    .expect("root container never popped")
                    .children
                    .push(Node::Container(finished));
            }
            _ => {
                stack
                    .last_mut()
                    .expect("root container never popped")
                    .children
                    .push(Node::Leaf(token));
            }
        }
    }

    if stack.len() > 1 {
        let opener = opens.last().expect("unclosed container has a recorded opener");
        return Err(CoreError::syntax(
            opener.line,
            opener.column,
            "unclosed container",
        ));
    }

    Ok(stack.pop().expect("root container always present"))
}

fn matching_kind(closer: TokenKind) -> ContainerKind {
    match closer {
        TokenKind::Symbol('}') => ContainerKind::Brace,
        TokenKind::Symbol(']') => ContainerKind::Bracket,
        TokenKind::Symbol(')') => ContainerKind::Paren,
        _ => unreachable!("matching_kind only called with closing delimiters"),
    }
}
