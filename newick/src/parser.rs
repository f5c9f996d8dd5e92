use std::str::FromStr;

use crate::error::NewickError;
use crate::tree::{NodeId, PhyloTree};

const NHX_PREFIX: &str = "&&NHX";

/// Parse a Newick (optionally NHX annotated) string into a tree.
///
/// Internal labels that are numbers are read as support values, anything else as a name.
pub fn parse(text: &str) -> Result<PhyloTree, NewickError> {
    let mut parser = Parser { text, pos: 0 };
    let mut tree = PhyloTree::new();

    parser.skip_whitespace();
    if parser.peek().is_none() {
        return Err(NewickError::Empty);
    }

    let root = tree.root();
    parser.parse_subtree(&mut tree, root)?;

    parser.skip_whitespace();
    if parser.peek() == Some(b';') {
        parser.pos += 1;
        parser.skip_whitespace();
    }

    match parser.peek() {
        None => Ok(tree),
        Some(_) => Err(parser.unexpected()),
    }
}

impl FromStr for PhyloTree {
    type Err = NewickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> NewickError {
        match self.text[self.pos..].chars().next() {
            Some(ch) => NewickError::UnexpectedChar { ch, pos: self.pos },
            None => NewickError::UnexpectedEnd {
                expected: "more input",
            },
        }
    }

    fn parse_subtree(&mut self, tree: &mut PhyloTree, node: NodeId) -> Result<(), NewickError> {
        self.skip_whitespace();
        let internal = self.peek() == Some(b'(');

        if internal {
            self.pos += 1;
            loop {
                let child = tree.add_child(node, "");
                self.parse_subtree(tree, child)?;

                self.skip_whitespace();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    Some(_) => return Err(self.unexpected()),
                    None => {
                        return Err(NewickError::UnexpectedEnd {
                            expected: "',' or ')'",
                        });
                    }
                }
            }
        }

        self.parse_label(tree, node, internal)
    }

    fn parse_label(
        &mut self,
        tree: &mut PhyloTree,
        node: NodeId,
        internal: bool,
    ) -> Result<(), NewickError> {
        self.skip_whitespace();

        let (label, quoted) = if self.peek() == Some(b'\'') {
            (self.read_quoted()?, true)
        } else {
            (self.read_unquoted().trim().to_string(), false)
        };

        if !label.is_empty() {
            match label.parse::<f64>() {
                Ok(support) if internal && !quoted => tree.node_mut(node).support = support,
                _ => tree.set_name(node, label),
            }
        }

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b':') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    let start = self.pos;
                    let value = self.read_unquoted().trim();
                    tree.node_mut(node).dist =
                        value.parse().map_err(|_| NewickError::InvalidNumber {
                            value: value.to_string(),
                            pos: start,
                        })?;
                }
                Some(b'[') => self.parse_comment(tree, node)?,
                _ => return Ok(()),
            }
        }
    }

    /// Read up to the next structural character
    fn read_unquoted(&mut self) -> &'a str {
        let text = self.text;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, b'(' | b')' | b',' | b':' | b';' | b'[') {
                break;
            }
            self.pos += 1;
        }
        &text[start..self.pos]
    }

    /// Read a single quoted label; two consecutive quotes stand for one
    fn read_quoted(&mut self) -> Result<String, NewickError> {
        let text = self.text;
        self.pos += 1;
        let mut label = String::new();

        loop {
            let rest = &text[self.pos..];
            match rest.find('\'') {
                Some(end) => {
                    label.push_str(&rest[..end]);
                    self.pos += end + 1;
                    if self.peek() == Some(b'\'') {
                        label.push('\'');
                        self.pos += 1;
                    } else {
                        return Ok(label);
                    }
                }
                None => {
                    return Err(NewickError::UnexpectedEnd {
                        expected: "closing quote",
                    });
                }
            }
        }
    }

    /// Bracket comments are skipped, except NHX blocks which become node features
    fn parse_comment(&mut self, tree: &mut PhyloTree, node: NodeId) -> Result<(), NewickError> {
        let text = self.text;
        let rest = &text[self.pos + 1..];
        let end = rest.find(']').ok_or(NewickError::UnexpectedEnd {
            expected: "']'",
        })?;
        let comment = &rest[..end];
        self.pos += end + 2;

        if let Some(pairs) = comment.strip_prefix(NHX_PREFIX) {
            for pair in pairs.split(':').filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some((key, value)) => tree.set_feature(node, key.trim(), value),
                    None => tree.set_feature(node, pair.trim(), ""),
                }
            }
        }

        Ok(())
    }
}
