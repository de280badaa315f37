//! Line based N-Triples reader and writer.

use std::fmt::Write;

use crate::error::DecodeError;
use crate::graph::{GraphDecoder, Literal, Term, Triple, TripleGraph};

/// Decoder for `application/n-triples`
#[derive(Debug, Default, Clone, Copy)]
pub struct NTriplesDecoder;

impl GraphDecoder for NTriplesDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<TripleGraph, DecodeError> {
        let text =
            std::str::from_utf8(bytes).map_err(|err| DecodeError::Encoding(err.to_string()))?;
        parse(text)
    }
}

/// Parse an N-Triples document
pub fn parse(text: &str) -> Result<TripleGraph, DecodeError> {
    let mut graph = TripleGraph::new();
    for (idx, line) in text.lines().enumerate() {
        let mut cursor = Cursor::new(line, idx + 1);
        cursor.skip_whitespace();
        if cursor.at_end() || cursor.peek() == Some('#') {
            continue;
        }
        graph.insert(cursor.triple()?);
    }
    Ok(graph)
}

struct Cursor<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(rest: &'a str, line: usize) -> Self {
        Self { rest, line }
    }

    fn error(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.rest.is_empty()
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t']);
    }

    fn expect(&mut self, expected: char) -> Result<(), DecodeError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}' but found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}' but reached end of line", expected))),
        }
    }

    fn triple(&mut self) -> Result<Triple, DecodeError> {
        let subject = match self.peek() {
            Some('<') => Term::Iri(self.iri()?),
            Some('_') => Term::BlankNode(self.blank_node()?),
            _ => return Err(self.error("subject must be an IRI or a blank node")),
        };
        self.skip_whitespace();
        if self.peek() != Some('<') {
            return Err(self.error("predicate must be an IRI"));
        }
        let predicate = self.iri()?;
        self.skip_whitespace();
        let object = match self.peek() {
            Some('<') => Term::Iri(self.iri()?),
            Some('_') => Term::BlankNode(self.blank_node()?),
            Some('"') => Term::Literal(self.literal()?),
            _ => return Err(self.error("object must be an IRI, a blank node or a literal")),
        };
        self.skip_whitespace();
        self.expect('.')?;
        self.skip_whitespace();
        if !self.at_end() && self.peek() != Some('#') {
            return Err(self.error(format!("unexpected content after statement: '{}'", self.rest)));
        }
        Ok(Triple::new(subject, predicate, object))
    }

    fn iri(&mut self) -> Result<String, DecodeError> {
        self.expect('<')?;
        let rest = self.rest;
        let end = rest.find('>').ok_or_else(|| self.error("unterminated IRI"))?;
        let iri = &rest[..end];
        if iri.is_empty() || iri.contains(char::is_whitespace) {
            return Err(self.error(format!("invalid IRI '<{}>'", iri)));
        }
        self.rest = &rest[end + 1..];
        Ok(iri.to_string())
    }

    fn blank_node(&mut self) -> Result<String, DecodeError> {
        self.expect('_')?;
        self.expect(':')?;
        let rest = self.rest;
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')))
            .unwrap_or(rest.len());
        // a trailing '.' terminates the statement, it is not part of the label
        let label = rest[..end].trim_end_matches('.');
        if label.is_empty() {
            return Err(self.error("empty blank node label"));
        }
        self.rest = &rest[label.len()..];
        Ok(label.to_string())
    }

    fn literal(&mut self) -> Result<Literal, DecodeError> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated literal")),
                Some('"') => break,
                Some('\\') => value.push(self.escape()?),
                Some(c) => value.push(c),
            }
        }

        let mut literal = Literal::plain(value);
        match self.peek() {
            Some('@') => {
                self.bump();
                let rest = self.rest;
                let end = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                    .unwrap_or(rest.len());
                if end == 0 {
                    return Err(self.error("empty language tag"));
                }
                literal.language = Some(rest[..end].to_string());
                self.rest = &rest[end..];
            }
            Some('^') => {
                self.expect('^')?;
                self.expect('^')?;
                literal.datatype = Some(self.iri()?);
            }
            _ => {}
        }
        Ok(literal)
    }

    fn escape(&mut self) -> Result<char, DecodeError> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{8}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.unicode_escape(4),
            Some('U') => self.unicode_escape(8),
            Some(c) => Err(self.error(format!("invalid escape sequence '\\{}'", c))),
            None => Err(self.error("unterminated escape sequence")),
        }
    }

    fn unicode_escape(&mut self, digits: usize) -> Result<char, DecodeError> {
        let rest = self.rest;
        let hex = rest
            .get(..digits)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.error(format!("invalid unicode escape '{}'", hex)));
        }
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| self.error(format!("invalid unicode escape '{}'", hex)))?;
        let c = char::from_u32(code)
            .ok_or_else(|| self.error(format!("invalid code point U+{:X}", code)))?;
        self.rest = &rest[digits..];
        Ok(c)
    }
}

/// Serialize a graph as N-Triples, one statement per line
pub fn write(graph: &TripleGraph) -> String {
    let mut out = String::new();
    for triple in graph.iter() {
        let _ = writeln!(
            out,
            "{} <{}> {} .",
            term(&triple.subject),
            triple.predicate,
            term(&triple.object)
        );
    }
    out
}

fn term(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("<{}>", iri),
        Term::BlankNode(label) => format!("_:{}", label),
        Term::Literal(literal) => {
            let mut out = String::with_capacity(literal.value.len() + 2);
            out.push('"');
            for c in literal.value.chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    c => out.push(c),
                }
            }
            out.push('"');
            if let Some(language) = &literal.language {
                out.push('@');
                out.push_str(language);
            } else if let Some(datatype) = &literal.datatype {
                out.push_str("^^<");
                out.push_str(datatype);
                out.push('>');
            }
            out
        }
    }
}
