//! Scanner for the textual curve-point renderings found in proof artifacts.
//!
//! Points are embedded in free-form text. Two shapes are recognised, everything between matches
//! is skipped:
//!
//! ```text
//! g1_point := "(" uint "," uint ")"
//! fp2      := "QuadExtField(" uint "+" uint "*" "u" ")"
//! ```
//!
//! Whitespace is allowed around every token. An `fp2` element rendered as `re + im * u` is
//! canonicalised as `[im, re]`, the word order the on-chain verifier reads G2 coordinates in.

use alloy_primitives::U256;
use thiserror::Error;

#[cfg(test)]
#[path = "point_parser_test.rs"]
mod point_parser_test;

const G1_OPEN: &str = "(";
const FP2_PREFIX: &str = "QuadExtField(";
const G1_COMPONENTS: usize = 2;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SyntaxErrorKind {
    #[error("expected `{0}`")]
    Expected(char),
    #[error("expected a decimal integer")]
    ExpectedInteger,
    #[error("negative integers are not field elements")]
    NegativeInteger,
    #[error("integer {0} does not fit in 256 bits")]
    Overflow(String),
    #[error("a G1 point has 2 coordinates, found {0}")]
    G1Arity(usize),
}

/// A malformed point rendering. `position` is a byte offset into the scanned text.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind} at byte {position}")]
pub struct SyntaxError {
    pub position: usize,
    pub kind: SyntaxErrorKind,
}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// An affine point of G1.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct G1Point {
    pub x: U256,
    pub y: U256,
}

/// An element `re + im * u` of the quadratic extension field G2 is defined over.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fp2Element {
    pub re: U256,
    pub im: U256,
}

/// Conversion into the word layout consumed by the verifier contract.
pub trait CanonicalWords {
    fn canonical_words(&self) -> Vec<U256>;
}

impl CanonicalWords for G1Point {
    fn canonical_words(&self) -> Vec<U256> {
        vec![self.x, self.y]
    }
}

impl CanonicalWords for Fp2Element {
    fn canonical_words(&self) -> Vec<U256> {
        vec![self.im, self.re]
    }
}

impl<T: CanonicalWords> CanonicalWords for [T] {
    fn canonical_words(&self) -> Vec<U256> {
        self.iter().flat_map(CanonicalWords::canonical_words).collect()
    }
}

impl<T: CanonicalWords> CanonicalWords for Vec<T> {
    fn canonical_words(&self) -> Vec<U256> {
        self.as_slice().canonical_words()
    }
}

/// Returns every `(x, y)` group of `text`, in order of appearance.
pub fn parse_g1_points(text: &str) -> SyntaxResult<Vec<G1Point>> {
    let mut scanner = Scanner::new(text);
    let mut points = Vec::new();
    while let Some(open) = scanner.advance_past(G1_OPEN) {
        let components = scanner.uint_list(',', ')')?;
        let [x, y] = <[U256; G1_COMPONENTS]>::try_from(components).map_err(|components| {
            SyntaxError { position: open, kind: SyntaxErrorKind::G1Arity(components.len()) }
        })?;
        points.push(G1Point { x, y });
    }
    Ok(points)
}

/// Returns every `QuadExtField(re + im * u)` element of `text`, in order of appearance.
pub fn parse_fp2_elements(text: &str) -> SyntaxResult<Vec<Fp2Element>> {
    let mut scanner = Scanner::new(text);
    let mut elements = Vec::new();
    while scanner.advance_past(FP2_PREFIX).is_some() {
        let re = scanner.uint()?;
        scanner.expect('+')?;
        let im = scanner.uint()?;
        scanner.expect('*')?;
        scanner.expect('u')?;
        scanner.expect(')')?;
        elements.push(Fp2Element { re, im });
    }
    Ok(elements)
}

struct Scanner<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError { position: self.position, kind }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    /// Moves past the next occurrence of `pattern` and returns where it started.
    fn advance_past(&mut self, pattern: &str) -> Option<usize> {
        let start = self.position + self.rest().find(pattern)?;
        self.position = start + pattern.len();
        Some(start)
    }

    fn expect(&mut self, expected: char) -> SyntaxResult<()> {
        self.skip_whitespace();
        match self.peek() {
            Some(found) if found == expected => {
                self.position += found.len_utf8();
                Ok(())
            }
            _ => Err(self.error(SyntaxErrorKind::Expected(expected))),
        }
    }

    fn uint(&mut self) -> SyntaxResult<U256> {
        self.skip_whitespace();
        if self.peek() == Some('-') {
            return Err(self.error(SyntaxErrorKind::NegativeInteger));
        }
        let digits_len =
            self.rest().find(|c: char| !c.is_ascii_digit()).unwrap_or(self.rest().len());
        if digits_len == 0 {
            return Err(self.error(SyntaxErrorKind::ExpectedInteger));
        }
        let digits = &self.rest()[..digits_len];
        let value = U256::from_str_radix(digits, 10)
            .map_err(|_| self.error(SyntaxErrorKind::Overflow(digits.to_string())))?;
        self.position += digits_len;
        Ok(value)
    }

    /// Parses `uint (separator uint)* terminator`.
    fn uint_list(&mut self, separator: char, terminator: char) -> SyntaxResult<Vec<U256>> {
        let mut values = vec![self.uint()?];
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(c) if c == separator => {
                    self.position += c.len_utf8();
                    values.push(self.uint()?);
                }
                Some(c) if c == terminator => {
                    self.position += c.len_utf8();
                    return Ok(values);
                }
                _ => return Err(self.error(SyntaxErrorKind::Expected(terminator))),
            }
        }
    }
}
