//! Parser for SVG path data.
//!
//! This is a recursive descent parser for the [path data grammar][bnf].  Some
//! peculiarities of the grammar:
//!
//! * Commas are optional between numbers and between coordinate pairs, so
//!   `M 10 20 30 40`, `M 10,20 30,40` and `M10,20,30,40` are all the same.
//!
//! * Whitespace is optional where a number's sign or decimal point can separate it
//!   from the previous one: `M-10,20-30-40` and `M.1-2,3E2-4` are valid.
//!
//! * Arc flags are a single `0` or `1` and need no separator, so `a1 1 0 00 10 10`
//!   and `a1 1 0 0010 10` mean the same.
//!
//! [bnf]: https://www.w3.org/TR/SVG/paths.html#PathDataBNF

use std::fmt;
use std::str;

use crate::path_builder::*;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Token {
    Number(f64),
    Flag(bool),
    Command(u8),
    Comma,
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum LexError {
    ParseFloatError,
    UnexpectedByte(u8),
    UnexpectedEof,
}

/// Splits path data into tokens.
///
/// The lexer cannot tell flags from numbers on its own; the parser calls
/// [`Lexer::require_flags`] when it gets to the flags of an arc.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    flags_required: u8,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input: input.as_bytes(),
            pos: 0,
            flags_required: 0,
        }
    }

    pub fn require_flags(&mut self) {
        self.flags_required = 2;
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_while(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        let start = self.pos;
        while self.peek().map_or(false, &pred) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn skip_one_of(&mut self, bytes: &[u8]) -> bool {
        match self.peek() {
            Some(c) if bytes.contains(&c) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn lex_number(&mut self) -> Result<Token, LexError> {
        let start = self.pos;

        self.skip_one_of(b"+-");
        let int_digits = self.skip_while(|c| c.is_ascii_digit());
        let frac_digits = self.skip_one_of(b".") && self.skip_while(|c| c.is_ascii_digit());

        if !int_digits && !frac_digits {
            return match self.peek() {
                Some(c) => Err(LexError::UnexpectedByte(c)),
                None => Err(LexError::UnexpectedEof),
            };
        }

        // An exponent needs digits; "2e" is the number 2 followed by garbage.
        let before_exp = self.pos;
        if self.skip_one_of(b"eE") {
            self.skip_one_of(b"+-");
            if !self.skip_while(|c| c.is_ascii_digit()) {
                self.pos = before_exp;
            }
        }

        str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .map(Token::Number)
            .ok_or(LexError::ParseFloatError)
    }
}

impl Iterator for Lexer<'_> {
    type Item = (usize, Result<Token, LexError>);

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_while(|c| c.is_ascii_whitespace());

        let pos = self.pos;
        let c = self.peek()?;

        let token = match c {
            b',' => {
                self.pos += 1;
                Ok(Token::Comma)
            }

            c if c.is_ascii_alphabetic() => {
                self.pos += 1;
                Ok(Token::Command(c))
            }

            b'0' | b'1' if self.flags_required > 0 => {
                self.flags_required -= 1;
                self.pos += 1;
                Ok(Token::Flag(c == b'1'))
            }

            c if self.flags_required > 0 => {
                self.pos += 1;
                Err(LexError::UnexpectedByte(c))
            }

            c if c.is_ascii_digit() || matches!(c, b'-' | b'+' | b'.') => self.lex_number(),

            c => {
                self.pos += 1;
                Err(LexError::UnexpectedByte(c))
            }
        };

        Some((pos, token))
    }
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    UnexpectedToken(Token),
    UnexpectedCommand(u8),
    UnexpectedEof,
    LexError(LexError),
}

#[derive(Debug, PartialEq)]
pub struct ParseError {
    pub position: usize,
    pub kind: ErrorKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self.kind {
            ErrorKind::UnexpectedToken(_) => "unexpected token",
            ErrorKind::UnexpectedCommand(_) => "unexpected command",
            ErrorKind::UnexpectedEof => "unexpected end of data",
            ErrorKind::LexError(_) => "error processing token",
        };
        write!(f, "error at position {}: {}", self.position, description)
    }
}

/// Parses path data into a [`PathBuilder`].
///
/// Commands are emitted as soon as all of their arguments are parsed, so that on an
/// error the builder holds everything up to the last complete command.
pub struct PathParser<'b> {
    tokens: Lexer<'b>,
    lookahead: Option<(usize, Result<Token, LexError>)>,
    input_len: usize,

    builder: &'b mut PathBuilder,

    current: (f64, f64),
    subpath_start: (f64, f64),

    // Control point to reflect for smooth curves; equal to the current point
    // when the previous command was not a curve of the same kind.
    cubic_reflection: (f64, f64),
    quadratic_reflection: (f64, f64),
}

impl<'b> PathParser<'b> {
    pub fn new(builder: &'b mut PathBuilder, path_str: &'b str) -> PathParser<'b> {
        let mut tokens = Lexer::new(path_str);
        let lookahead = tokens.next();

        PathParser {
            tokens,
            lookahead,
            input_len: path_str.len(),
            builder,
            current: (0.0, 0.0),
            subpath_start: (0.0, 0.0),
            cubic_reflection: (0.0, 0.0),
            quadratic_reflection: (0.0, 0.0),
        }
    }

    /// Parses all of the path data; empty data is a valid, empty path.
    pub fn parse(&mut self) -> Result<(), ParseError> {
        while self.lookahead.is_some() {
            self.moveto()?;
            while self.drawto_command()? {}
        }

        Ok(())
    }

    fn advance(&mut self) {
        self.lookahead = self.tokens.next();
    }

    fn unexpected(&self) -> ParseError {
        match self.lookahead {
            Some((position, Ok(t))) => ParseError {
                position,
                kind: ErrorKind::UnexpectedToken(t),
            },
            Some((position, Err(e))) => ParseError {
                position,
                kind: ErrorKind::LexError(e),
            },
            None => ParseError {
                position: self.input_len,
                kind: ErrorKind::UnexpectedEof,
            },
        }
    }

    // The match_* methods either consume the requested token and return its value,
    // or return an error without advancing.

    fn match_number(&mut self) -> Result<f64, ParseError> {
        match self.lookahead {
            Some((_, Ok(Token::Number(n)))) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn match_flag(&mut self) -> Result<bool, ParseError> {
        match self.lookahead {
            Some((_, Ok(Token::Flag(f)))) => {
                self.advance();
                Ok(f)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn match_comma(&mut self) -> bool {
        if let Some((_, Ok(Token::Comma))) = self.lookahead {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_comma_number(&mut self) -> Result<f64, ParseError> {
        self.match_comma();
        self.match_number()
    }

    fn peek_number(&self) -> bool {
        matches!(self.lookahead, Some((_, Ok(Token::Number(_)))))
    }

    fn coordinate_pair(&mut self, absolute: bool) -> Result<(f64, f64), ParseError> {
        let x = self.match_comma_number()?;
        let y = self.match_comma_number()?;

        if absolute {
            Ok((x, y))
        } else {
            Ok((x + self.current.0, y + self.current.1))
        }
    }

    /// Whether another set of arguments follows for the same command.
    ///
    /// A comma means more arguments must follow.
    fn more_arguments(&mut self) -> bool {
        self.match_comma() || self.peek_number()
    }

    fn set_current_point(&mut self, p: (f64, f64)) {
        self.current = p;
        self.cubic_reflection = p;
        self.quadratic_reflection = p;
    }

    fn moveto(&mut self) -> Result<(), ParseError> {
        let absolute = match self.lookahead {
            Some((_, Ok(Token::Command(b'M')))) => true,
            Some((_, Ok(Token::Command(b'm')))) => false,
            Some((position, Ok(Token::Command(c)))) => {
                return Err(ParseError {
                    position,
                    kind: ErrorKind::UnexpectedCommand(c),
                })
            }
            _ => return Err(self.unexpected()),
        };
        self.advance();

        let p = self.coordinate_pair(absolute)?;
        self.set_current_point(p);
        self.subpath_start = p;
        self.builder.move_to(p.0, p.1);

        // extra pairs after a moveto are implicit linetos
        if self.more_arguments() {
            self.lineto_arguments(absolute)?;
        }

        Ok(())
    }

    fn drawto_command(&mut self) -> Result<bool, ParseError> {
        let (position, cmd) = match self.lookahead {
            Some((pos, Ok(Token::Command(c)))) if !matches!(c, b'M' | b'm') => (pos, c),
            _ => return Ok(false),
        };
        self.advance();

        let absolute = cmd.is_ascii_uppercase();

        match cmd.to_ascii_uppercase() {
            b'Z' => {
                self.set_current_point(self.subpath_start);
                self.builder.close_path();
            }
            b'L' => self.lineto_arguments(absolute)?,
            b'H' => self.axis_lineto_arguments(absolute, true)?,
            b'V' => self.axis_lineto_arguments(absolute, false)?,
            b'C' => self.curveto_arguments(absolute, false)?,
            b'S' => self.curveto_arguments(absolute, true)?,
            b'Q' => self.quadratic_arguments(absolute, false)?,
            b'T' => self.quadratic_arguments(absolute, true)?,
            b'A' => self.arc_arguments(absolute)?,
            _ => {
                return Err(ParseError {
                    position,
                    kind: ErrorKind::UnexpectedCommand(cmd),
                })
            }
        }

        Ok(true)
    }

    fn lineto_arguments(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let p = self.coordinate_pair(absolute)?;
            self.set_current_point(p);
            self.builder.line_to(p.0, p.1);

            if !self.more_arguments() {
                return Ok(());
            }
        }
    }

    fn axis_lineto_arguments(&mut self, absolute: bool, horizontal: bool) -> Result<(), ParseError> {
        loop {
            let v = self.match_comma_number()?;
            let (x, y) = self.current;

            let p = match (horizontal, absolute) {
                (true, true) => (v, y),
                (true, false) => (x + v, y),
                (false, true) => (x, v),
                (false, false) => (x, y + v),
            };

            self.set_current_point(p);
            self.builder.line_to(p.0, p.1);

            if !self.more_arguments() {
                return Ok(());
            }
        }
    }

    fn curveto_arguments(&mut self, absolute: bool, smooth: bool) -> Result<(), ParseError> {
        loop {
            let p1 = if smooth {
                let (x, y) = self.current;
                let (rx, ry) = self.cubic_reflection;
                (2.0 * x - rx, 2.0 * y - ry)
            } else {
                self.coordinate_pair(absolute)?
            };
            let p2 = self.coordinate_pair(absolute)?;
            let to = self.coordinate_pair(absolute)?;

            self.builder.curve_to(p1.0, p1.1, p2.0, p2.1, to.0, to.1);
            self.set_current_point(to);
            self.cubic_reflection = p2;

            if !self.more_arguments() {
                return Ok(());
            }
        }
    }

    fn quadratic_arguments(&mut self, absolute: bool, smooth: bool) -> Result<(), ParseError> {
        loop {
            let ctrl = if smooth {
                let (x, y) = self.current;
                let (rx, ry) = self.quadratic_reflection;
                (2.0 * x - rx, 2.0 * y - ry)
            } else {
                self.coordinate_pair(absolute)?
            };
            let to = self.coordinate_pair(absolute)?;

            // raise the quadratic Bézier to a cubic
            let (x0, y0) = self.current;
            let p1 = ((x0 + 2.0 * ctrl.0) / 3.0, (y0 + 2.0 * ctrl.1) / 3.0);
            let p2 = ((to.0 + 2.0 * ctrl.0) / 3.0, (to.1 + 2.0 * ctrl.1) / 3.0);

            self.builder.curve_to(p1.0, p1.1, p2.0, p2.1, to.0, to.1);
            self.set_current_point(to);
            self.quadratic_reflection = ctrl;

            if !self.more_arguments() {
                return Ok(());
            }
        }
    }

    fn arc_arguments(&mut self, absolute: bool) -> Result<(), ParseError> {
        loop {
            let rx = self.match_comma_number()?.abs();
            let ry = self.match_comma_number()?.abs();

            self.match_comma();

            // The lexer must switch to flags before it looks at the token after the
            // rotation, so this can't use match_number().
            let x_axis_rotation = match self.lookahead {
                Some((_, Ok(Token::Number(n)))) => n,
                _ => return Err(self.unexpected()),
            };
            self.tokens.require_flags();
            self.advance();

            self.match_comma();
            let large_arc = LargeArc(self.match_flag()?);

            self.match_comma();
            let sweep = if self.match_flag()? {
                Sweep::Positive
            } else {
                Sweep::Negative
            };

            let to = self.coordinate_pair(absolute)?;

            self.builder
                .arc(rx, ry, x_axis_rotation, large_arc, sweep, to.0, to.1);
            self.set_current_point(to);

            if !self.more_arguments() {
                return Ok(());
            }
        }
    }
}
