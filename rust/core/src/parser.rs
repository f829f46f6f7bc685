// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP/IFC Parser using nom
//!
//! Zero-copy tokenization of entity statements and a scanner that walks the
//! DATA section statement by statement.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::schema::IfcType;

/// STEP/IFC Token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Entity reference: #123
    EntityRef(u32),
    /// String literal: 'text' (raw, STEP escapes still encoded)
    String(&'a str),
    /// Integer: 42
    Integer(i64),
    /// Float: 3.14
    Float(f64),
    /// Enum: .TRUE., .FALSE., .UNKNOWN.
    Enum(&'a str),
    /// List: (1, 2, 3)
    List(Vec<Token<'a>>),
    /// Typed value: IFCLABEL('Door'), IFCBOOLEAN(.T.)
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Null value: $
    Null,
    /// Asterisk (derived value): *
    Derived,
}

/// Parse entity reference: #123
fn entity_ref(input: &str) -> IResult<&str, Token> {
    map(
        preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
        Token::EntityRef,
    )(input)
}

/// Content of a quoted literal; a doubled quote is an escaped quote
fn quoted_content(input: &str, quote: char) -> IResult<&str, &str> {
    let bytes = input.as_bytes();
    let q = quote as u8;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == q {
            if bytes.get(i + 1) == Some(&q) {
                i += 2;
                continue;
            }
            return Ok((&input[i..], &input[..i]));
        }
        i += 1;
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Parse string literal: 'text' or "binary"
fn string_literal(input: &str) -> IResult<&str, Token> {
    alt((
        map(
            delimited(char('\''), |i| quoted_content(i, '\''), char('\'')),
            Token::String,
        ),
        map(
            delimited(char('"'), |i| quoted_content(i, '"'), char('"')),
            Token::String,
        ),
    ))(input)
}

/// Parse integer: 42, -42
fn integer(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((opt(one_of("+-")), digit1))),
        |s: &str| s.parse::<i64>().map(Token::Integer),
    )(input)
}

/// Parse float: 3.14, -3.14, 1.5E-10, 0., 1.E-05
fn float(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>().map(Token::Float),
    )(input)
}

/// Parse enum: .TRUE., .F., .LENGTHUNIT.
fn enum_value(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            char('.'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            char('.'),
        ),
        Token::Enum,
    )(input)
}

fn null(input: &str) -> IResult<&str, Token> {
    map(char('$'), |_| Token::Null)(input)
}

fn derived(input: &str) -> IResult<&str, Token> {
    map(char('*'), |_| Token::Derived)(input)
}

fn ws(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace())(input)
}

fn arguments(input: &str) -> IResult<&str, Vec<Token>> {
    delimited(
        char('('),
        separated_list0(tag(","), token),
        preceded(ws, char(')')),
    )(input)
}

/// Parse typed value: IFCLABEL('x'), IFCLENGTHMEASURE(2.)
fn typed_value(input: &str) -> IResult<&str, Token> {
    map(
        pair(
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            arguments,
        ),
        |(type_name, args)| Token::TypedValue(type_name, args),
    )(input)
}

/// Parse list: (1, 2, 3) or nested lists
fn list(input: &str) -> IResult<&str, Token> {
    map(arguments, Token::List)(input)
}

/// Parse a token with optional surrounding whitespace
fn token(input: &str) -> IResult<&str, Token> {
    delimited(
        ws,
        alt((
            float, // float before integer: both start with digits
            integer,
            entity_ref,
            string_literal,
            enum_value,
            list,
            typed_value,
            null,
            derived,
        )),
        ws,
    )(input)
}

/// Parse a complete entity statement
/// Example: #123=IFCDOOR('guid',#2,'Door',$,$,#50,#60,$,2.,1.1,$,$,$);
pub fn parse_entity(input: &str) -> Result<(u32, IfcType, Vec<Token>)> {
    let result: IResult<&str, (u32, &str, Vec<Token>)> = tuple((
        delimited(
            ws,
            preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>())),
            ws,
        ),
        preceded(
            char('='),
            delimited(
                ws,
                take_while1(|c: char| c.is_alphanumeric() || c == '_'),
                ws,
            ),
        ),
        delimited(ws, arguments, tuple((ws, char(';')))),
    ))(input);

    match result {
        Ok((_, (id, type_name, args))) => Ok((id, IfcType::from_name(type_name), args)),
        Err(e) => Err(Error::parse(0, format!("Failed to parse entity: {}", e))),
    }
}

/// Find the `;` that terminates the statement starting at `from`,
/// skipping over quoted strings. Returns the index just past the `;`.
pub(crate) fn find_statement_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let offset = memchr::memchr2(b';', b'\'', &bytes[pos..])?;
        let at = pos + offset;
        if bytes[at] == b';' {
            return Some(at + 1);
        }

        // Inside a string: jump to the closing quote, honouring '' escapes
        let mut i = at + 1;
        loop {
            let close = i + memchr::memchr(b'\'', &bytes[i..])?;
            if bytes.get(close + 1) == Some(&b'\'') {
                i = close + 2;
            } else {
                pos = close + 1;
                break;
            }
        }
    }
}

/// Byte offset where entity statements begin (just after `DATA;`), or 0
/// when the content is a bare list of statements.
pub(crate) fn data_section_start(content: &str) -> usize {
    memchr::memmem::find(content.as_bytes(), b"DATA;")
        .map(|pos| pos + "DATA;".len())
        .unwrap_or(0)
}

/// Fast entity scanner - walks the DATA section without full parsing
pub struct EntityScanner<'a> {
    content: &'a str,
    start: usize,
    position: usize,
}

impl<'a> EntityScanner<'a> {
    pub fn new(content: &'a str) -> Self {
        let start = data_section_start(content);
        Self {
            content,
            start,
            position: start,
        }
    }

    /// Scan for the next entity
    /// Returns (entity_id, type_name, statement_start, statement_end)
    pub fn next_entity(&mut self) -> Option<(u32, &'a str, usize, usize)> {
        let bytes = self.content.as_bytes();

        loop {
            let hash = self.position + memchr::memchr(b'#', &bytes[self.position..])?;
            let line_end = find_statement_end(bytes, hash)?;
            self.position = line_end;

            let statement = &self.content[hash + 1..line_end];
            let id_len = statement
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(statement.len());
            let Ok(id) = statement[..id_len].parse::<u32>() else {
                continue;
            };

            let rest = statement[id_len..].trim_start();
            let Some(after_eq) = rest.strip_prefix('=') else {
                continue;
            };
            let after_eq = after_eq.trim_start();
            let type_len = after_eq
                .find(|c: char| c == '(' || c.is_whitespace())
                .unwrap_or(after_eq.len());
            if type_len == 0 {
                continue;
            }

            let type_name = &after_eq[..type_len];
            return Some((id, type_name, hash, line_end));
        }
    }

    /// Find all entities of a specific type
    pub fn find_by_type(&mut self, target_type: &str) -> Vec<(u32, usize, usize)> {
        let mut results = Vec::new();
        while let Some((id, type_name, start, end)) = self.next_entity() {
            if type_name.eq_ignore_ascii_case(target_type) {
                results.push((id, start, end));
            }
        }
        results
    }

    /// Count entities by type
    pub fn count_by_type(&mut self) -> rustc_hash::FxHashMap<String, usize> {
        let mut counts = rustc_hash::FxHashMap::default();
        while let Some((_, type_name, _, _)) = self.next_entity() {
            *counts.entry(type_name.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn reset(&mut self) {
        self.position = self.start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ref() {
        assert_eq!(entity_ref("#123"), Ok(("", Token::EntityRef(123))));
    }

    #[test]
    fn test_string_literal_with_escaped_quote() {
        assert_eq!(
            string_literal("'it''s'"),
            Ok(("", Token::String("it''s")))
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(integer("-42"), Ok(("", Token::Integer(-42))));
        assert_eq!(float("0."), Ok(("", Token::Float(0.0))));
        assert_eq!(float("1.E-05"), Ok(("", Token::Float(1.0e-5))));
        assert_eq!(float("-3.5"), Ok(("", Token::Float(-3.5))));
    }

    #[test]
    fn test_enum() {
        assert_eq!(enum_value(".LENGTHUNIT."), Ok(("", Token::Enum("LENGTHUNIT"))));
        assert_eq!(enum_value(".T."), Ok(("", Token::Enum("T"))));
    }

    #[test]
    fn test_nested_list() {
        let (_, token) = list("(1,(2., 3.),#4)").unwrap();
        let Token::List(items) = token else {
            panic!("Expected list");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[1],
            Token::List(vec![Token::Float(2.0), Token::Float(3.0)])
        );
        assert_eq!(items[2], Token::EntityRef(4));
    }

    #[test]
    fn test_parse_entity_with_typed_value() {
        let input = "#7=IFCPROPERTYSINGLEVALUE('FireRating',$,IFCLABEL('EI30'),$);";
        let (id, ty, args) = parse_entity(input).unwrap();
        assert_eq!(id, 7);
        assert_eq!(ty, IfcType::IfcPropertySingleValue);
        assert_eq!(args.len(), 4);
        assert_eq!(
            args[2],
            Token::TypedValue("IFCLABEL", vec![Token::String("EI30")])
        );
    }

    #[test]
    fn test_parse_entity_with_spaces() {
        let input = "#9 = IFCDIRECTION( (0., 0., 1.) ) ;";
        let (id, ty, args) = parse_entity(input).unwrap();
        assert_eq!(id, 9);
        assert_eq!(ty, IfcType::IfcDirection);
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_parse_entity_rejects_garbage() {
        assert!(parse_entity("IFCDOOR();").is_err());
    }

    #[test]
    fn test_scanner_skips_header_and_semicolons_in_strings() {
        let content = "ISO-10303-21;\nHEADER;\nFILE_NAME('#1;odd','',(''),(''),'','','');\nENDSEC;\nDATA;\n#1=IFCPROJECT('guid',$,'A;B',$,$,$,$,$,$);\n#2=IFCDOOR('g2',$,'it''s;here',$,$,$,$,$,$,$,$,$,$);\nENDSEC;\n";

        let mut scanner = EntityScanner::new(content);
        let (id, type_name, start, end) = scanner.next_entity().unwrap();
        assert_eq!(id, 1);
        assert_eq!(type_name, "IFCPROJECT");
        assert!(content[start..end].ends_with("$);"));

        let (id, type_name, _, _) = scanner.next_entity().unwrap();
        assert_eq!(id, 2);
        assert_eq!(type_name, "IFCDOOR");
        assert!(scanner.next_entity().is_none());

        scanner.reset();
        let counts = scanner.count_by_type();
        assert_eq!(counts.get("IFCDOOR"), Some(&1));
    }
}
