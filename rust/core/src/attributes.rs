// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned attribute values of decoded entities.

use crate::parser::Token;
use crate::schema::IfcType;

/// IFC entity attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    EntityRef(u32),
    /// Decoded string (STEP escapes resolved)
    String(String),
    Integer(i64),
    Float(f64),
    /// Enum value without the surrounding dots
    Enum(String),
    List(Vec<AttributeValue>),
    /// Select value wrapped in its type: IFCLABEL('x') -> Typed("IFCLABEL", String("x"))
    Typed(String, Box<AttributeValue>),
    Null,
    Derived,
}

impl AttributeValue {
    /// Convert from Token
    pub fn from_token(token: &Token) -> Self {
        match token {
            Token::EntityRef(id) => AttributeValue::EntityRef(*id),
            Token::String(s) => AttributeValue::String(decode_step_string(s)),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(e) => AttributeValue::Enum(e.to_string()),
            Token::List(items) => AttributeValue::List(items.iter().map(Self::from_token).collect()),
            Token::TypedValue(type_name, args) => {
                let inner = match args.as_slice() {
                    [single] => Self::from_token(single),
                    many => AttributeValue::List(many.iter().map(Self::from_token).collect()),
                };
                AttributeValue::Typed(type_name.to_ascii_uppercase(), Box::new(inner))
            }
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }

    #[inline]
    pub fn as_entity_ref(&self) -> Option<u32> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::Typed(_, inner) => inner.as_string(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            AttributeValue::Typed(_, inner) => inner.as_enum(),
            _ => None,
        }
    }

    /// Numeric value; integers widen, typed measures unwrap
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Typed(_, inner) => inner.as_float(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::Float(f) => Some(*f as i64),
            AttributeValue::Typed(_, inner) => inner.as_int(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check if null/derived
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null | AttributeValue::Derived)
    }

    /// Entity references of a list attribute, skipping anything else
    pub fn entity_refs(&self) -> Vec<u32> {
        self.as_list()
            .map(|items| items.iter().filter_map(|v| v.as_entity_ref()).collect())
            .unwrap_or_default()
    }

    /// Coordinates of a point-like list: (x, y) or (x, y, z)
    pub fn as_coordinates(&self) -> Option<(f64, f64, f64)> {
        let coords = self.as_list()?;
        let x = coords.first()?.as_float()?;
        let y = coords.get(1)?.as_float()?;
        let z = coords.get(2).and_then(|v| v.as_float()).unwrap_or(0.0);
        Some((x, y, z))
    }

    /// Human-readable rendering used by the property inspector
    pub fn display_value(&self) -> String {
        match self {
            AttributeValue::EntityRef(id) => format!("#{}", id),
            AttributeValue::String(s) => s.clone(),
            AttributeValue::Integer(i) => i.to_string(),
            AttributeValue::Float(f) => f.to_string(),
            AttributeValue::Enum(e) => match e.as_str() {
                "T" => "true".to_string(),
                "F" => "false".to_string(),
                "U" => "unknown".to_string(),
                other => other.to_string(),
            },
            AttributeValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.display_value()).collect();
                format!("({})", parts.join(", "))
            }
            AttributeValue::Typed(_, inner) => inner.display_value(),
            AttributeValue::Null | AttributeValue::Derived => String::new(),
        }
    }

    /// Wrapping type of a typed value, e.g. IFCLENGTHMEASURE
    pub fn type_name(&self) -> Option<&str> {
        match self {
            AttributeValue::Typed(name, _) => Some(name),
            _ => None,
        }
    }
}

/// Resolve STEP string escapes: `''`, `\\`, `\S\c`, `\X\hh` and `\X2\hhhh…\X0\`
pub fn decode_step_string(raw: &str) -> String {
    if !raw.contains('\\') && !raw.contains("''") {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(c) = rest.chars().next() {
        if c == '\'' && rest.starts_with("''") {
            out.push('\'');
            rest = &rest[2..];
        } else if rest.starts_with("\\\\") {
            out.push('\\');
            rest = &rest[2..];
        } else if let Some(tail) = rest.strip_prefix("\\X2\\") {
            let end = tail.find("\\X0\\").unwrap_or(tail.len());
            let units: Vec<u16> = tail[..end]
                .as_bytes()
                .chunks(4)
                .filter_map(|chunk| std::str::from_utf8(chunk).ok())
                .filter_map(|hex| u16::from_str_radix(hex, 16).ok())
                .collect();
            out.extend(char::decode_utf16(units).map(|r| r.unwrap_or('\u{FFFD}')));
            rest = tail.get(end + 4..).unwrap_or("");
        } else if let Some(tail) = rest.strip_prefix("\\X\\") {
            match tail.get(..2).and_then(|hex| u8::from_str_radix(hex, 16).ok()) {
                Some(byte) => {
                    out.push(char::from(byte));
                    rest = &tail[2..];
                }
                None => {
                    out.push('\\');
                    rest = &rest[1..];
                }
            }
        } else if let Some(tail) = rest.strip_prefix("\\S\\") {
            match tail.chars().next() {
                Some(ch) if ch.is_ascii() => {
                    out.push(char::from(ch as u8 + 0x80));
                    rest = &tail[1..];
                }
                _ => {
                    out.push('\\');
                    rest = &rest[1..];
                }
            }
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    out
}

/// Decoded IFC entity with attributes
#[derive(Debug, Clone)]
pub struct DecodedEntity {
    pub id: u32,
    pub ifc_type: IfcType,
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    pub fn new(id: u32, ifc_type: IfcType, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            ifc_type,
            attributes,
        }
    }

    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    pub fn get_ref(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    pub fn get_refs(&self, index: usize) -> Vec<u32> {
        self.get(index).map(|v| v.entity_refs()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_value_unwraps() {
        let token = Token::TypedValue("IFCLENGTHMEASURE", vec![Token::Float(2.5)]);
        let value = AttributeValue::from_token(&token);
        assert_eq!(value.as_float(), Some(2.5));
        assert_eq!(value.type_name(), Some("IFCLENGTHMEASURE"));
        assert_eq!(value.display_value(), "2.5");
    }

    #[test]
    fn test_boolean_display() {
        let token = Token::TypedValue("IFCBOOLEAN", vec![Token::Enum("T")]);
        assert_eq!(AttributeValue::from_token(&token).display_value(), "true");
    }

    #[test]
    fn test_decode_step_escapes() {
        assert_eq!(decode_step_string("it''s"), "it's");
        assert_eq!(decode_step_string("T\\X2\\00FC\\X0\\r"), "Tür");
        assert_eq!(decode_step_string("\\X\\E4"), "ä");
        assert_eq!(decode_step_string("\\S\\d"), "ä");
        assert_eq!(decode_step_string("plain"), "plain");
    }

    #[test]
    fn test_coordinates() {
        let point = AttributeValue::List(vec![
            AttributeValue::Float(1.0),
            AttributeValue::Integer(2),
        ]);
        assert_eq!(point.as_coordinates(), Some((1.0, 2.0, 0.0)));
    }
}
