//! # Definition Pointers
//!
//! A `DefinitionPointer` is a JSON Pointer (RFC 6901) scoped to the root of
//! a Swagger document, conventionally `/definitions/<Name>`. The pointer is
//! kept in its escaped form; [`DefinitionPointer::tokens`] yields the
//! unescaped reference tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PointerError;

/// A validated JSON Pointer into a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DefinitionPointer(String);

impl DefinitionPointer {
    /// Parse and validate pointer text.
    ///
    /// # Errors
    ///
    /// Returns `PointerError` for the empty pointer, a pointer without a
    /// leading `/`, or a `~` not followed by `0` or `1`.
    pub fn parse(pointer: &str) -> Result<Self, PointerError> {
        if pointer.is_empty() {
            return Err(PointerError::Empty);
        }
        if !pointer.starts_with('/') {
            return Err(PointerError::MissingLeadingSlash(pointer.to_string()));
        }

        let bytes = pointer.as_bytes();
        for (offset, byte) in bytes.iter().enumerate() {
            if *byte == b'~' && !matches!(bytes.get(offset + 1), Some(b'0') | Some(b'1')) {
                return Err(PointerError::InvalidEscape {
                    pointer: pointer.to_string(),
                    offset,
                });
            }
        }

        Ok(Self(pointer.to_string()))
    }

    /// Pointer to `/definitions/<name>`, escaping the name.
    pub fn definition(name: &str) -> Self {
        Self(format!(
            "/definitions/{}",
            name.replace('~', "~0").replace('/', "~1")
        ))
    }

    /// The escaped pointer text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unescaped reference tokens, in order.
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.0[1..]
            .split('/')
            .map(|token| token.replace("~1", "/").replace("~0", "~"))
    }

    /// The pointer as a URI fragment (`#/definitions/User`), percent-encoding
    /// every byte that may not appear in a fragment.
    pub fn to_uri_fragment(&self) -> String {
        let mut fragment = String::with_capacity(self.0.len() + 1);
        fragment.push('#');
        for byte in self.0.bytes() {
            if is_fragment_safe(byte) {
                fragment.push(byte as char);
            } else {
                fragment.push_str(&format!("%{byte:02X}"));
            }
        }
        fragment
    }
}

/// RFC 3986 `fragment` characters, minus `%` so that literal percent signs
/// in definition names are encoded rather than read as escapes.
fn is_fragment_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'.'
                | b'_'
                | b'~'
                | b'!'
                | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b':'
                | b'@'
                | b'/'
                | b'?'
        )
}

impl fmt::Display for DefinitionPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DefinitionPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DefinitionPointer {
    type Error = PointerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DefinitionPointer> for String {
    fn from(pointer: DefinitionPointer) -> Self {
        pointer.0
    }
}

impl AsRef<str> for DefinitionPointer {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definition_pointer() {
        let pointer = DefinitionPointer::parse("/definitions/User").unwrap();
        assert_eq!(pointer.as_str(), "/definitions/User");
        assert_eq!(pointer.tokens().collect::<Vec<_>>(), vec!["definitions", "User"]);
    }

    #[test]
    fn test_reject_empty_pointer() {
        assert_eq!(DefinitionPointer::parse(""), Err(PointerError::Empty));
    }

    #[test]
    fn test_reject_relative_pointer() {
        assert!(matches!(
            DefinitionPointer::parse("definitions/User"),
            Err(PointerError::MissingLeadingSlash(_))
        ));
    }

    #[test]
    fn test_reject_bad_escape() {
        let err = DefinitionPointer::parse("/definitions/a~2b").unwrap_err();
        assert_eq!(
            err,
            PointerError::InvalidEscape {
                pointer: "/definitions/a~2b".to_string(),
                offset: 14,
            }
        );
        assert!(DefinitionPointer::parse("/definitions/trailing~").is_err());
    }

    #[test]
    fn test_escaped_tokens_are_unescaped() {
        let pointer = DefinitionPointer::definition("a/b~c");
        assert_eq!(pointer.as_str(), "/definitions/a~1b~0c");
        assert_eq!(pointer.tokens().nth(1).unwrap(), "a/b~c");
    }

    #[test]
    fn test_uri_fragment_encoding() {
        let pointer = DefinitionPointer::parse("/definitions/My Model%").unwrap();
        assert_eq!(pointer.to_uri_fragment(), "#/definitions/My%20Model%25");

        let plain = DefinitionPointer::parse("/definitions/User").unwrap();
        assert_eq!(plain.to_uri_fragment(), "#/definitions/User");
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let pointer: DefinitionPointer =
            serde_json::from_str("\"/definitions/Pet\"").unwrap();
        assert_eq!(pointer.to_string(), "/definitions/Pet");
        assert!(serde_json::from_str::<DefinitionPointer>("\"Pet\"").is_err());
    }
}
