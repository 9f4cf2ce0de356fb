//! Validated value types shared across the lookup crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A document number used to look up a person.
///
/// The input is trimmed of leading and trailing whitespace during construction and
/// must contain at least one character. It is also the unique key of a person
/// inside one search result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentNumber(String);

impl DocumentNumber {
    /// Creates a new `DocumentNumber` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parses operator input, treating blank input as "nothing entered".
    ///
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse_optional(input: &str) -> Option<Self> {
        Self::new(input).ok()
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DocumentNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for DocumentNumber {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for DocumentNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for DocumentNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(DocumentNumberVisitor)
    }
}

/// Accepts the number either as a string or as a bare integer, since the
/// service stores it in a numeric column for some document types.
struct DocumentNumberVisitor;

impl<'de> serde::de::Visitor<'de> for DocumentNumberVisitor {
    type Value = DocumentNumber;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a document number as string or integer")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        DocumentNumber::new(v).map_err(E::custom)
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(DocumentNumber(v.to_string()))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(DocumentNumber(v.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let ndoc = DocumentNumber::new("  12345678 ").expect("valid document number");
        assert_eq!(ndoc.as_str(), "12345678");
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(DocumentNumber::new("   "), Err(TextError::Empty));
        assert_eq!(DocumentNumber::new(""), Err(TextError::Empty));
    }

    #[test]
    fn accepts_long_foreign_document_numbers() {
        let input = "CE-".to_string() + &"7".repeat(30);
        let ndoc = DocumentNumber::new(&input).expect("no length cap");
        assert_eq!(ndoc.as_str(), input);
    }

    #[test]
    fn parse_optional_maps_blank_to_none() {
        assert_eq!(DocumentNumber::parse_optional(" \t"), None);
        let parsed = DocumentNumber::parse_optional("A-77");
        assert_eq!(parsed.map(|d| d.to_string()), Some("A-77".to_string()));
    }

    #[test]
    fn deserialize_rejects_blank_strings() {
        let err = serde_json::from_str::<DocumentNumber>("\"  \"")
            .expect_err("blank document number should not deserialize");
        assert!(err.to_string().contains("empty"));

        let ok: DocumentNumber = serde_json::from_str("\"0042\"").expect("valid json string");
        assert_eq!(ok.as_str(), "0042");
    }

    #[test]
    fn deserialize_accepts_integer_numbers() {
        let ndoc: DocumentNumber = serde_json::from_str("12345678").expect("numeric json");
        assert_eq!(ndoc.as_str(), "12345678");

        let err = serde_json::from_str::<DocumentNumber>("true")
            .expect_err("booleans are not document numbers");
        assert!(err.to_string().contains("document number"));
    }
}
