use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A RUT in `NUMBER-CHECKDIGIT` form, check digit `0-9` or `K` (either case).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

fn rut_regex() -> &'static Regex {
    static RUT: OnceLock<Regex> = OnceLock::new();
    RUT.get_or_init(|| Regex::new(r"^[0-9]+-[0-9kK]$").expect("static RUT pattern"))
}

impl Identifier {
    /// Normalize a raw line and validate it. Returns `None` for anything
    /// that is not a RUT once all whitespace is removed.
    pub fn normalize(raw: &str) -> Option<Self> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '\u{feff}')
            .collect();
        if rut_regex().is_match(&compact) {
            Some(Identifier(compact))
        } else {
            None
        }
    }

    /// `(number, check_digit)` as typed into the two search fields.
    pub fn split(&self) -> (&str, &str) {
        // Validated on construction, so the dash is always present.
        self.0.split_once('-').unwrap_or((&self.0, ""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdentifier(pub String);

impl fmt::Display for InvalidIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a valid RUT: '{}'", self.0)
    }
}

impl std::error::Error for InvalidIdentifier {}

impl FromStr for Identifier {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::normalize(s).ok_or_else(|| InvalidIdentifier(s.to_string()))
    }
}

impl TryFrom<String> for Identifier {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}
