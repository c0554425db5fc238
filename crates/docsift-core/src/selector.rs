//! Page selectors: parsing, ordering and physical-page resolution.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SiftError;
use crate::tools::PageRange;

/// Addressing mode for document pages.
///
/// Parsed from the short tokens used in template definitions: `"a"` for all
/// pages, `"l"` for the last page, or a positive 1-based page number. The
/// derived order (`All`, `Last`, then pages ascending) is the resolution
/// order used when a batch of selectors is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageSelector {
    /// Every page of the document.
    All,
    /// The highest-numbered page.
    Last,
    /// A specific 1-based page.
    Page(u32),
}

impl PageSelector {
    /// Physical range for a document with `page_count` pages, or `None`
    /// when the selector is out of range and must be silently dropped.
    pub fn resolve(self, page_count: u32) -> Option<PageRange> {
        match self {
            PageSelector::All => Some(PageRange::Whole),
            PageSelector::Last if page_count >= 1 => Some(PageRange::Single(page_count)),
            PageSelector::Last => None,
            PageSelector::Page(n) if n >= 1 && n <= page_count => Some(PageRange::Single(n)),
            PageSelector::Page(_) => None,
        }
    }

    /// Individual 1-based pages covered by this selector; empty when the
    /// selector is dropped.
    pub fn pages(self, page_count: u32) -> Vec<u32> {
        match self.resolve(page_count) {
            Some(PageRange::Whole) => (1..=page_count).collect(),
            Some(PageRange::Single(n)) => vec![n],
            None => Vec::new(),
        }
    }
}

/// Sort a batch of selectors into deterministic resolution order: `All`,
/// `Last`, then numeric pages ascending.
///
/// The order matters: it decides which selector triggers the whole-document
/// collaborator call first and thus what the single-page short-circuit in
/// the text cache can reuse.
pub fn sort_selectors(mut selectors: Vec<PageSelector>) -> Vec<PageSelector> {
    selectors.sort_unstable();
    selectors
}

impl FromStr for PageSelector {
    type Err = SiftError;

    fn from_str(token: &str) -> Result<Self, SiftError> {
        match token {
            "a" => Ok(PageSelector::All),
            "l" => Ok(PageSelector::Last),
            _ => token
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .map(PageSelector::Page)
                .ok_or_else(|| SiftError::SelectorInvalid(token.to_string())),
        }
    }
}

impl fmt::Display for PageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelector::All => f.write_str("a"),
            PageSelector::Last => f.write_str("l"),
            PageSelector::Page(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for PageSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct TokenVisitor;

impl Visitor<'_> for TokenVisitor {
    type Value = PageSelector;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"a\", \"l\" or a positive page number")
    }

    fn visit_str<E: de::Error>(self, token: &str) -> Result<Self::Value, E> {
        token.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Self::Value, E> {
        u32::try_from(n)
            .ok()
            .filter(|n| *n >= 1)
            .map(PageSelector::Page)
            .ok_or_else(|| E::custom(format!("page number out of range: {n}")))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Self::Value, E> {
        u64::try_from(n)
            .map_err(|_| E::custom(format!("page number out of range: {n}")))
            .and_then(|n| self.visit_u64(n))
    }
}

impl<'de> Deserialize<'de> for PageSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TokenVisitor)
    }
}
