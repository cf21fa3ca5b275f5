//! Common types shared across resources: pagination and loose scalars.

use serde::{Deserialize, Deserializer, Serialize};

/// Default page requested when the caller does not specify one
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size requested when the caller does not specify one
pub const DEFAULT_LIMIT: u32 = 10;

/// Pagination metadata as reported by the server.
///
/// These values are never computed client-side; they travel with the page of
/// items they describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub limit: u32,
    pub total_pages: u32,
    pub current_page: u32,
}

impl PageMeta {
    /// Metadata for an empty collection at page 1.
    pub fn empty(limit: u32) -> Self {
        Self {
            total: 0,
            limit,
            total_pages: 0,
            current_page: DEFAULT_PAGE,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// One page of a server collection together with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Check that the metadata agrees with the items that came with it.
    pub fn validate(self) -> Result<Self, String> {
        if self.meta.limit > 0 && self.items.len() > self.meta.limit as usize {
            return Err(format!(
                "page holds {} items but limit is {}",
                self.items.len(),
                self.meta.limit
            ));
        }
        if self.meta.total_pages > 0 && self.meta.current_page > self.meta.total_pages {
            return Err(format!(
                "current page {} is past the last page {}",
                self.meta.current_page, self.meta.total_pages
            ));
        }
        if self.meta.total == 0 && !self.items.is_empty() {
            return Err(format!(
                "total is 0 but {} items were returned",
                self.items.len()
            ));
        }
        Ok(self)
    }

    /// Apply a conversion to every item, keeping the metadata untouched
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// A page/limit pair for list requests.
///
/// Outside the crate a query can only be built through [`PageQuery::new`] or
/// `Default`, so both values are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageQuery {
    pub(crate) page: u32,
    pub(crate) limit: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageQuery {
    /// Build a query from optional inputs, applying the defaults.
    ///
    /// Zero is not a valid page or limit.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, String> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if page == 0 {
            return Err("Page must be a positive integer".to_string());
        }
        if limit == 0 {
            return Err("Limit must be a positive integer".to_string());
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// A numeric field the backend sometimes sends as a string.
///
/// Anything that is neither a number nor a numeric string is kept as `Other`
/// so decoding never fails on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseNumber {
    /// The value as a finite number, if it is one
    pub fn as_finite(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => s.trim().parse::<f64>().ok()?,
            LooseNumber::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for LooseNumber {
    fn from(n: f64) -> Self {
        LooseNumber::Number(n)
    }
}

impl From<&str> for LooseNumber {
    fn from(s: &str) -> Self {
        LooseNumber::Text(s.to_string())
    }
}

/// Accept an identifier sent either as a JSON string or a JSON integer.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(s) if s.is_empty() => Err(serde::de::Error::custom("empty identifier")),
        RawId::Text(s) => Ok(s),
        RawId::Int(n) => Ok(n.to_string()),
    }
}
