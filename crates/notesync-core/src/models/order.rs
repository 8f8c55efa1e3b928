//! Search ordering tokens

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Note;

const ORDER_DESC_PREFIX: &str = "-";
const FILTER_TITLE: &str = "title";
const FILTER_DATE_UPDATED: &str = "updated_at";

/// Token for title ascending
pub const ORDER_BY_ASC_TITLE: &str = "title";
/// Token for title descending
pub const ORDER_BY_DESC_TITLE: &str = "-title";
/// Token for last-updated ascending
pub const ORDER_BY_ASC_DATE_UPDATED: &str = "updated_at";
/// Token for last-updated descending
pub const ORDER_BY_DESC_DATE_UPDATED: &str = "-updated_at";

/// The four fixed search orderings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NoteOrder {
    /// Title, A to Z
    TitleAsc,
    /// Title, Z to A
    TitleDesc,
    /// Oldest edit first
    DateAsc,
    /// Newest edit first
    #[default]
    DateDesc,
}

impl NoteOrder {
    /// Token string used at the store boundary
    pub const fn token(self) -> &'static str {
        match self {
            Self::TitleAsc => ORDER_BY_ASC_TITLE,
            Self::TitleDesc => ORDER_BY_DESC_TITLE,
            Self::DateAsc => ORDER_BY_ASC_DATE_UPDATED,
            Self::DateDesc => ORDER_BY_DESC_DATE_UPDATED,
        }
    }

    /// Parse a token, falling back to newest-first for anything unrecognised.
    pub fn from_token_lossy(token: &str) -> Self {
        token.parse().unwrap_or_default()
    }

    /// Sort `notes` in place the way the SQL clause would, ties broken by id.
    pub fn sort(self, notes: &mut [Note]) {
        notes.sort_by(|a, b| {
            let ordering = match self {
                Self::TitleAsc => a.title.cmp(&b.title),
                Self::TitleDesc => b.title.cmp(&a.title),
                Self::DateAsc => a.updated_at.cmp(&b.updated_at),
                Self::DateDesc => b.updated_at.cmp(&a.updated_at),
            };
            ordering.then_with(|| a.id.cmp(&b.id))
        });
    }

    /// SQL `ORDER BY` clause for this ordering.
    pub(crate) const fn sql(self) -> &'static str {
        match self {
            Self::TitleAsc => "title ASC",
            Self::TitleDesc => "title DESC",
            Self::DateAsc => "updated_at ASC",
            Self::DateDesc => "updated_at DESC",
        }
    }
}

impl fmt::Display for NoteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for NoteOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let (descending, field) = token
            .strip_prefix(ORDER_DESC_PREFIX)
            .map_or((false, token), |field| (true, field));

        match (field, descending) {
            (FILTER_TITLE, false) => Ok(Self::TitleAsc),
            (FILTER_TITLE, true) => Ok(Self::TitleDesc),
            (FILTER_DATE_UPDATED, false) => Ok(Self::DateAsc),
            (FILTER_DATE_UPDATED, true) => Ok(Self::DateDesc),
            _ => Err(crate::Error::InvalidInput(format!(
                "unknown order token '{token}'"
            ))),
        }
    }
}

impl TryFrom<String> for NoteOrder {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NoteOrder> for String {
    fn from(value: NoteOrder) -> Self {
        value.token().to_string()
    }
}
