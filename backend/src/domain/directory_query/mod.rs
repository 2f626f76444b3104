//! In-memory member directory queries.
//!
//! Everything here is a pure function over an already loaded slice of
//! [`UserRecord`]s: search, role filter, stable sort, statistics and CSV
//! export. Filtering always happens before sorting.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::user::{ParseRoleError, Role, UserRecord};

mod export;
mod stats;

pub use export::{
    DEFAULT_EXPORT_ENTITY, EXPORT_HEADER, ExportError, MISSING_PLACEHOLDER, export_csv,
    export_filename, export_filename_now,
};
pub use stats::{BatchCount, DirectoryStats};

/// Which roles a query keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleFilter {
    /// Every role passes.
    #[default]
    All,
    /// Only members holding this role pass.
    Only(Role),
}

impl RoleFilter {
    /// Whether `role` passes this filter.
    #[must_use]
    pub fn admits(self, role: Role) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == role,
        }
    }
}

impl FromStr for RoleFilter {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            value.parse().map(Self::Only)
        }
    }
}

/// Columns a directory listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Member name.
    Name,
    /// Email address.
    Email,
    /// Mobile number.
    Mobile,
    /// Batch (cohort) label.
    Batch,
    /// Role name.
    Role,
    /// Department label.
    Department,
}

/// Error returned when parsing a [`SortKey`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key: {0}")]
pub struct ParseSortKeyError(pub String);

impl SortKey {
    /// Lowercase name accepted by `FromStr`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Mobile => "mobile",
            Self::Batch => "batch",
            Self::Role => "role",
            Self::Department => "department",
        }
    }

    /// The sortable value of `record` for this key; missing values are empty.
    fn value_of(self, record: &UserRecord) -> &str {
        match self {
            Self::Name => record.name(),
            Self::Email => record.email(),
            Self::Mobile => record.mobile().unwrap_or_default(),
            Self::Batch => record.batch().unwrap_or_default(),
            Self::Role => record.role().as_str(),
            Self::Department => record.department().unwrap_or_default(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "mobile" => Ok(Self::Mobile),
            "batch" => Ok(Self::Batch),
            "role" => Ok(Self::Role),
            "department" => Ok(Self::Department),
            _ => Err(ParseSortKeyError(value.to_owned())),
        }
    }
}

/// Ordering applied to the sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest value first.
    #[default]
    Ascending,
    /// Largest value first.
    Descending,
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    /// Column being sorted.
    pub key: SortKey,
    /// Direction of the sort.
    pub direction: SortDirection,
}

impl SortState {
    /// Sort ascending by `key`.
    #[must_use]
    pub const fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    /// Next sort state after the user selects `key`.
    ///
    /// Selecting the active ascending key flips it to descending; any other
    /// selection sorts ascending by `key`.
    ///
    /// # Examples
    /// ```
    /// use ecoclub_console::domain::directory_query::{SortDirection, SortKey, SortState};
    ///
    /// let first = SortState::select(None, SortKey::Name);
    /// let second = SortState::select(Some(first), SortKey::Name);
    /// assert_eq!(second.direction, SortDirection::Descending);
    /// assert_eq!(SortState::select(Some(second), SortKey::Batch), SortState::ascending(SortKey::Batch));
    /// ```
    #[must_use]
    pub fn select(current: Option<Self>, key: SortKey) -> Self {
        match current {
            Some(Self {
                key: active,
                direction: SortDirection::Ascending,
            }) if active == key => Self {
                key,
                direction: SortDirection::Descending,
            },
            _ => Self::ascending(key),
        }
    }

    fn compare(self, a: &UserRecord, b: &UserRecord) -> Ordering {
        let ordering = self.key.value_of(a).cmp(self.key.value_of(b));
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Search term, role filter and optional sort for one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryQuery {
    term: Option<String>,
    role_filter: RoleFilter,
    sort: Option<SortState>,
}

impl DirectoryQuery {
    /// Query that keeps every record in input order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search term.
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Set the role filter.
    #[must_use]
    pub fn with_role_filter(mut self, role_filter: RoleFilter) -> Self {
        self.role_filter = role_filter;
        self
    }

    /// Set the sort state.
    #[must_use]
    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Search term, if any.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Active role filter.
    #[must_use]
    pub fn role_filter(&self) -> RoleFilter {
        self.role_filter
    }

    /// Active sort, if any.
    #[must_use]
    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }
}

/// Case-insensitive substring match on name, email, mobile and batch.
///
/// An empty term matches every record. The term is not trimmed.
#[must_use]
pub fn matches_term(record: &UserRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    [
        Some(record.name()),
        Some(record.email()),
        record.mobile(),
        record.batch(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Filter then stably sort `records`.
///
/// Records comparing equal keep their input order in both directions; with
/// no sort state the filtered input order is returned unchanged.
///
/// # Examples
/// ```
/// use ecoclub_console::domain::directory_query::{DirectoryQuery, query};
/// use ecoclub_console::domain::{UserId, UserRecord};
///
/// let jane = UserRecord::new(UserId::new("u1").expect("uid"), "Jane Doe", "jane@x.com");
/// let sam = UserRecord::new(UserId::new("u2").expect("uid"), "Sam Roe", "sam@y.org");
/// let records = [jane, sam];
/// let hits = query(&records, &DirectoryQuery::new().with_term("JANE"));
/// assert_eq!(hits.len(), 1);
/// ```
#[must_use]
pub fn query<'a>(records: &'a [UserRecord], query: &DirectoryQuery) -> Vec<&'a UserRecord> {
    let term = query.term().unwrap_or_default();
    let mut view: Vec<&UserRecord> = records
        .iter()
        .filter(|record| matches_term(record, term))
        .filter(|record| query.role_filter().admits(record.role()))
        .collect();
    if let Some(sort) = query.sort() {
        view.sort_by(|a, b| sort.compare(a, b));
    }
    view
}

/// A query result together with the size of the unfiltered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryView<'a> {
    records: Vec<&'a UserRecord>,
    total: usize,
}

impl<'a> DirectoryView<'a> {
    /// Run `directory_query` over `records`.
    #[must_use]
    pub fn new(records: &'a [UserRecord], directory_query: &DirectoryQuery) -> Self {
        Self {
            records: query(records, directory_query),
            total: records.len(),
        }
    }

    /// Matching records in display order.
    #[must_use]
    pub fn records(&self) -> &[&'a UserRecord] {
        &self.records
    }

    /// Number of matching records.
    #[must_use]
    pub fn shown(&self) -> usize {
        self.records.len()
    }

    /// Size of the unfiltered listing.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Human readable count line, e.g. `showing 3 of 10 members`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("showing {} of {} members", self.shown(), self.total)
    }
}
