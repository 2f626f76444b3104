//! CSV serialisation of a directory listing.
//!
//! Encoding only: callers decide where the bytes go. Fields are quoted only
//! when they contain the delimiter, a quote or a line break.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use mockable::Clock;

use crate::domain::user::UserRecord;

/// Column header row.
pub const EXPORT_HEADER: [&str; 7] = [
    "Name",
    "Email",
    "Mobile",
    "Batch",
    "Role",
    "Department",
    "Badges Count",
];

/// Rendered in place of a missing mobile number or department.
pub const MISSING_PLACEHOLDER: &str = "-";

/// File name stem used for member exports.
pub const DEFAULT_EXPORT_ENTITY: &str = "ecoclub_users";

/// Errors raised while encoding an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A record could not be written.
    #[error("failed to encode CSV: {0}")]
    Encode(#[from] csv::Error),
    /// The encoded bytes could not be recovered.
    #[error("failed to finish CSV output: {0}")]
    Finish(String),
}

/// Encode `records` as CSV with a header row, one line per record.
///
/// # Errors
///
/// [`ExportError`] when the writer fails; writing to memory only fails on
/// invalid UTF-8, which string fields cannot produce.
pub fn export_csv<'a, I>(records: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a UserRecord>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER)?;
    for record in records {
        let badges = record.badges().len().to_string();
        writer.write_record([
            record.name(),
            record.email(),
            record.mobile().unwrap_or(MISSING_PLACEHOLDER),
            record.batch().unwrap_or_default(),
            record.role().as_str(),
            record.department().unwrap_or(MISSING_PLACEHOLDER),
            badges.as_str(),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExportError::Finish(error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| ExportError::Finish(error.to_string()))
}

/// Download name for an export taken on `date`, e.g.
/// `ecoclub_users_2024-03-09.csv`.
#[must_use]
pub fn export_filename(entity: &str, date: NaiveDate) -> String {
    format!("{entity}_{}.csv", date.format("%Y-%m-%d"))
}

/// Download name for an export taken now, dated in UTC.
#[must_use]
pub fn export_filename_now(entity: &str, clock: &dyn Clock) -> String {
    export_filename(entity, clock.utc().date_naive())
}
