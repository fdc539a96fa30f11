use serde::Serialize;
use std::fmt;

/// One human-readable progress line produced while a query narrows the
/// table. Notices report soft failures (unknown tag, undecodable date range)
/// as well as ordinary progress; none of them aborts the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// A known tag narrowed the result set to `remaining` records.
    TagApplied { tag: String, remaining: usize },
    /// The tag is not a column of the table and was skipped.
    UnknownTag { tag: String },
    /// One of the range bounds did not decompose into year/month/day, so the
    /// date filter was skipped.
    DateRangeSkipped { start: String, end: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::TagApplied { tag, remaining } => {
                write!(f, "Tag \"{tag}\" found, {remaining} entries remain.")
            }
            Notice::UnknownTag { tag } => {
                write!(f, "Tag \"{tag}\" is not in the index and will be ignored.")
            }
            Notice::DateRangeSkipped { start, end } => {
                write!(
                    f,
                    "Could not read the date range \"{start}\"-\"{end}\", skipping the date filter."
                )
            }
        }
    }
}
