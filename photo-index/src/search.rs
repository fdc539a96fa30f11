use crate::{MediaTable, Notice, RecordId};
use hashbrown::HashSet;
use magpie_syntax::Query;
use memchr::memmem;
use serde::Serialize;
use tracing::debug;

/// The answer to one query: the surviving record ids, the notice stream
/// accumulated along the way, and what kind of result this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub records: Vec<RecordId>,
    pub notices: Vec<Notice>,
    pub class: ResultClass,
}

/// Classification of a finished query.
///
/// `NoOp` means the filters matched the entire table, which almost always
/// signals a query that did not say what the user meant (only unknown tags,
/// no facets at all), and callers are expected to answer it differently from
/// a genuine [`ResultClass::Empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultClass {
    NoOp,
    Empty,
    Hits,
}

impl MediaTable {
    /// Runs `query` against the table as a pipeline of narrowing steps.
    ///
    /// Tags apply first, in query order: an unknown tag is reported and
    /// skipped, a known tag intersects its posting list into the current
    /// set. A non-empty caption then keeps only records containing it
    /// case-insensitively, and a fully-present date range restricts by
    /// capture date. Soft failures become notices; this function never
    /// fails.
    pub fn search(&self, query: &Query) -> SearchOutcome {
        let mut notices = Vec::new();
        let mut current: Vec<RecordId> = (0..self.len()).collect();

        for tag in &query.tags {
            match self.tag_postings(tag) {
                None => notices.push(Notice::UnknownTag { tag: tag.clone() }),
                Some(ids) => {
                    intersect_in_place(&mut current, ids);
                    debug!(%tag, remaining = current.len(), "tag filter applied");
                    notices.push(Notice::TagApplied {
                        tag: tag.clone(),
                        remaining: current.len(),
                    });
                }
            }
        }

        if !query.caption.is_empty() {
            let needle = query.caption.to_lowercase();
            let finder = memmem::Finder::new(needle.as_bytes());
            current.retain(|&id| {
                let haystack = self.record(id).caption.to_lowercase();
                finder.find(haystack.as_bytes()).is_some()
            });
            debug!(caption = %query.caption, remaining = current.len(), "caption filter applied");
        }

        if let (Some(start), Some(end)) = (&query.start_date, &query.end_date) {
            match (DateBound::start(start), DateBound::end(end)) {
                (Some(low), Some(high)) => {
                    current.retain(|&id| {
                        let record = self.record(id);
                        low.year <= record.year
                            && record.year <= high.year
                            && low.month <= record.month
                            && record.month <= high.month
                            && low.day <= record.day
                            && record.day <= high.day
                    });
                    debug!(%start, %end, remaining = current.len(), "date filter applied");
                }
                _ => notices.push(Notice::DateRangeSkipped {
                    start: start.clone(),
                    end: end.clone(),
                }),
            }
        }

        let class = if current.len() == self.len() && !self.is_empty() {
            ResultClass::NoOp
        } else if current.is_empty() {
            ResultClass::Empty
        } else {
            ResultClass::Hits
        };

        SearchOutcome {
            records: current,
            notices,
            class,
        }
    }
}

/// One bound of a query date range, decoded from a 4, 6 or 8 digit token.
///
/// Records match when every field sits inside its own bound pair; year,
/// month and day are compared independently of each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateBound {
    year: i16,
    month: i8,
    day: i8,
}

impl DateBound {
    /// Lower bound: missing month and day complete to the earliest value.
    fn start(token: &str) -> Option<Self> {
        Self::decode(token, 1, 1)
    }

    /// Upper bound: missing month and day complete to the latest value.
    fn end(token: &str) -> Option<Self> {
        Self::decode(token, 12, 31)
    }

    fn decode(token: &str, default_month: i8, default_day: i8) -> Option<Self> {
        if !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i16 = token.get(..4)?.parse().ok()?;
        let month = match token.get(4..6) {
            Some(digits) => digits.parse().ok()?,
            None => default_month,
        };
        let day = match token.get(6..8) {
            Some(digits) => digits.parse().ok()?,
            None => default_day,
        };
        match token.len() {
            4 | 6 | 8 => Some(Self { year, month, day }),
            _ => None,
        }
    }
}

fn intersect_in_place(values: &mut Vec<RecordId>, rhs: &[RecordId]) {
    if values.is_empty() {
        return;
    }
    let rhs_set: HashSet<RecordId> = rhs.iter().copied().collect();
    values.retain(|id| rhs_set.contains(id));
}
