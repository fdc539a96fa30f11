#![allow(dead_code)]
//! Shared helpers for `magpie-syntax` integration tests.

use magpie_syntax::{Query, parse_query};

pub fn parsed(input: &str) -> Query {
    parse_query(input)
}

pub fn tags_are(query: &Query, expected: &[&str]) {
    assert_eq!(query.tags, expected, "tags mismatch for {query:?}");
}

pub fn caption_is(query: &Query, expected: &str) {
    assert_eq!(query.caption, expected, "caption mismatch for {query:?}");
}

pub fn dates_are(query: &Query, start: Option<&str>, end: Option<&str>) {
    assert_eq!(query.start_date.as_deref(), start, "start mismatch for {query:?}");
    assert_eq!(query.end_date.as_deref(), end, "end mismatch for {query:?}");
}

pub fn no_dates(query: &Query) {
    dates_are(query, None, None);
}
