//! # Magpie's chat query syntax
//!
//! `magpie-syntax` turns one line of free-form chat text into a structured
//! [`Query`] so the rest of Magpie can filter the photo index without
//! re-deriving the message conventions users already know: bare words and
//! quoted phrases are tags, `cap:` introduces a caption needle, and `date:`
//! introduces a date range.
//!
//! ## Example
//! ```
//! use magpie_syntax::parse_query;
//!
//! let query = parse_query("hiking \"New York\" cap: Central Park date: 202204-20230602");
//! assert_eq!(query.tags, ["hiking", "New York"]);
//! assert_eq!(query.caption, "Central Park");
//! assert_eq!(query.start_date.as_deref(), Some("202204"));
//! assert_eq!(query.end_date.as_deref(), Some("20230602"));
//! ```
//!
//! Parsing is total: any line yields a `Query`. Date tokens are carried as
//! opaque strings; whether they decompose into year/month/day is the filter
//! engine's concern, reported there as a notice instead of an error here.

/// Parses one chat line into a [`Query`].
///
/// ```
/// use magpie_syntax::parse_query;
/// let query = parse_query("hiking \"New York\" climbing");
/// assert_eq!(query.tags, ["hiking", "New York", "climbing"]);
/// assert_eq!(query.caption, "");
/// assert!(query.start_date.is_none() && query.end_date.is_none());
/// ```
pub fn parse_query(input: &str) -> Query {
    let normalized = normalize_quotes(input);
    assemble(split_blocks(&normalized))
}

/// One chat line, split into its three independent facets.
///
/// Tags keep their input order and are not deduplicated. The caption is the
/// space-joined text after a `cap:` directive, `""` when absent. Both dates
/// are raw digit strings (`YYYY`, `YYYYMM` or `YYYYMMDD`); when both are
/// present the parser guarantees `start_date <= end_date` lexicographically,
/// which orders correctly because the accepted forms are fixed-width numeric
/// prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub tags: Vec<String>,
    pub caption: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Query {
    /// True when the query carries no filter at all.
    ///
    /// ```
    /// use magpie_syntax::parse_query;
    /// assert!(parse_query("   ").is_empty());
    /// assert!(!parse_query("hiking").is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.caption.is_empty()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Folds the curly double-quote variants (U+201C, U+201D, U+201E) that chat
/// keyboards insert into the ASCII `"` the block scanner understands.
fn normalize_quotes(input: &str) -> String {
    input.replace(['\u{201c}', '\u{201d}', '\u{201e}'], "\"")
}

/// Splits a line into blocks: a double-quoted span with non-empty content is
/// one block (boundary quotes stripped, inner whitespace kept), anything else
/// is a maximal run of non-whitespace characters. A quote that does not open
/// a well-formed span is an ordinary character of the surrounding run.
fn split_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if let Some(after_quote) = rest.strip_prefix('"') {
            // `""` is not a phrase, it falls through to the word path below.
            if let Some(end) = after_quote.find('"').filter(|&end| end > 0) {
                blocks.push(after_quote[..end].to_string());
                rest = &after_quote[end + 1..];
                continue;
            }
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        blocks.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    blocks
}

/// Directive keywords match as ASCII case-insensitive prefixes, so `CAP:`,
/// `Date:` and `date:19…` all count. The directive block itself never
/// contributes text to any facet.
fn is_directive(block: &str, keyword: &str) -> bool {
    block.len() >= keyword.len()
        && block.is_char_boundary(keyword.len())
        && block[..keyword.len()].eq_ignore_ascii_case(keyword)
}

fn split_date_range(token: &str) -> (String, String) {
    match token.split_once('-') {
        Some((start, end)) => (start.to_string(), end.to_string()),
        None => (token.to_string(), token.to_string()),
    }
}

// The scan keeps three accumulators and a caption-mode flag. `cap:` flips
// into caption mode, `date:` always ends it and consumes exactly the next
// block as the range token, every other block lands in the active
// accumulator.
fn assemble(blocks: Vec<String>) -> Query {
    let mut tags = Vec::new();
    let mut caption_words: Vec<String> = Vec::new();
    let mut start_date = None;
    let mut end_date = None;
    let mut collecting_caption = false;

    let mut blocks = blocks.into_iter();
    while let Some(block) = blocks.next() {
        if is_directive(&block, "date:") {
            collecting_caption = false;
            if let Some(token) = blocks.next() {
                let (start, end) = split_date_range(&token);
                start_date = Some(start);
                end_date = Some(end);
            }
        } else if is_directive(&block, "cap:") {
            collecting_caption = true;
        } else if collecting_caption {
            caption_words.push(block.replace('"', ""));
        } else {
            tags.push(block.trim_matches('"').to_string());
        }
    }

    let reversed = matches!((&start_date, &end_date), (Some(start), Some(end)) if start > end);
    if reversed {
        std::mem::swap(&mut start_date, &mut end_date);
    }

    Query {
        tags,
        caption: caption_words.join(" "),
        start_date,
        end_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_parses_to_empty_query() {
        assert_eq!(parse_query(""), Query::default());
        assert_eq!(parse_query("  \t "), Query::default());
    }

    #[test]
    fn quoted_phrase_is_one_block() {
        assert_eq!(
            split_blocks("hiking \"New York\" climbing"),
            ["hiking", "New York", "climbing"]
        );
    }

    #[test]
    fn phrase_directly_followed_by_word() {
        assert_eq!(split_blocks("\"a b\"x"), ["a b", "x"]);
    }

    #[test]
    fn quote_inside_a_word_does_not_open_a_phrase() {
        assert_eq!(split_blocks("ab\"cd ef\""), ["ab\"cd", "ef\""]);
    }

    #[test]
    fn unterminated_quote_is_an_ordinary_character() {
        assert_eq!(split_blocks("\"foo bar"), ["\"foo", "bar"]);
    }

    #[test]
    fn empty_quotes_are_not_a_phrase() {
        assert_eq!(split_blocks("\"\"x y"), ["\"\"x", "y"]);
    }

    #[test]
    fn curly_quotes_are_normalized() {
        let query = parse_query("hiking \u{201c}New York\u{201d} climbing");
        assert_eq!(query.tags, ["hiking", "New York", "climbing"]);
        let query = parse_query("\u{201e}Central Park\u{201c}");
        assert_eq!(query.tags, ["Central Park"]);
    }

    #[test]
    fn directive_keywords_are_case_insensitive() {
        let query = parse_query("hiking Cap: by the lake DATE: 2022");
        assert_eq!(query.tags, ["hiking"]);
        assert_eq!(query.caption, "by the lake");
        assert_eq!(query.start_date.as_deref(), Some("2022"));
        assert_eq!(query.end_date.as_deref(), Some("2022"));
    }

    #[test]
    fn tag_text_keeps_its_case() {
        let query = parse_query("Hiking \"New York\"");
        assert_eq!(query.tags, ["Hiking", "New York"]);
    }

    #[test]
    fn duplicate_tags_are_kept_in_order() {
        let query = parse_query("a b a");
        assert_eq!(query.tags, ["a", "b", "a"]);
    }

    #[test]
    fn date_without_separator_is_both_bounds() {
        let query = parse_query("date: 20220601");
        assert_eq!(query.start_date.as_deref(), Some("20220601"));
        assert_eq!(query.end_date.as_deref(), Some("20220601"));
    }

    #[test]
    fn reversed_range_is_swapped() {
        let query = parse_query("date: 20230601-20220601");
        assert_eq!(query.start_date.as_deref(), Some("20220601"));
        assert_eq!(query.end_date.as_deref(), Some("20230601"));
    }

    #[test]
    fn date_at_end_of_input_is_ignored() {
        let query = parse_query("hiking date:");
        assert_eq!(query.tags, ["hiking"]);
        assert!(query.start_date.is_none() && query.end_date.is_none());
    }

    #[test]
    fn malformed_date_token_passes_through() {
        let query = parse_query("date: junk-stuff");
        assert_eq!(query.start_date.as_deref(), Some("junk"));
        assert_eq!(query.end_date.as_deref(), Some("stuff"));
    }

    #[test]
    fn caption_stops_at_date_directive() {
        let query = parse_query("cap: A lovely day date: 2022 tagged");
        assert_eq!(query.caption, "A lovely day");
        assert_eq!(query.start_date.as_deref(), Some("2022"));
        // after the consumed range token the scan is back in tag mode
        assert_eq!(query.tags, ["tagged"]);
    }

    #[test]
    fn caption_blocks_are_stripped_of_quotes() {
        let query = parse_query("cap: \"quiet\" morning\" light");
        assert_eq!(query.caption, "quiet morning light");
    }
}
