use crate::record::{IMAGE_FORMATS, MediaRecord, RecordId, VIDEO_FORMATS, parse_capture_timestamp};
use anyhow::{Context, Result, bail};
use itertools::Itertools;
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{debug, info};

/// Column name that separates descriptive metadata from tag columns: every
/// header cell after `Tags` names one tag.
const TAG_SENTINEL: &str = "Tags";

/// The exporter writes this spelled-out value for png rows.
const LEGACY_PNG_TYPE: &str = "Portable Network Graphics";

/// The immutable photo metadata table.
///
/// Loaded once at startup from a comma-delimited export and never mutated
/// afterwards, so it can be shared freely between concurrent queries. Tag
/// membership is stored as one posting list of record ids per tag instead of
/// one boolean cell per record and tag, keyed by the lowercased tag name for
/// case-insensitive lookup.
#[derive(Debug)]
pub struct MediaTable {
    records: Vec<MediaRecord>,
    tags: Vec<String>,
    postings: BTreeMap<String, Vec<RecordId>>,
}

impl MediaTable {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read metadata table {path:?}"))?;
        let table = Self::from_delimited(&raw)
            .with_context(|| format!("failed to load metadata table {path:?}"))?;
        info!(
            records = table.len(),
            tags = table.tags().len(),
            "metadata table loaded"
        );
        Ok(table)
    }

    /// Builds the table from the delimited export text. Fails when the
    /// header misses a required column, a row has an unknown file type, or a
    /// capture timestamp does not parse.
    pub fn from_delimited(raw: &str) -> Result<Self> {
        let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
        let header_line = lines.next().context("metadata table is empty")?;
        let header = split_delimited(header_line);
        let layout = Layout::from_header(&header)?;

        let tags: Vec<String> = header[layout.first_tag..].iter().cloned().sorted().collect();
        let mut postings: BTreeMap<String, Vec<RecordId>> =
            tags.iter().map(|tag| (tag.to_lowercase(), Vec::new())).collect();
        if postings.len() != tags.len() {
            bail!("tag columns collide case-insensitively: {:?}", tags);
        }

        let mut records = Vec::new();
        for (line_no, line) in lines.enumerate() {
            let row = split_delimited(line);
            if row.len() != header.len() {
                bail!(
                    "row {} has {} fields, header has {}",
                    line_no + 2,
                    row.len(),
                    header.len()
                );
            }
            let id = records.len();
            records.push(
                layout
                    .record_from_row(&row)
                    .with_context(|| format!("row {} is malformed", line_no + 2))?,
            );
            for (column, tag) in header[layout.first_tag..].iter().enumerate() {
                let cell = &row[layout.first_tag + column];
                if parse_bool_cell(cell)
                    .with_context(|| format!("row {}, tag column {tag:?}", line_no + 2))?
                {
                    postings
                        .get_mut(&tag.to_lowercase())
                        .expect("every tag column was seeded above")
                        .push(id);
                }
            }
        }
        debug!(records = records.len(), "table rows decoded");

        Ok(Self {
            records,
            tags,
            postings,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, id: RecordId) -> &MediaRecord {
        &self.records[id]
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    /// Canonical tag names, sorted.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Every canonical tag with the number of records carrying it.
    pub fn tag_counts(&self) -> Vec<(&str, usize)> {
        self.tags
            .iter()
            .map(|tag| {
                let ids = &self.postings[&tag.to_lowercase()];
                (tag.as_str(), ids.len())
            })
            .collect()
    }

    /// Record ids carrying `tag`, matched case-insensitively. `None` when the
    /// tag is unknown to the table.
    pub fn tag_postings(&self, tag: &str) -> Option<&[RecordId]> {
        self.postings.get(&tag.to_lowercase()).map(Vec::as_slice)
    }
}

/// Column offsets resolved from the header row.
struct Layout {
    name: usize,
    folder: usize,
    file_type: usize,
    caption: Option<usize>,
    author: Option<usize>,
    captured_at: usize,
    first_tag: usize,
}

impl Layout {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |wanted: &str| {
            header
                .iter()
                .position(|column| column.eq_ignore_ascii_case(wanted))
        };
        let require = |wanted: &str| {
            find(wanted).with_context(|| format!("header is missing the {wanted:?} column"))
        };
        let sentinel = header
            .iter()
            .position(|column| column == TAG_SENTINEL)
            .with_context(|| format!("header is missing the {TAG_SENTINEL:?} sentinel column"))?;
        Ok(Self {
            name: require("Name")?,
            folder: require("Folder")?,
            file_type: require("FileType")?,
            caption: find("Caption"),
            author: find("Author"),
            captured_at: require("DbDate")?,
            first_tag: sentinel + 1,
        })
    }

    fn record_from_row(&self, row: &[String]) -> Result<MediaRecord> {
        let file_type = normalize_file_type(&row[self.file_type]);
        if !IMAGE_FORMATS.contains(&file_type.as_str())
            && !VIDEO_FORMATS.contains(&file_type.as_str())
        {
            bail!("unknown file type {:?}", row[self.file_type]);
        }
        let captured_at = row[self.captured_at].clone();
        let captured = parse_capture_timestamp(&captured_at)?;
        let cell = |index: Option<usize>| {
            index
                .map(|index| row[index].trim())
                .filter(|value| !value.is_empty())
        };
        Ok(MediaRecord {
            name: row[self.name].clone(),
            folder: row[self.folder].clone(),
            file_type,
            caption: cell(self.caption).unwrap_or_default().to_string(),
            author: cell(self.author).map(str::to_string),
            captured_at,
            year: captured.year(),
            month: captured.month(),
            day: captured.day(),
        })
    }
}

fn normalize_file_type(raw: &str) -> String {
    if raw == LEGACY_PNG_TYPE {
        "png".to_string()
    } else {
        raw.to_lowercase()
    }
}

fn parse_bool_cell(cell: &str) -> Result<bool> {
    match cell.trim() {
        "" | "0" => Ok(false),
        "1" => Ok(true),
        other if other.eq_ignore_ascii_case("true") => Ok(true),
        other if other.eq_ignore_ascii_case("false") => Ok(false),
        other => bail!("cell {other:?} is not a boolean"),
    }
}

/// Splits one comma-delimited line. Fields may be wrapped in double quotes to
/// carry commas, with embedded quotes doubled.
fn split_delimited(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(ch),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_fields() {
        assert_eq!(split_delimited("a,b,c"), ["a", "b", "c"]);
        assert_eq!(split_delimited("a,,c"), ["a", "", "c"]);
    }

    #[test]
    fn splits_quoted_fields_with_commas() {
        assert_eq!(
            split_delimited("x,\"a, lovely, day\",y"),
            ["x", "a, lovely, day", "y"]
        );
    }

    #[test]
    fn doubled_quotes_unescape() {
        assert_eq!(split_delimited("\"say \"\"cheese\"\"\",z"), ["say \"cheese\"", "z"]);
    }

    #[test]
    fn legacy_png_value_is_rewritten() {
        assert_eq!(normalize_file_type("Portable Network Graphics"), "png");
        assert_eq!(normalize_file_type("JPG"), "jpg");
    }

    #[test]
    fn boolean_cells() {
        assert!(parse_bool_cell("True").unwrap());
        assert!(parse_bool_cell("1").unwrap());
        assert!(!parse_bool_cell("False").unwrap());
        assert!(!parse_bool_cell("").unwrap());
        assert!(parse_bool_cell("maybe").is_err());
    }
}
