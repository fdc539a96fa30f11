use anyhow::{Context, Result, bail};
use jiff::civil::{Date, DateTime, Time};
use serde::Serialize;

/// Index of a record inside [`crate::MediaTable`]. Stable for the lifetime of
/// the table since the table never mutates after load.
pub type RecordId = usize;

pub const IMAGE_FORMATS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "heic", "heif",
];
pub const VIDEO_FORMATS: &[&str] = &[
    "mp4", "m4v", "mov", "avi", "mkv", "wmv", "webm", "mpg", "mpeg", "3gp",
];

/// One row of the photo metadata table.
///
/// `file_type` is normalized to lowercase and guaranteed to be a member of
/// [`IMAGE_FORMATS`] or [`VIDEO_FORMATS`]. `year`/`month`/`day` are derived
/// from `captured_at` once, at load time, so the date filter never re-parses
/// timestamps per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRecord {
    pub name: String,
    pub folder: String,
    pub file_type: String,
    pub caption: String,
    pub author: Option<String>,
    pub captured_at: String,
    pub year: i16,
    pub month: i8,
    pub day: i8,
}

impl MediaRecord {
    pub fn is_image(&self) -> bool {
        IMAGE_FORMATS.contains(&self.file_type.as_str())
    }

    pub fn is_video(&self) -> bool {
        VIDEO_FORMATS.contains(&self.file_type.as_str())
    }

    /// Path of this record relative to the storage root. Folder fragments
    /// from the exporting tool use `\` separators, delivery backends expect
    /// `/`.
    pub fn storage_path(&self) -> String {
        let folder = self.folder.replace('\\', "/");
        if folder.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", folder.trim_end_matches('/'), self.name)
        }
    }

    /// Caption line shown next to a delivered photo: the caption text plus
    /// the author's first name and a `DD.MM.YYYY HH:MM` capture date.
    pub fn display_line(&self) -> String {
        let mut line = self.caption.clone();
        if let Some(author) = &self.author {
            let first_name = author.split_whitespace().next().unwrap_or(author);
            line.push_str(&format!(" (by {first_name}"));
            if let Ok(captured) = parse_capture_timestamp(&self.captured_at) {
                line.push_str(&format!(" on {}", captured.strftime("%d.%m.%Y %H:%M")));
            }
            line.push(')');
        }
        line
    }
}

/// Parses the exporter's `YYYYMMDD HH:MM:SS.ffffff` timestamp form.
///
/// The date half is fixed-width digits with no separator, so it is decomposed
/// by offset and validated through [`Date::new`] rather than handed to a
/// strptime format.
pub fn parse_capture_timestamp(raw: &str) -> Result<DateTime> {
    let (date_part, time_part) = raw
        .split_once(' ')
        .with_context(|| format!("timestamp {raw:?} has no time component"))?;
    if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
        bail!("timestamp {raw:?} does not start with an 8-digit date");
    }
    let year: i16 = date_part[..4].parse()?;
    let month: i8 = date_part[4..6].parse()?;
    let day: i8 = date_part[6..8].parse()?;
    let date = Date::new(year, month, day)
        .with_context(|| format!("timestamp {raw:?} holds an invalid calendar date"))?;
    let time = Time::strptime("%H:%M:%S%.f", time_part)
        .with_context(|| format!("timestamp {raw:?} holds an invalid time of day"))?;
    Ok(date.to_datetime(time))
}
