#![allow(dead_code)]
//! Shared fixture for `photo-index` integration tests: a small delimited
//! export with three tags and a mix of image and video rows.

use magpie_syntax::parse_query;
use photo_index::{MediaTable, SearchOutcome};

pub const SAMPLE: &str = "\
Name,Folder,FileType,Caption,Author,DbDate,Tags,Hiking,Beach,\"New York\"
a.jpg,2022\\June,jpg,Sunrise over the rocks,Ada Lovelace,20220601 08:00:00.000000,,True,False,False
b.png,2022\\June,Portable Network Graphics,Beach day,Grace Hopper,20220615 12:30:00.000000,,False,True,False
c.mp4,2022\\July,mp4,Waves crashing,,20220704 18:00:00.000000,,False,True,False
d.jpg,2023\\May,jpg,Central Park in spring,Ada Lovelace,20230501 09:15:00.000000,,True,False,True
e.jpg,2023\\May,jpg,\"Rooftops, New York\",Lin,20230512 17:45:00.000000,,False,False,True
f.jpg,2021\\December,jpg,,,20211224 10:00:00.000000,,True,False,False
";

pub fn sample_table() -> MediaTable {
    MediaTable::from_delimited(SAMPLE).expect("sample table loads")
}

pub fn run(table: &MediaTable, line: &str) -> SearchOutcome {
    table.search(&parse_query(line))
}

pub fn names(table: &MediaTable, outcome: &SearchOutcome) -> Vec<String> {
    outcome
        .records
        .iter()
        .map(|&id| table.record(id).name.clone())
        .collect()
}
