//! CSV import and export of ideas.
//!
//! Export projects every idea onto a fixed column set and prefixes the text
//! with a UTF-8 byte-order-mark so spreadsheet tools pick the right encoding.
//! Import is all-or-nothing: the first row missing a title or content aborts
//! the whole batch, and unrecognized or out-of-vocabulary values fall back to
//! their defaults.

use std::{
    collections::{HashMap, HashSet},
    io::Read,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::{
    generate_id, split_tags, timestamp_now, write_atomically, Idea, PlanError, Priority, Result,
    Status,
};

/// Byte-order-mark written ahead of exported text
pub const UTF8_BOM: char = '\u{feff}';

const UTF8_BOM_BYTES: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Column order of an exported file
pub const EXPORT_COLUMNS: [&str; 7] = [
    "id",
    "title",
    "content",
    "status",
    "tags",
    "createdAt",
    "updatedAt",
];

/// Columns an import cannot do without, in the order they are checked
pub const REQUIRED_COLUMNS: [&str; 2] = ["title", "content"];

/// Separator between tags inside the `tags` column
pub const TAG_SEPARATOR: char = ';';

const MISSING_FIELDS_REASON: &str = "title and content are required";

/// One exported row, fields in `EXPORT_COLUMNS` order
#[derive(Serialize)]
struct CsvIdea<'a> {
    id: &'a str,
    title: &'a str,
    content: &'a str,
    status: &'a str,
    tags: String,
    #[serde(rename = "createdAt")]
    created_at: &'a str,
    #[serde(rename = "updatedAt")]
    updated_at: &'a str,
}

impl<'a> From<&'a Idea> for CsvIdea<'a> {
    fn from(idea: &'a Idea) -> Self {
        CsvIdea {
            id: &idea.id,
            title: &idea.title,
            content: &idea.content,
            status: idea.status.as_str(),
            tags: idea.tags.join(&TAG_SEPARATOR.to_string()),
            created_at: &idea.created_at,
            updated_at: &idea.updated_at,
        }
    }
}

fn export_failed(e: impl std::fmt::Display) -> PlanError {
    error!("Failed to serialize ideas to CSV: {}", e);
    PlanError::ExportFailed {
        message: e.to_string(),
    }
}

/// Serializes `ideas` to CSV text, header included, prefixed with a BOM.
///
/// The priority field is not part of the exported column set.
pub fn export_to_csv(ideas: &[Idea]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS).map_err(export_failed)?;
    for idea in ideas {
        writer.serialize(CsvIdea::from(idea)).map_err(export_failed)?;
    }

    let bytes = writer.into_inner().map_err(export_failed)?;
    let body = String::from_utf8(bytes).map_err(export_failed)?;

    debug!("Serialized {} ideas to CSV", ideas.len());
    Ok(format!("{}{}", UTF8_BOM, body))
}

/// Exports `ideas` to `path`.
///
/// The text is fully serialized before anything touches the filesystem and
/// then written through a temporary file, so a failure leaves no partial file.
pub fn export_to_file(ideas: &[Idea], path: &Path) -> Result<PathBuf> {
    let csv = export_to_csv(ideas)?;

    let written = write_atomically(path, csv.as_bytes()).map_err(export_failed)?;
    info!(
        "Exported {} ideas to {}",
        ideas.len(),
        written.display()
    );
    Ok(written)
}

/// File name used when the user does not pick one, e.g. `linkedin-posts-2024-05-01.csv`
pub fn default_export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Reads the whole input as UTF-8 and drops a leading byte-order-mark
fn read_csv_text<R: Read>(mut reader: R) -> Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| PlanError::Parse {
        detail: e.to_string(),
    })?;

    let text = String::from_utf8(bytes).map_err(|e| PlanError::Parse {
        detail: e.to_string(),
    })?;

    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn read_headers(csv_reader: &mut csv::Reader<&[u8]>) -> Result<StringRecord> {
    csv_reader
        .headers()
        .cloned()
        .map_err(|e| PlanError::Parse {
            detail: e.to_string(),
        })
}

/// Decodes the header row alone; data rows are never read
fn header_names<R: Read>(csv_reader: &mut csv::Reader<R>) -> Result<Vec<String>> {
    let raw = csv_reader.byte_headers().map_err(|e| PlanError::Parse {
        detail: e.to_string(),
    })?;

    raw.iter()
        .enumerate()
        .map(|(position, field)| {
            let field = match position {
                0 => field.strip_prefix(UTF8_BOM_BYTES).unwrap_or(field),
                _ => field,
            };
            std::str::from_utf8(field)
                .map(str::to_string)
                .map_err(|e| PlanError::Parse {
                    detail: format!("header column {}: {}", position + 1, e),
                })
        })
        .collect()
}

/// Checks that the header row names every required column.
///
/// Only the header is parsed, so malformed data rows do not affect the result.
/// Column order and extra columns are irrelevant. On failure every missing
/// column is listed, `title` before `content`.
pub fn validate_structure<R: Read>(reader: R) -> Result<()> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = header_names(&mut csv_reader)?;
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == **required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        debug!("CSV header accepted: {:?}", headers);
        Ok(())
    } else {
        warn!("CSV header is missing columns: {}", missing.join(", "));
        Err(PlanError::MissingColumns { columns: missing })
    }
}

/// Header name to column position, first occurrence wins
struct ColumnIndex(HashMap<String, usize>);

impl ColumnIndex {
    fn new(headers: &StringRecord) -> Self {
        let mut map = HashMap::new();
        for (position, name) in headers.iter().enumerate() {
            map.entry(name.to_string()).or_insert(position);
        }
        ColumnIndex(map)
    }

    /// Value of `column` in `record`, `None` when the column or the value is absent
    fn field<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.0
            .get(column)
            .and_then(|&position| record.get(position))
            .filter(|value| !value.is_empty())
    }
}

/// Parses CSV text into ideas, applying the defaulting rules to every row.
///
/// Fails with `RowValidation` on the first row (1-indexed) whose title or
/// content is empty, or whose explicit id repeats an earlier one; no ideas are
/// returned in that case. Unreadable or non-UTF-8 input fails with `Parse`.
pub fn import_from_csv<R: Read>(reader: R) -> Result<Vec<Idea>> {
    let text = read_csv_text(reader)?;
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = read_headers(&mut csv_reader)?;
    let columns = ColumnIndex::new(&headers);

    let records = csv_reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()
        .map_err(|e| {
            error!("Failed to parse CSV input: {}", e);
            PlanError::Parse {
                detail: e.to_string(),
            }
        })?;

    // Explicit ids are reserved up front so synthesized ones never collide with them
    let mut taken: HashSet<String> = records
        .iter()
        .filter_map(|record| columns.field(record, "id"))
        .map(str::to_string)
        .collect();
    let mut seen_explicit = HashSet::new();

    let mut ideas = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let row = index + 1;

        if record.len() != headers.len() {
            warn!(
                "Row {} has {} fields, header has {}",
                row,
                record.len(),
                headers.len()
            );
        }

        let title = columns.field(record, "title").map(str::trim).unwrap_or("");
        let content = columns.field(record, "content").map(str::trim).unwrap_or("");
        if title.is_empty() || content.is_empty() {
            warn!("Rejecting import at row {}: {}", row, MISSING_FIELDS_REASON);
            return Err(PlanError::RowValidation {
                row,
                reason: MISSING_FIELDS_REASON.to_string(),
            });
        }

        let id = match columns.field(record, "id") {
            Some(id) => {
                if !seen_explicit.insert(id.to_string()) {
                    return Err(PlanError::RowValidation {
                        row,
                        reason: format!("duplicate id {}", id),
                    });
                }
                id.to_string()
            }
            None => unique_id(&mut taken),
        };

        let tags = columns
            .field(record, "tags")
            .map(|raw| split_tags(raw, TAG_SEPARATOR))
            .unwrap_or_default();

        let created_at = columns
            .field(record, "createdAt")
            .map(str::to_string)
            .unwrap_or_else(timestamp_now);
        let updated_at = columns
            .field(record, "updatedAt")
            .map(str::to_string)
            .unwrap_or_else(timestamp_now);

        ideas.push(Idea {
            id,
            title: title.to_string(),
            content: content.to_string(),
            status: Status::parse_or_default(columns.field(record, "status")),
            priority: Priority::parse_or_default(columns.field(record, "priority")),
            tags,
            created_at,
            updated_at,
        });
    }

    info!("Parsed {} ideas from CSV", ideas.len());
    Ok(ideas)
}

/// Generates an id not yet present in `taken` and reserves it
fn unique_id(taken: &mut HashSet<String>) -> String {
    loop {
        let id = generate_id();
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(text: &str) -> Result<Vec<Idea>> {
        import_from_csv(text.as_bytes())
    }

    #[test]
    fn export_writes_bom_header_and_joined_tags() {
        let mut idea = Idea::new("Hello, world".into(), "line one\nline two".into(), vec![
            "a".into(),
            "b".into(),
        ]);
        idea.id = "1".into();
        idea.created_at = "2023-01-01T00:00:00.000Z".into();
        idea.updated_at = "2023-01-02T00:00:00.000Z".into();

        let csv = export_to_csv(&[idea]).unwrap();
        assert!(csv.starts_with(UTF8_BOM));

        let mut lines = csv.trim_start_matches(UTF8_BOM).split("\r\n");
        assert_eq!(
            lines.next(),
            Some("id,title,content,status,tags,createdAt,updatedAt")
        );
        assert_eq!(
            lines.next(),
            Some("1,\"Hello, world\",\"line one\nline two\",draft,a;b,2023-01-01T00:00:00.000Z,2023-01-02T00:00:00.000Z")
        );
    }

    #[test]
    fn export_of_nothing_is_just_the_header() {
        let csv = export_to_csv(&[]).unwrap();
        assert_eq!(
            csv,
            format!("{}id,title,content,status,tags,createdAt,updatedAt\r\n", UTF8_BOM)
        );
    }

    #[test]
    fn structure_needs_title_and_content_in_any_order() {
        assert!(validate_structure("content,extra,title\n".as_bytes()).is_ok());
        assert!(validate_structure("\u{feff}title,content".as_bytes()).is_ok());

        match validate_structure("title,status\nx,draft\n".as_bytes()) {
            Err(PlanError::MissingColumns { columns }) => assert_eq!(columns, vec!["content"]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn structure_lists_every_missing_column_in_order() {
        match validate_structure("".as_bytes()) {
            Err(PlanError::MissingColumns { columns }) => {
                assert_eq!(columns, vec!["title", "content"])
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let err = validate_structure("id,status\n".as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Required columns not found: title, content");
    }

    #[test]
    fn import_applies_defaults() {
        let ideas = import("title,content\n  Hook  , Body text \n").unwrap();
        assert_eq!(ideas.len(), 1);

        let idea = &ideas[0];
        assert_eq!(idea.title, "Hook");
        assert_eq!(idea.content, "Body text");
        assert_eq!(idea.status, Status::Draft);
        assert_eq!(idea.priority, Priority::Medium);
        assert!(idea.tags.is_empty());
        assert!(!idea.id.is_empty());
        assert!(idea.created_instant().is_some());
    }

    #[test]
    fn invalid_status_falls_back_to_draft() {
        let ideas = import("title,content,status,priority\nT,C,not-a-real-status,urgent\n").unwrap();
        assert_eq!(ideas[0].status, Status::Draft);
        assert_eq!(ideas[0].priority, Priority::Medium);

        let ideas = import("title,content,status,priority\nT,C,published,high\n").unwrap();
        assert_eq!(ideas[0].status, Status::Published);
        assert_eq!(ideas[0].priority, Priority::High);
    }

    #[test]
    fn tags_are_trimmed_and_empties_dropped() {
        let ideas = import("title,content,tags\nT,C,a; b ;c\nT2,C2,\nT3,C3,;;x;\n").unwrap();
        assert_eq!(ideas[0].tags, vec!["a", "b", "c"]);
        assert!(ideas[1].tags.is_empty());
        assert_eq!(ideas[2].tags, vec!["x"]);
    }

    #[test]
    fn missing_required_field_fails_whole_import() {
        let err = import("title,content\nok,fine\n,no title\n").unwrap_err();
        match err {
            PlanError::RowValidation { row, reason } => {
                assert_eq!(row, 2);
                assert_eq!(reason, MISSING_FIELDS_REASON);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(matches!(
            import("title,content\nonly title,   \n"),
            Err(PlanError::RowValidation { row: 1, .. })
        ));
        assert!(matches!(
            import("title\njust a title\n"),
            Err(PlanError::RowValidation { row: 1, .. })
        ));
    }

    #[test]
    fn blank_lines_are_skipped_for_row_numbers() {
        let err = import("title,content\n\nA,B\n\n\n,C\n").unwrap_err();
        assert!(matches!(err, PlanError::RowValidation { row: 2, .. }));
    }

    #[test]
    fn ids_are_reused_or_synthesized_uniquely() {
        let ideas = import("id,title,content\nkeep-me,A,B\n,C,D\n,E,F\n").unwrap();
        assert_eq!(ideas[0].id, "keep-me");
        assert_ne!(ideas[1].id, ideas[2].id);
        assert_ne!(ideas[1].id, "keep-me");
    }

    #[test]
    fn repeated_explicit_id_is_rejected() {
        let err = import("id,title,content\nx,A,B\nx,C,D\n").unwrap_err();
        assert!(matches!(err, PlanError::RowValidation { row: 2, .. }));
    }

    #[test]
    fn timestamps_pass_through_unvalidated() {
        let ideas = import("title,content,createdAt,updatedAt\nA,B,last tuesday,2024-01-01\n").unwrap();
        assert_eq!(ideas[0].created_at, "last tuesday");
        assert_eq!(ideas[0].updated_at, "2024-01-01");
    }

    #[test]
    fn unknown_columns_and_ragged_rows_are_tolerated() {
        let ideas = import("\u{feff}title,content,mood,tags\nA,B,happy\nC,D,sad,x,extra\n").unwrap();
        assert_eq!(ideas.len(), 2);
        assert!(ideas[0].tags.is_empty());
        assert_eq!(ideas[1].tags, vec!["x"]);
    }

    #[test]
    fn non_utf8_input_is_a_parse_error() {
        let bytes: &[u8] = b"title,content\n\xff\xfe,B\n";
        assert!(matches!(import_from_csv(bytes), Err(PlanError::Parse { .. })));

        let bad_header: &[u8] = b"title,cont\xffent\nA,B\n";
        assert!(matches!(validate_structure(bad_header), Err(PlanError::Parse { .. })));
    }

    #[test]
    fn structure_check_ignores_data_rows() {
        let bytes: &[u8] = b"title,content\nGood,Row\n\xff\xfe,B\n";
        assert!(validate_structure(bytes).is_ok());

        let ragged: &[u8] = b"\xef\xbb\xbfcontent,title\n\"unterminated,x,y,z\n";
        assert!(validate_structure(ragged).is_ok());
    }

    #[test]
    fn header_only_file_imports_nothing() {
        assert!(import("title,content\n").unwrap().is_empty());
    }

    #[test]
    fn default_filename_uses_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            default_export_filename("linkedin-posts", date),
            "linkedin-posts-2024-05-01.csv"
        );
    }
}
