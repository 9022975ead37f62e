/// Scenario documents — CSV text turned into an immutable list of rows.

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::row::{Delay, Row};
use crate::core::csv::{normalize_width, parse_table};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Number of columns a scenario row is normalised to.
pub const COLUMNS: usize = 6;

/// Header cells that mark a leading row to be discarded.
pub const HEADER: (&str, &str) = ("キャラクター名", "セリフ");

/// Column order in the source CSV.
pub mod col {
    pub const SPEAKER: usize = 0;
    pub const LINE: usize = 1;
    pub const SHOW_CHOICES: usize = 2;
    pub const DELAY: usize = 3;
    pub const ANNOTATION: usize = 4;
    pub const DISABLE_CLICK: usize = 5;
}

/// An ordered, immutable sequence of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    rows: Vec<Row>,
}

impl ScenarioDocument {
    /// Load a scenario from a CSV file.
    pub fn load(path: &Path) -> Result<ScenarioDocument, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    /// Parse scenario CSV text.
    ///
    /// Never fails: short rows are padded, long rows truncated, and a blank
    /// delay cell takes the last explicit delay above it.
    pub fn parse(input: &str) -> ScenarioDocument {
        let table = read_table(input);

        let mut last_delay = 0.0f32;
        let rows = table
            .into_iter()
            .enumerate()
            .map(|(i, cells)| {
                let cells = normalize_width(cells, COLUMNS);
                let delay = resolve_delay(&cells[col::DELAY], &mut last_delay, i);
                let speaker = cells[col::SPEAKER].trim();
                Row {
                    speaker: (!speaker.is_empty()).then(|| speaker.to_string()),
                    line: cells[col::LINE].clone(),
                    show_choices: is_flag_set(&cells[col::SHOW_CHOICES]),
                    delay,
                    annotation: cells[col::ANNOTATION].trim().to_string(),
                    disable_click: is_flag_set(&cells[col::DISABLE_CLICK]),
                }
            })
            .collect();

        ScenarioDocument { rows }
    }

    /// Build a document from rows that are already resolved.
    pub fn from_rows(rows: Vec<Row>) -> ScenarioDocument {
        ScenarioDocument { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first click-locked row at or after `from`.
    pub fn next_click_lock(&self, from: usize) -> Option<usize> {
        self.rows
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, row)| row.disable_click)
            .map(|(i, _)| i)
    }
}

/// Raw scenario cells: a leading byte-order mark is dropped, then the table
/// is split and a header row removed.
pub fn read_table(input: &str) -> Vec<Vec<String>> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let mut table = parse_table(input);
    if table.first().is_some_and(|first| is_header(first)) {
        table.remove(0);
    }
    table
}

/// Whether `cells` is the header row. The speaker cell is compared trimmed.
pub fn is_header(cells: &[String]) -> bool {
    let name = cells.get(col::SPEAKER).map(|c| c.trim());
    let line = cells.get(col::LINE).map(String::as_str);
    name == Some(HEADER.0) && line == Some(HEADER.1)
}

/// A flag cell is set only by a literal `1`.
pub fn is_flag_set(cell: &str) -> bool {
    cell.trim() == "1"
}

fn resolve_delay(cell: &str, last: &mut f32, row: usize) -> Delay {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Delay::Inherited(*last);
    }
    match trimmed.parse::<f32>() {
        Ok(value) if value.is_finite() => {
            *last = value.max(0.0);
            Delay::Explicit(*last)
        }
        _ => {
            warn!("row {}: delay '{}' is not a number, inheriting {}", row, trimmed, last);
            Delay::Inherited(*last)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_after_byte_order_mark_is_dropped() {
        let doc = ScenarioDocument::parse("\u{FEFF}キャラクター名,セリフ\nAoi,Hello");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.rows()[0].speaker.as_deref(), Some("Aoi"));
    }

    #[test]
    fn padded_header_name_is_dropped() {
        let doc = ScenarioDocument::parse(" キャラクター名 ,セリフ\r\nAoi,Hello");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.rows()[0].line, "Hello");
    }

    #[test]
    fn byte_order_mark_without_header_is_not_a_speaker() {
        let doc = ScenarioDocument::parse("\u{FEFF}Aoi,Hello");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.rows()[0].speaker.as_deref(), Some("Aoi"));
    }

    #[test]
    fn header_row_is_dropped() {
        let doc = ScenarioDocument::parse("キャラクター名,セリフ\nAoi,Hello");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.rows()[0].speaker.as_deref(), Some("Aoi"));
    }

    #[test]
    fn non_header_first_row_is_kept() {
        let doc = ScenarioDocument::parse("name,line\nAoi,Hello");
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn columns_map_to_fields() {
        let doc = ScenarioDocument::parse(" Aoi ,  spaced line ,1,2.5, looks away ,1");
        let row = &doc.rows()[0];
        assert_eq!(row.speaker.as_deref(), Some("Aoi"));
        assert_eq!(row.line, "  spaced line ");
        assert!(row.show_choices);
        assert_eq!(row.delay, Delay::Explicit(2.5));
        assert_eq!(row.annotation, "looks away");
        assert!(row.disable_click);
    }

    #[test]
    fn short_rows_are_padded() {
        let doc = ScenarioDocument::parse("Aoi");
        let row = &doc.rows()[0];
        assert_eq!(row.line, "");
        assert!(!row.show_choices);
        assert!(!row.disable_click);
    }

    #[test]
    fn blank_delay_inherits_last_explicit() {
        let doc = ScenarioDocument::parse("a,1,,,\nb,2,,1.5\nc,3,,\nd,4,,0\ne,5,,");
        let delays: Vec<Delay> = doc.rows().iter().map(|r| r.delay).collect();
        assert_eq!(
            delays,
            vec![
                Delay::Inherited(0.0),
                Delay::Explicit(1.5),
                Delay::Inherited(1.5),
                Delay::Explicit(0.0),
                Delay::Inherited(0.0),
            ]
        );
    }

    #[test]
    fn negative_and_garbage_delays() {
        let doc = ScenarioDocument::parse("a,1,,-3\nb,2,,soon");
        assert_eq!(doc.rows()[0].delay, Delay::Explicit(0.0));
        assert_eq!(doc.rows()[1].delay, Delay::Inherited(0.0));
    }

    #[test]
    fn flags_need_a_literal_one() {
        assert!(is_flag_set(" 1 "));
        assert!(!is_flag_set("true"));
        assert!(!is_flag_set(""));
        assert!(!is_flag_set("0"));
    }

    #[test]
    fn next_click_lock_scans_forward() {
        let doc = ScenarioDocument::parse("a,1\nb,2,,,,1\nc,3\nd,4,,,,1");
        assert_eq!(doc.next_click_lock(0), Some(1));
        assert_eq!(doc.next_click_lock(2), Some(3));
        assert_eq!(doc.next_click_lock(4), None);
    }
}
