//! Implements the `Spreadsheet` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets.

use crate::api::{Document, Spreadsheet, Worksheet};
use crate::error::{Error, ErrorType, Res};
use crate::Result;
use anyhow::Context;
use std::io::Cursor;
use tracing::debug;

/// The title of the seeded document.
const SEED_TITLE: &str = "Expense Export Test Sheet";

/// The number of grid rows in the seeded `Expenses` worksheet, most of them blank.
const SEED_GRID_ROWS: usize = 10;

/// An implementation of the `Spreadsheet` trait that does not use Google sheets. It holds one
/// document, whose worksheets are kept in order, and records the calls made against it.
///
/// Each worksheet is a grid of rows. A blank row is an empty `Vec`. Clearing blanks rows without
/// removing them and appending writes after the last non-blank row, growing the grid only when it
/// runs out of rows.
#[derive(Debug, Clone, Default)]
pub(crate) struct TestSheet {
    document_id: String,
    title: String,
    worksheets: Vec<(String, Vec<Vec<String>>)>,
    calls: Vec<String>,
}

impl TestSheet {
    /// Create a new `TestSheet` for the document `document_id`. Each worksheet is a title and its
    /// rows.
    pub(crate) fn new(
        document_id: impl Into<String>,
        title: impl Into<String>,
        worksheets: Vec<(String, Vec<Vec<String>>)>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            title: title.into(),
            worksheets,
            calls: Vec::new(),
        }
    }

    /// Creates a document called `document_id` holding the seed data from this module: an
    /// `Expenses` worksheet with an old header, stale rows and blank rows below them, and an
    /// untouched `Summary` worksheet.
    pub(crate) fn seeded(document_id: impl Into<String>) -> Self {
        let mut expenses = load_csv(EXPENSES_DATA).unwrap_or_default();
        expenses.resize(SEED_GRID_ROWS.max(expenses.len()), Vec::new());
        let worksheets = vec![
            ("Expenses".to_string(), expenses),
            (
                "Summary".to_string(),
                load_csv(SUMMARY_DATA).unwrap_or_default(),
            ),
        ];
        Self::new(document_id, SEED_TITLE, worksheets)
    }

    /// The non-blank rows of the worksheet titled `title`, in grid order.
    pub(crate) fn rows(&self, title: &str) -> Option<Vec<Vec<String>>> {
        self.grid(title)
            .map(|grid| grid.iter().filter(|r| !is_blank(r)).cloned().collect())
    }

    /// The number of rows in the grid of the worksheet titled `title`, blank or not.
    pub(crate) fn grid_row_count(&self, title: &str) -> Option<usize> {
        self.grid(title).map(<[Vec<String>]>::len)
    }

    fn grid(&self, title: &str) -> Option<&[Vec<String>]> {
        self.worksheets
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, rows)| rows.as_slice())
    }

    /// The names of the operations called so far, in order.
    pub(crate) fn calls(&self) -> &[String] {
        &self.calls
    }

    fn rows_mut(&mut self, worksheet: &Worksheet) -> Result<&mut Vec<Vec<String>>> {
        self.worksheets
            .iter_mut()
            .find(|(t, _)| t == worksheet.title())
            .map(|(_, rows)| rows)
            .ok_or_else(|| {
                Error::msg(
                    ErrorType::RemoteFailure,
                    format!("Unable to parse range: {}", worksheet.range("A1")),
                )
            })
    }

    fn check_document(&self, document: &Document) -> Result<()> {
        if document.id() != self.document_id {
            return Err(Error::msg(
                ErrorType::DocumentUnavailable,
                format!("Requested entity was not found: {}", document.id()),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Spreadsheet for TestSheet {
    async fn load_document(&mut self, document_id: &str) -> Result<Document> {
        self.calls.push("load_document".to_string());
        if document_id != self.document_id {
            return Err(Error::msg(
                ErrorType::DocumentUnavailable,
                format!("Requested entity was not found: {document_id}"),
            ));
        }
        let worksheets = self
            .worksheets
            .iter()
            .enumerate()
            .map(|(ix, (title, rows))| {
                let columns = rows.iter().map(Vec::len).max().unwrap_or_default();
                Worksheet::new(ix as i64, title, rows.len() as u64, columns as u64)
            })
            .collect();
        Ok(Document::new(document_id, &self.title, worksheets))
    }

    async fn set_header(
        &mut self,
        document: &Document,
        worksheet: &Worksheet,
        header: &[&str],
    ) -> Result<()> {
        self.calls.push("set_header".to_string());
        self.check_document(document)?;
        let header = worksheet.padded_row(header);
        let rows = self.rows_mut(worksheet)?;
        match rows.first_mut() {
            Some(first) => *first = header,
            None => rows.push(header),
        }
        Ok(())
    }

    async fn clear_rows(&mut self, document: &Document, worksheet: &Worksheet) -> Result<()> {
        self.calls.push("clear_rows".to_string());
        self.check_document(document)?;
        for row in self.rows_mut(worksheet)?.iter_mut().skip(1) {
            row.clear();
        }
        Ok(())
    }

    async fn append_rows(
        &mut self,
        document: &Document,
        worksheet: &Worksheet,
        rows: &[Vec<String>],
    ) -> Result<()> {
        self.calls.push("append_rows".to_string());
        self.check_document(document)?;
        let grid = self.rows_mut(worksheet)?;
        let start = grid
            .iter()
            .rposition(|r| !is_blank(r))
            .map_or(0, |ix| ix + 1);
        for (offset, row) in rows.iter().enumerate() {
            match grid.get_mut(start + offset) {
                Some(existing) => *existing = row.clone(),
                None => grid.push(row.clone()),
            }
        }
        debug!(
            "Test sheet '{}' now has a grid of {} rows",
            worksheet.title(),
            grid.len()
        );
        Ok(())
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(String::is_empty)
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Res<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.context("Invalid seed CSV data")?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Seed data for the worksheet that gets replaced. The header is from an older layout and the rows
/// include a manual edit, both of which a sync discards.
const EXPENSES_DATA: &str = r##"Date,Category,,Amount,Description,Notes
01/12/2023,Food,,12.5,Pizza,
02/12/2023,Transport,,2.75,Bus,
03/12/2023,,,100,Manual correction,typed by hand
"##;

/// Seed data for a worksheet that a sync never touches.
const SUMMARY_DATA: &str = r##"Month,Total
12/2023,115.25
"##;
