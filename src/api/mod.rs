//! The narrow interface to a remote spreadsheet service, and its implementations.
//!
//! - `GoogleSheet` talks to the Google Sheets API as a service account.
//! - `TestSheet` keeps worksheets in memory so the whole program can run without Google.

mod oauth;
mod sheet;
mod sheet_test_client;

use crate::config::SyncTarget;
use crate::error::{Error, ErrorType};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub(crate) use oauth::TokenProvider;
pub(crate) use sheet::GoogleSheet;
pub(crate) use sheet_test_client::TestSheet;

/// The only OAuth scope requested: read and write access to spreadsheets.
const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// When this variable is set and non-empty, `Mode::Test` is used and nothing is sent to Google.
const TEST_MODE_VAR: &str = "EXPENSE_EXPORT_IN_TEST_MODE";

/// Whether the spreadsheet sink talks to Google or to an in-memory sheet.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Google,
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);

impl Mode {
    /// Returns `Mode::Test` when `EXPENSE_EXPORT_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// A spreadsheet document and its worksheets, as loaded from the service.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    title: String,
    worksheets: Vec<Worksheet>,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, worksheets: Vec<Worksheet>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            worksheets,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    /// Finds the worksheet whose title is exactly `title`.
    ///
    /// # Errors
    /// - `WorksheetNotFound`, listing the titles that do exist.
    pub fn worksheet_by_title(&self, title: &str) -> Result<&Worksheet> {
        self.worksheets
            .iter()
            .find(|w| w.title == title)
            .ok_or_else(|| {
                let available: Vec<&str> =
                    self.worksheets.iter().map(|w| w.title.as_str()).collect();
                Error::msg(
                    ErrorType::WorksheetNotFound,
                    format!(
                        "There is no worksheet titled '{title}' in \"{}\". Available worksheets: {}",
                        self.title,
                        available.join(", ")
                    ),
                )
            })
    }
}

/// One tab of a spreadsheet document.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Worksheet {
    sheet_id: i64,
    title: String,
    row_count: u64,
    column_count: u64,
}

impl Worksheet {
    pub fn new(sheet_id: i64, title: impl Into<String>, row_count: u64, column_count: u64) -> Self {
        Self {
            sheet_id,
            title: title.into(),
            row_count,
            column_count,
        }
    }

    /// The number of rows in the worksheet's grid, whether or not they hold data.
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// The number of columns in the worksheet's grid.
    pub fn column_count(&self) -> u64 {
        self.column_count
    }

    pub fn sheet_id(&self) -> i64 {
        self.sheet_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Builds an A1-notation range on this worksheet, e.g. `'My Sheet'!A2:ZZ`. The title is always
    /// quoted so spaces and punctuation are safe.
    pub(crate) fn range(&self, cells: &str) -> String {
        format!("'{}'!{cells}", self.title.replace('\'', "''"))
    }

    /// The rows below the header, e.g. `'Expenses'!2:1000`, or `None` if the grid has no such
    /// rows.
    pub(crate) fn data_range(&self) -> Option<String> {
        (self.row_count >= 2).then(|| self.range(&format!("2:{}", self.row_count)))
    }

    /// Pads `values` with empty cells to the width of the grid so that stale cells to the right
    /// are blanked too.
    pub(crate) fn padded_row(&self, values: &[&str]) -> Vec<String> {
        let width = usize::try_from(self.column_count)
            .unwrap_or(usize::MAX)
            .max(values.len());
        let mut row: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        row.resize(width, String::new());
        row
    }
}

/// The operations needed to replace the contents of a worksheet. Implementations tag their errors
/// with `DocumentUnavailable` or `RemoteFailure` as appropriate.
#[async_trait::async_trait]
pub(crate) trait Spreadsheet: Send {
    /// Loads the document's title and worksheet list.
    async fn load_document(&mut self, document_id: &str) -> Result<Document>;

    /// Overwrites the first row of `worksheet` with `header`.
    async fn set_header(
        &mut self,
        document: &Document,
        worksheet: &Worksheet,
        header: &[&str],
    ) -> Result<()>;

    /// Clears every row below the header.
    async fn clear_rows(&mut self, document: &Document, worksheet: &Worksheet) -> Result<()>;

    /// Appends `rows` below the last non-empty row, in order.
    async fn append_rows(
        &mut self,
        document: &Document,
        worksheet: &Worksheet,
        rows: &[Vec<String>],
    ) -> Result<()>;
}

/// Creates the `Spreadsheet` implementation for `mode`. In `Mode::Google` this authenticates the
/// service account described by `target`.
pub(crate) async fn spreadsheet(target: &SyncTarget, mode: Mode) -> Result<Box<dyn Spreadsheet>> {
    match mode {
        Mode::Google => {
            let token_provider = TokenProvider::service_account(
                target.service_account_email(),
                target.private_key(),
            )
            .await?;
            Ok(Box::new(GoogleSheet::new(token_provider)))
        }
        Mode::Test => Ok(Box::new(TestSheet::seeded(target.document_id()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document::new(
            "doc",
            "Budget",
            vec![
                Worksheet::new(0, "Expenses", 1000, 26),
                Worksheet::new(7, "Summary", 100, 4),
            ],
        )
    }

    #[test]
    fn test_worksheet_by_title() {
        let document = document();
        let worksheet = document.worksheet_by_title("Summary").unwrap();
        assert_eq!(7, worksheet.sheet_id());
    }

    #[test]
    fn test_worksheet_by_title_is_exact() {
        let err = document().worksheet_by_title("expenses").unwrap_err();
        assert_eq!(ErrorType::WorksheetNotFound, err.error_type());
        assert!(err.to_string().contains("Expenses, Summary"));
    }

    #[test]
    fn test_range_quotes_title() {
        assert_eq!(
            "'Expenses'!1:1",
            Worksheet::new(0, "Expenses", 10, 5).range("1:1")
        );
        assert_eq!(
            "'Bob''s Money'!A2:ZZ",
            Worksheet::new(0, "Bob's Money", 10, 5).range("A2:ZZ")
        );
    }

    #[test]
    fn test_data_range() {
        assert_eq!(
            Some("'Expenses'!2:1000".to_string()),
            Worksheet::new(0, "Expenses", 1000, 26).data_range()
        );
        assert_eq!(None, Worksheet::new(0, "Expenses", 1, 26).data_range());
    }

    #[test]
    fn test_padded_row() {
        let worksheet = Worksheet::new(0, "Expenses", 10, 7);
        assert_eq!(
            vec!["date", "category", "", "amount", "description", "", ""],
            worksheet.padded_row(&crate::model::HEADER)
        );
        let narrow = Worksheet::new(0, "Expenses", 10, 2);
        assert_eq!(5, narrow.padded_row(&crate::model::HEADER).len());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!("google", Mode::Google.to_string());
        assert_eq!("test", Mode::Test.to_string());
    }
}
