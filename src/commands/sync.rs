use crate::api::{self, Mode, Spreadsheet};
use crate::commands::Out;
use crate::config::{Credentials, SyncTarget};
use crate::model::{Records, SheetRow, HEADER};
use crate::Result;
use serde::Serialize;
use tracing::{debug, info};

/// What a sheet sync wrote.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct SyncReport {
    /// The title of the spreadsheet document.
    pub document_title: String,
    /// The title of the worksheet whose contents were replaced.
    pub worksheet_title: String,
    /// The number of data rows now in the worksheet.
    pub rows_written: usize,
}

/// Replaces the entire contents of the configured worksheet with `records`.
///
/// Credentials are checked before anything else, so a missing one never leads to a network call.
/// Then, in order:
/// 1. Authenticate as the service account (scoped to spreadsheets).
/// 2. Load the document and find the worksheet by title.
/// 3. Overwrite the header row.
/// 4. Clear every data row.
/// 5. Append all records.
///
/// Nothing is merged: rows edited by hand in the worksheet are lost on every sync.
///
/// # Errors
/// - `MissingCredentials` naming each absent credential.
/// - `DocumentUnavailable` if the document id is invalid or not shared with the service account.
/// - `WorksheetNotFound` if the document has no worksheet with the configured title.
/// - `RemoteFailure` for authentication or any other service error.
pub async fn sync_sheet(
    records: &Records,
    credentials: &Credentials,
    mode: Mode,
) -> Result<Out<SyncReport>> {
    let target = credentials.validate()?;
    debug!("Syncing to {target:?} in {mode} mode");
    let mut spreadsheet = api::spreadsheet(&target, mode).await?;
    replace_worksheet(spreadsheet.as_mut(), &target, records).await
}

pub(crate) async fn replace_worksheet(
    spreadsheet: &mut dyn Spreadsheet,
    target: &SyncTarget,
    records: &Records,
) -> Result<Out<SyncReport>> {
    let document = spreadsheet.load_document(target.document_id()).await?;
    let worksheet = document.worksheet_by_title(target.worksheet_title())?;

    spreadsheet.set_header(&document, worksheet, &HEADER).await?;
    spreadsheet.clear_rows(&document, worksheet).await?;

    let rows: Vec<Vec<String>> = records
        .to_sheet_rows()
        .iter()
        .map(SheetRow::values)
        .collect();
    if !rows.is_empty() {
        spreadsheet.append_rows(&document, worksheet, &rows).await?;
    }
    info!(
        "Wrote {} rows to '{}' in \"{}\"",
        rows.len(),
        worksheet.title(),
        document.title()
    );

    let report = SyncReport {
        document_title: document.title().to_string(),
        worksheet_title: worksheet.title().to_string(),
        rows_written: rows.len(),
    };
    Ok(Out::new(
        format!("Correctly uploaded to \"{}\"", document.title()),
        report,
    ))
}
