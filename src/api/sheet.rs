//! Implements the `Spreadsheet` trait against the Google Sheets API.
//!
//! Value writes and clears go through the `sheets::Client`. Document metadata and row appends are
//! plain REST calls made with `reqwest`, since they need fields and query options that the
//! generated client does not expose in a convenient form.

use crate::api::{Document, Spreadsheet, TokenProvider, Worksheet};
use crate::error::{Error, ErrorType, IntoResult, Res};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use reqwest::StatusCode;
use serde::Deserialize;
use sheets::types::{
    BatchClearValuesRequest, BatchUpdateValuesRequest, Dimension, ValueInputOption, ValueRange,
};
use sheets::ClientError;
use tracing::{debug, trace};
use url::Url;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Only the fields needed to find a worksheet and size the ranges written to it.
const DOCUMENT_FIELDS: &str =
    "properties.title,sheets.properties(sheetId,title,gridProperties(rowCount,columnCount))";

/// Implements the `Spreadsheet` trait using the Google Sheets API, authenticated with the bearer
/// token held by a `TokenProvider`.
pub(crate) struct GoogleSheet {
    token_provider: TokenProvider,
    client: sheets::Client,
    http: reqwest::Client,
}

impl GoogleSheet {
    pub(crate) fn new(token_provider: TokenProvider) -> Self {
        let client = create_sheets_client(&token_provider);
        Self {
            token_provider,
            client,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, segments: &[&str]) -> Res<Url> {
        let mut url = Url::parse(SHEETS_API).context("Invalid Sheets API base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("The Sheets API base URL cannot have path segments"))?
            .extend(segments);
        Ok(url)
    }

    /// The `values:append` URL for `worksheet`. Rows are written over the blank rows left by
    /// `clear_rows` so the grid does not grow on every sync.
    fn append_url(&self, document: &Document, worksheet: &Worksheet) -> Res<Url> {
        let append = format!("{}:append", worksheet.range("A1"));
        let mut url = self.url(&[document.id(), "values", &append])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "OVERWRITE");
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Spreadsheet for GoogleSheet {
    async fn load_document(&mut self, document_id: &str) -> Result<Document> {
        trace!("load_document {document_id}");
        let mut url = self
            .url(&[document_id])
            .pub_result(ErrorType::RemoteFailure)?;
        url.query_pairs_mut().append_pair("fields", DOCUMENT_FIELDS);

        let response = self
            .http
            .get(url)
            .bearer_auth(self.token_provider.token())
            .send()
            .await
            .context("Failed to send the spreadsheet request")
            .pub_result(ErrorType::RemoteFailure)?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST
        ) {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::msg(
                ErrorType::DocumentUnavailable,
                format!(
                    "Spreadsheet '{document_id}' could not be loaded ({status}). Check the id \
                    and that the document is shared with the service account. {body}"
                ),
            ));
        }

        let metadata: SpreadsheetMetadata = successful(response, "load the spreadsheet")
            .await
            .pub_result(ErrorType::RemoteFailure)?
            .json()
            .await
            .context("Failed to parse the spreadsheet metadata")
            .pub_result(ErrorType::RemoteFailure)?;

        let worksheets = metadata
            .sheets
            .into_iter()
            .map(|s| {
                let grid = s.properties.grid_properties.unwrap_or_default();
                Worksheet::new(
                    s.properties.sheet_id,
                    s.properties.title,
                    grid.row_count,
                    grid.column_count,
                )
            })
            .collect();
        let document = Document::new(document_id, metadata.properties.title, worksheets);
        debug!(
            "Loaded \"{}\" with {} worksheet(s)",
            document.title(),
            document.worksheets().len()
        );
        Ok(document)
    }

    async fn set_header(
        &mut self,
        document: &Document,
        worksheet: &Worksheet,
        header: &[&str],
    ) -> Result<()> {
        let request = BatchUpdateValuesRequest {
            data: vec![ValueRange {
                major_dimension: Some(Dimension::Rows),
                range: worksheet.range("1:1"),
                values: vec![worksheet.padded_row(header)],
            }],
            include_values_in_response: Some(false),
            response_date_time_render_option: None,
            response_value_render_option: None,
            value_input_option: Some(ValueInputOption::UserEntered),
        };

        self.client
            .spreadsheets()
            .values_batch_update(document.id(), &request)
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to write the header row of '{}'", worksheet.title()))
            .pub_result(ErrorType::RemoteFailure)?;
        Ok(())
    }

    async fn clear_rows(&mut self, document: &Document, worksheet: &Worksheet) -> Result<()> {
        let Some(range) = worksheet.data_range() else {
            trace!("'{}' has no rows below the header", worksheet.title());
            return Ok(());
        };
        let request = BatchClearValuesRequest {
            ranges: vec![range],
        };
        self.client
            .spreadsheets()
            .values_batch_clear(document.id(), &request)
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to clear the rows of '{}'", worksheet.title()))
            .pub_result(ErrorType::RemoteFailure)?;
        Ok(())
    }

    async fn append_rows(
        &mut self,
        document: &Document,
        worksheet: &Worksheet,
        rows: &[Vec<String>],
    ) -> Result<()> {
        let url = self
            .append_url(document, worksheet)
            .pub_result(ErrorType::RemoteFailure)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(self.token_provider.token())
            .json(&serde_json::json!({
                "majorDimension": "ROWS",
                "values": rows,
            }))
            .send()
            .await
            .context("Failed to send the append request")
            .pub_result(ErrorType::RemoteFailure)?;

        successful(response, "append rows")
            .await
            .with_context(|| format!("Failed to append rows to '{}'", worksheet.title()))
            .pub_result(ErrorType::RemoteFailure)?;
        Ok(())
    }
}

/// Returns the response if its status is a success, otherwise an error holding the status and
/// body.
async fn successful(response: reqwest::Response, action: &str) -> Res<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("Google Sheets API failed to {action} with status {status}: {body}")
}

/// Creates a sheets client that sends the service account's access token.
fn create_sheets_client(token_provider: &TokenProvider) -> sheets::Client {
    // The sheets crate requires client_id, client_secret, redirect_uri and refresh_token, but
    // only the access token is used for API calls.
    sheets::Client::new(
        String::new(),
        String::new(),
        String::new(),
        token_provider.token().to_string(),
        String::new(),
    )
}

fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}

/// The subset of the `spreadsheets.get` response selected by `DOCUMENT_FIELDS`.
#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetMetadata>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetMetadata {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    // The API omits a zero sheetId.
    #[serde(default)]
    sheet_id: i64,
    title: String,
    grid_properties: Option<GridProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: u64,
    #[serde(default)]
    column_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spreadsheet_metadata() {
        let json = r#"{
            "properties": { "title": "Household" },
            "sheets": [
                { "properties": { "title": "Expenses", "gridProperties": { "rowCount": 1000, "columnCount": 26 } } },
                { "properties": { "sheetId": 1234, "title": "Summary" } }
            ]
        }"#;
        let metadata: SpreadsheetMetadata = serde_json::from_str(json).unwrap();
        assert_eq!("Household", metadata.properties.title);
        assert_eq!(2, metadata.sheets.len());
        assert_eq!(0, metadata.sheets[0].properties.sheet_id);
        assert_eq!(
            1000,
            metadata.sheets[0]
                .properties
                .grid_properties
                .as_ref()
                .unwrap()
                .row_count
        );
        assert_eq!(1234, metadata.sheets[1].properties.sheet_id);
        assert!(metadata.sheets[1].properties.grid_properties.is_none());
    }

    #[test]
    fn test_append_url() {
        let sheet = GoogleSheet::new(TokenProvider::for_test("token"));
        let document = Document::new("doc123", "Budget", Vec::new());
        let worksheet = Worksheet::new(0, "My Expenses", 10, 5);
        let url = sheet.append_url(&document, &worksheet).unwrap();
        assert_eq!(
            "https://sheets.googleapis.com/v4/spreadsheets/doc123/values/'My%20Expenses'!A1:append",
            format!("{}{}", url.origin().ascii_serialization(), url.path())
        );
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("insertDataOption".to_string(), "OVERWRITE".to_string())));
        assert!(query.contains(&("valueInputOption".to_string(), "USER_ENTERED".to_string())));
    }
}
