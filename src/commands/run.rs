use crate::args::Args;
use crate::commands::{extract, sync_sheet, write_csv, Out, SyncReport};
use crate::{Mode, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// What one run of the pipeline did.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct RunReport {
    /// The number of transactions extracted.
    pub entries: usize,
    /// The CSV file written, if one was requested.
    pub csv: Option<PathBuf>,
    /// The outcome of the sheet sync, if one was requested.
    pub sheet: Option<SyncReport>,
}

/// Extracts the transactions in `input` and hands the same records to each sink that `args`
/// asks for: the CSV file first, then the Google sheet.
///
/// With no sink requested only the extraction happens. A failing sink stops the run, but a CSV
/// file that was already written stays in place.
pub async fn run(args: &Args, input: &Path, mode: Mode) -> Result<Out<RunReport>> {
    let extracted = extract(input).await?;
    extracted.print();
    let records = extracted.into_structure().unwrap_or_default();
    let mut report = RunReport {
        entries: records.len(),
        ..RunReport::default()
    };

    if args.nothing_to_do() {
        info!("Nothing to do!");
    }

    if let Some(output) = args.output() {
        write_csv(&records, output, args.decimal_separator())
            .await?
            .print();
        report.csv = Some(output.to_path_buf());
    }

    if args.gsheets() {
        let synced = sync_sheet(&records, &args.credentials(), mode).await?;
        synced.print();
        report.sheet = synced.into_structure();
    }

    Ok(Out::new("Done", report))
}
