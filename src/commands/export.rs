use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{DecimalSeparator, Records};
use crate::{utils, Result};
use std::path::Path;

/// Writes `records` as CSV to `output`, replacing whatever was there before.
///
/// Each line is `date,"category",,"amount","description"`. There is no header row and no trailing
/// newline. With `DecimalSeparator::Comma` the amount's decimal point becomes a comma.
///
/// # Errors
/// - `OutputFailure` if the file cannot be written.
pub async fn write_csv(
    records: &Records,
    output: &Path,
    separator: DecimalSeparator,
) -> Result<Out<()>> {
    let csv = records.to_csv(separator);
    utils::write(output, &csv)
        .await
        .pub_result(ErrorType::OutputFailure)?;
    let last_line = csv.rsplit('\n').next().unwrap_or_default();
    Ok(format!(
        "Correctly exported CSV to {}. Last entry: {last_line}",
        output.display()
    )
    .into())
}
