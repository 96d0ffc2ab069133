//! These structs provide the CLI interface for the expense-export CLI.

use crate::config::{
    Credentials, PRIVATE_KEY_VAR, SERVICE_ACCOUNT_EMAIL_VAR, SHEET_ID_VAR, SHEET_TITLE_VAR,
};
use crate::model::DecimalSeparator;
use clap::{Args as ClapArgs, Parser};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// expense-export: Export your Expense Manager transactions to a CSV file or a Google sheet.
///
/// The input is the SQLite backup file written by the Expense Manager app. Only visible
/// transactions are exported, oldest first. Every run replaces the output completely: the CSV
/// file is overwritten and the Google worksheet's rows are cleared and rewritten.
///
/// To use --gsheets you need a Google service account. Share the spreadsheet with the service
/// account's email and provide the credentials through the flags or environment variables below.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    /// The Expense Manager backup file to read.
    #[arg(short, long, value_name = "FILE.expensemanager")]
    input: Option<PathBuf>,

    /// Write the transactions as CSV to this file.
    #[arg(short, long, value_name = "FILE.csv")]
    output: Option<PathBuf>,

    /// Use decimal commas instead of dots in the CSV file.
    #[arg(short = 'c', long)]
    decimal_commas: bool,

    /// Replace the contents of a Google worksheet with the transactions.
    #[arg(short, long)]
    gsheets: bool,

    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    #[clap(flatten)]
    google: GoogleArgs,
}

impl Args {
    pub fn new(
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        decimal_commas: bool,
        gsheets: bool,
        google: GoogleArgs,
    ) -> Self {
        Self {
            input,
            output,
            decimal_commas,
            gsheets,
            log_level: LevelFilter::INFO,
            google,
        }
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn decimal_commas(&self) -> bool {
        self.decimal_commas
    }

    /// The decimal separator to use in the CSV file.
    pub fn decimal_separator(&self) -> DecimalSeparator {
        DecimalSeparator::from_flag(self.decimal_commas)
    }

    pub fn gsheets(&self) -> bool {
        self.gsheets
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    /// True when neither a CSV file nor a Google sheet was requested.
    pub fn nothing_to_do(&self) -> bool {
        self.output.is_none() && !self.gsheets
    }

    /// The spreadsheet credentials, as given. They are only checked when a sync is attempted.
    pub fn credentials(&self) -> Credentials {
        self.google.credentials()
    }
}

/// Credentials and location of the Google worksheet.
#[derive(Debug, ClapArgs, Clone, Default)]
pub struct GoogleArgs {
    /// The email address of the Google service account.
    #[arg(long, env = SERVICE_ACCOUNT_EMAIL_VAR, hide_env_values = true)]
    service_account_email: Option<String>,

    /// The PEM private key of the Google service account. Escaped newlines (\n) are accepted.
    #[arg(long, env = PRIVATE_KEY_VAR, hide_env_values = true)]
    private_key: Option<String>,

    /// The id of the spreadsheet document, or its URL.
    #[arg(long, env = SHEET_ID_VAR)]
    sheet_id: Option<String>,

    /// The title of the worksheet whose contents will be replaced.
    #[arg(long, env = SHEET_TITLE_VAR)]
    sheet_title: Option<String>,
}

impl GoogleArgs {
    pub fn new(
        service_account_email: Option<String>,
        private_key: Option<String>,
        sheet_id: Option<String>,
        sheet_title: Option<String>,
    ) -> Self {
        Self {
            service_account_email,
            private_key,
            sheet_id,
            sheet_title,
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.service_account_email.clone(),
            self.private_key.clone(),
            self.sheet_id.clone(),
            self.sheet_title.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_flags() {
        let args = Args::try_parse_from([
            "expense-export",
            "-i",
            "backup.expensemanager",
            "-o",
            "out.csv",
            "-c",
            "-g",
        ])
        .unwrap();
        assert_eq!(Some(Path::new("backup.expensemanager")), args.input());
        assert_eq!(Some(Path::new("out.csv")), args.output());
        assert!(args.decimal_commas());
        assert_eq!(DecimalSeparator::Comma, args.decimal_separator());
        assert!(args.gsheets());
        assert!(!args.nothing_to_do());
        assert_eq!(LevelFilter::INFO, args.log_level());
    }

    #[test]
    fn test_parse_long_flags() {
        let args = Args::try_parse_from([
            "expense-export",
            "--input",
            "backup.expensemanager",
            "--gsheets",
            "--sheet-id",
            "doc",
            "--sheet-title",
            "Expenses",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(None, args.output());
        assert_eq!(DecimalSeparator::Dot, args.decimal_separator());
        assert_eq!(LevelFilter::DEBUG, args.log_level());
        let credentials = args.credentials();
        assert!(!credentials.missing().contains(&SHEET_ID_VAR));
        assert!(!credentials.missing().contains(&SHEET_TITLE_VAR));
    }

    #[test]
    fn test_input_is_optional() {
        let args = Args::try_parse_from(["expense-export"]).unwrap();
        assert!(args.input().is_none());
        assert!(args.nothing_to_do());
    }

    #[test]
    fn test_args_new() {
        let args = Args::new(
            Some("backup.expensemanager".into()),
            None,
            false,
            true,
            GoogleArgs::new(None, None, Some("doc".into()), None),
        );
        assert!(args.gsheets());
        assert_eq!(
            vec![SERVICE_ACCOUNT_EMAIL_VAR, PRIVATE_KEY_VAR, SHEET_TITLE_VAR],
            args.credentials().missing()
        );
    }
}
