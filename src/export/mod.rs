//! Exporting payables and receivables of chosen budget splits as a CSV spreadsheet.

mod handlers;
mod report;

pub use handlers::{ExportForm, ExportState, download_export, get_export_page};
pub use report::{REPORT_COLUMNS, ReportEntry, get_report_entries, write_report_csv};
