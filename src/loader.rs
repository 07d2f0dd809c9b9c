//! Bulk loading of university rosters from CSV files.
//!
//! Parsing happens before any request is queued; the parsed tables are then
//! applied to the system one by one from the caller's context.

use log::info;

pub mod csv_processor;
pub mod data_parser;

use crate::api::err::CredentialError;
use crate::api::university::{LoadReport, University};
use crate::api::ValidationSystem;
use csv_processor::{CsvTable, RowRecord};

/// Registers any university not seen before and adds its rows. Rows are
/// added one by one, so a bad row only costs itself.
pub fn apply_tables(system: &mut ValidationSystem, tables: Vec<CsvTable>) -> LoadReport {
    let mut report = LoadReport::default();
    for CsvTable { university, rows } in tables {
        if system.university(&university).is_none() {
            let registered = University::new(university.as_str())
                .and_then(|new_university| system.register_university(new_university));
            if let Err(e) = registered {
                // the whole table is lost, one rejection per row
                let reason = e.to_string();
                for _ in &rows {
                    report.reject(
                        report.total(),
                        CredentialError::InvalidArgument(format!("{}: {}", university, reason)),
                    );
                }
                continue;
            }
        }

        if let Some(target) = system.university_mut(&university) {
            let added = target
                .add_students_bulk(rows.into_iter().map(|row| row.and_then(RowRecord::into_student)));
            info!(
                "{}: added {} of {} rows",
                university,
                added.added,
                added.total()
            );
            report.merge(added);
        }
    }
    report
}
