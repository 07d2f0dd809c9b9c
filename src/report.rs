//! Renders the system's read-only views into CSV and JSON files.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::api::err::Result;
use crate::api::request::ValidationResult;
use crate::api::stats::Analytics;
use crate::api::student::Student;
use crate::api::university::University;
use crate::api::ValidationSystem;
use crate::loader::csv_processor::roster_file_name;

/// 学生信息行
#[derive(Serialize)]
struct StudentRow<'a> {
    student_id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    university: Option<&'a str>,
    program: &'a str,
    score: f64,
    graduation_year: u16,
    enrollment_date: String,
}

impl<'a> StudentRow<'a> {
    fn new(student: &'a Student, university: Option<&'a str>) -> Self {
        Self {
            student_id: student.id(),
            name: student.name(),
            university,
            program: student.program(),
            score: student.score(),
            graduation_year: student.graduation_year(),
            enrollment_date: student.enrollment_date().to_string(),
        }
    }
}

/// 验证历史行
#[derive(Serialize)]
struct HistoryRow<'a> {
    request_id: String,
    processed_at: String,
    student_id: &'a str,
    organization: &'a str,
    outcome: &'static str,
    university: &'a str,
    reason: &'a str,
    processing_time_secs: f64,
}

/// 各大学统计行
#[derive(Serialize)]
struct StatisticsRow<'a> {
    university: &'a str,
    total_students: usize,
    average_score: f64,
    median_score: f64,
    highest_score: f64,
    lowest_score: f64,
    std_dev_score: f64,
    programs_offered: usize,
    recent_graduates: usize,
}

#[derive(Serialize)]
struct TopStudentJson<'a> {
    student_id: &'a str,
    name: &'a str,
    program: &'a str,
    score: f64,
}

#[derive(Serialize)]
struct LatencyJson {
    mean_secs: f64,
    median_secs: f64,
    fastest_secs: f64,
    slowest_secs: f64,
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    universities: usize,
    total_students: usize,
    pending_requests: usize,
    total_processed: usize,
    valid: usize,
    invalid: usize,
    not_found: usize,
    success_rate: f64,
    throughput_per_sec: f64,
    average_latency_secs: f64,
    latency: Option<LatencyJson>,
    by_university: Vec<(String, usize)>,
    by_organization: Vec<(String, usize)>,
    top_students: Vec<(&'a str, Vec<TopStudentJson<'a>>)>,
}

/// How many students each university lists in the summary.
pub const TOP_STUDENTS: usize = 3;

/// Subdirectory of the report directory that holds saved rosters.
pub const ROSTER_DIR: &str = "rosters";

fn sorted_students(university: &University) -> Vec<&Student> {
    let mut students: Vec<&Student> = university.students().collect();
    students.sort_by(|a, b| a.id().cmp(b.id()));
    students
}

/// Writes a university's roster in the format the loader reads back.
pub fn save_university(university: &University, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(roster_file_name(university.name()));
    let mut wtr = csv::Writer::from_path(&path)?;
    for student in sorted_students(university) {
        wtr.serialize(StudentRow::new(student, None))?;
    }
    wtr.flush()?;
    info!("saved {} to {}", university.name(), path.display());
    Ok(path)
}

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every report file, in a fixed order.
    pub fn write_all(&self, system: &ValidationSystem, recent_since: u16) -> Result<Vec<PathBuf>> {
        let paths = vec![
            self.write_students(system)?,
            self.write_history(system.results())?,
            self.write_statistics(system, recent_since)?,
            self.write_summary(system)?,
        ];
        info!("reports written to {}", self.dir.display());
        Ok(paths)
    }

    /// Saves every roster under `<dir>/rosters`, never over the files they
    /// were loaded from.
    pub fn write_rosters(&self, system: &ValidationSystem) -> Result<Vec<PathBuf>> {
        let roster_dir = self.dir.join(ROSTER_DIR);
        system
            .universities()
            .map(|university| save_university(university, &roster_dir))
            .collect()
    }

    pub fn write_students(&self, system: &ValidationSystem) -> Result<PathBuf> {
        let path = self.dir.join("all_students.csv");
        let mut wtr = csv::Writer::from_path(&path)?;
        for university in system.universities() {
            for student in sorted_students(university) {
                wtr.serialize(StudentRow::new(student, Some(university.name())))?;
            }
        }
        wtr.flush()?;
        Ok(path)
    }

    pub fn write_history(&self, results: &[ValidationResult]) -> Result<PathBuf> {
        let path = self.dir.join("validation_history.csv");
        let mut wtr = csv::Writer::from_path(&path)?;
        for result in results {
            wtr.serialize(HistoryRow {
                request_id: result.request_id.to_string(),
                processed_at: result.processed_at.to_string(),
                student_id: &result.student_id,
                organization: &result.organization,
                outcome: result.outcome.as_str(),
                university: result.university.as_deref().unwrap_or("N/A"),
                reason: result.reason.as_deref().unwrap_or(""),
                processing_time_secs: result.processing_time.as_secs_f64(),
            })?;
        }
        wtr.flush()?;
        Ok(path)
    }

    pub fn write_statistics(&self, system: &ValidationSystem, recent_since: u16) -> Result<PathBuf> {
        let path = self.dir.join("statistics.csv");
        let mut wtr = csv::Writer::from_path(&path)?;
        for university in system.universities() {
            let stats = university.statistics(recent_since);
            wtr.serialize(StatisticsRow {
                university: university.name(),
                total_students: stats.total_students,
                average_score: stats.average_score,
                median_score: stats.median_score,
                highest_score: stats.highest_score,
                lowest_score: stats.lowest_score,
                std_dev_score: stats.std_dev_score,
                programs_offered: stats.programs_offered,
                recent_graduates: stats.recent_graduates,
            })?;
        }
        wtr.flush()?;
        Ok(path)
    }

    pub fn write_summary(&self, system: &ValidationSystem) -> Result<PathBuf> {
        let path = self.dir.join("summary.json");
        let stats = system.statistics();
        let Analytics {
            latency,
            by_university,
            by_organization,
            ..
        } = system.analytics();

        let summary = SummaryJson {
            universities: system.universities().count(),
            total_students: system.total_students(),
            pending_requests: system.pending().len(),
            total_processed: stats.total_processed,
            valid: stats.valid,
            invalid: stats.invalid,
            not_found: stats.not_found,
            success_rate: stats.success_rate(),
            throughput_per_sec: stats.throughput(),
            average_latency_secs: stats.average_latency().as_secs_f64(),
            latency: latency.map(|l| LatencyJson {
                mean_secs: l.mean.as_secs_f64(),
                median_secs: l.median.as_secs_f64(),
                fastest_secs: l.fastest.as_secs_f64(),
                slowest_secs: l.slowest.as_secs_f64(),
            }),
            by_university,
            by_organization,
            top_students: system
                .universities()
                .map(|university| {
                    let top = university
                        .top_students(TOP_STUDENTS)
                        .into_iter()
                        .map(|student| TopStudentJson {
                            student_id: student.id(),
                            name: student.name(),
                            program: student.program(),
                            score: student.score(),
                        })
                        .collect();
                    (university.name(), top)
                })
                .collect(),
        };
        serde_json::to_writer_pretty(File::create(&path)?, &summary)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::apply_tables;
    use crate::loader::csv_processor::{CsvTableBuilder, RowRecord};
    use crate::loader::data_parser::load_directory;
    use tempfile::tempdir;
    use time::macros::date;

    fn system() -> ValidationSystem {
        let mut system = ValidationSystem::new();
        let mut mit = University::new("MIT").unwrap();
        mit.add_student(
            Student::new("MIT001", "Alice Johnson", "Computer Science", 3.85, 2023)
                .unwrap()
                .with_enrollment_date(date!(2019 - 09 - 01)),
        )
        .unwrap();
        mit.add_student(Student::new("MIT002", "Bob Smith", "EE", 3.62, 2024).unwrap())
            .unwrap();
        system.register_university(mit).unwrap();
        system.register_university(University::new("Empty College").unwrap()).unwrap();
        system.request_validation("MIT001", "Google Inc.").unwrap();
        system.request_validation("MIT999", "Meta").unwrap();
        system.process_all();
        system
    }

    #[test]
    fn test_write_all_reports() {
        let temp_dir = tempdir().unwrap();
        let writer = ReportWriter::new(temp_dir.path().join("reports")).unwrap();
        let system = system();

        let paths = writer.write_all(&system, 2024).unwrap();
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.exists()));

        let students = std::fs::read_to_string(writer.dir().join("all_students.csv")).unwrap();
        let mut lines = students.lines();
        assert_eq!(
            lines.next().unwrap(),
            "student_id,name,university,program,score,graduation_year,enrollment_date"
        );
        assert_eq!(
            lines.next().unwrap(),
            "MIT001,Alice Johnson,MIT,Computer Science,3.85,2023,2019-09-01"
        );

        let history = std::fs::read_to_string(writer.dir().join("validation_history.csv")).unwrap();
        let rows: Vec<&str> = history.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("REQ-000001,"));
        assert!(rows[1].contains(",VALID,MIT,"));
        assert!(rows[2].contains(",NOT_FOUND,N/A,"));

        let stats = std::fs::read_to_string(writer.dir().join("statistics.csv")).unwrap();
        assert_eq!(stats.lines().count(), 3);

        let summary: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(writer.dir().join("summary.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(summary["total_processed"], 2);
        assert_eq!(summary["valid"], 1);
        assert_eq!(summary["success_rate"], 0.5);
        assert_eq!(summary["universities"], 2);
        assert_eq!(summary["top_students"][0][0], "MIT");
        assert_eq!(summary["top_students"][0][1][0]["student_id"], "MIT001");
        assert_eq!(summary["top_students"][0][1][1]["student_id"], "MIT002");
        assert_eq!(summary["top_students"][1][1].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_rosters_leave_input_files_untouched() {
        let data_dir = tempdir().unwrap();
        let input = data_dir.path().join("MIT_students.csv");
        let original = "student_id,name,program,score,graduation_year\n\
                        MIT001,Alice,CS,3.85,2023\n\
                        MIT002,Bob,EE,4.5,2024\n";
        std::fs::write(&input, original).unwrap();

        let mut system = ValidationSystem::new();
        let tables = load_directory(data_dir.path().to_path_buf(), 4).await.unwrap();
        let loaded = apply_tables(&mut system, tables);
        assert_eq!(loaded.rejected.len(), 1);

        let report_dir = tempdir().unwrap();
        let writer = ReportWriter::new(report_dir.path()).unwrap();
        writer.write_all(&system, 2024).unwrap();
        let paths = writer.write_rosters(&system).unwrap();

        assert_eq!(std::fs::read_to_string(&input).unwrap(), original);
        assert_eq!(paths, vec![report_dir.path().join(ROSTER_DIR).join("MIT_students.csv")]);
        let saved = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(saved.lines().count(), 2);
        assert!(saved.contains("MIT001,Alice,CS,3.85,2023,"));
    }

    #[test]
    fn test_saved_roster_loads_back() {
        let temp_dir = tempdir().unwrap();
        let system = system();
        let mit = system.university("MIT").unwrap();

        let path = save_university(mit, temp_dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "MIT_students.csv");

        let table = CsvTableBuilder::new(&path).build().unwrap();
        assert_eq!(table.university, "MIT");
        let students: Vec<Student> = table
            .rows
            .into_iter()
            .map(|row| row.and_then(RowRecord::into_student).unwrap())
            .collect();
        assert_eq!(students.len(), 2);
        assert_eq!(&students[0], mit.lookup("MIT001").unwrap());
    }
}
