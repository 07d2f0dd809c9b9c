use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use time::{macros::format_description, Date};

use crate::api::err::{CredentialError, Result};
use crate::api::student::Student;

/// File name of a university's roster: `<Name>_students.csv`.
pub const FILE_PATTERN: &str = r"^(.+)_students\.csv$";

// 行记录
#[derive(Debug, Deserialize)]
pub struct RowRecord {
    // 学号
    pub student_id: String,
    // 姓名
    pub name: String,
    // 专业
    #[serde(alias = "degree")]
    pub program: String,
    // 绩点
    #[serde(alias = "cgpa")]
    pub score: f64,
    // 毕业年份
    pub graduation_year: u16,
    // 入学日期, YYYY-MM-DD
    #[serde(default)]
    pub enrollment_date: Option<String>,
}

impl RowRecord {
    pub fn into_student(self) -> Result<Student> {
        let enrollment_date = self
            .enrollment_date
            .as_deref()
            .map(parse_date)
            .transpose()?;
        let student = Student::new(
            self.student_id,
            self.name,
            self.program,
            self.score,
            self.graduation_year,
        )?;
        Ok(match enrollment_date {
            Some(date) => student.with_enrollment_date(date),
            None => student,
        })
    }
}

// csv表
pub struct CsvTable {
    pub university: String,
    /// One entry per data row; a malformed row does not poison the rest.
    pub rows: Vec<Result<RowRecord>>,
}

// csv表构建器
pub struct CsvTableBuilder<'builder> {
    csv_path: &'builder Path,
}

impl<'builder> CsvTableBuilder<'builder> {
    pub fn new(csv_path: &'builder Path) -> Self {
        Self { csv_path }
    }

    pub fn build(&self) -> Result<CsvTable> {
        let university = university_name(self.csv_path)?;
        let rows = self.build_csv_records()?;
        Ok(CsvTable { university, rows })
    }

    fn build_csv_records(&self) -> Result<Vec<Result<RowRecord>>> {
        let file = std::fs::File::open(self.csv_path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);
        check_headers(rdr.headers()?)?;

        let rows = rdr
            .deserialize::<RowRecord>()
            .enumerate()
            .map(|(i, rd)| {
                rd.map_err(|e| {
                    CredentialError::CsvDataError(format!(
                        "{} row {}: {}",
                        self.csv_path.display(),
                        i + 1,
                        e
                    ))
                })
            })
            .collect();
        Ok(rows)
    }
}

/// Recovers the university name from a roster file name; underscores
/// stand for spaces.
pub fn university_name(csv_path: &Path) -> Result<String> {
    let re = Regex::new(FILE_PATTERN)?;
    let file_name = csv_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CredentialError::UnexpectedFileError(csv_path.display().to_string()))?;
    let captures = re.captures(file_name).ok_or_else(|| {
        CredentialError::UnexpectedFileError(format!("{} is not a roster file", file_name))
    })?;
    Ok(captures[1].replace('_', " "))
}

/// File name a university's roster is stored under.
pub fn roster_file_name(university: &str) -> String {
    format!("{}_students.csv", university.replace(' ', "_"))
}

/// 判断csv是否包含所需的列
fn check_headers(headers: &csv::StringRecord) -> Result<()> {
    let has = |names: &[&str]| headers.iter().any(|h| names.iter().any(|n| *n == h));
    let required: [&[&str]; 5] = [
        &["student_id"],
        &["name"],
        &["program", "degree"],
        &["score", "cgpa"],
        &["graduation_year"],
    ];
    for names in required {
        if !has(names) {
            return Err(CredentialError::UnexpectedFileError(format!(
                "missing column `{}`",
                names[0]
            )));
        }
    }
    Ok(())
}

fn parse_date(value: &str) -> Result<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|e| CredentialError::CsvDataError(format!("bad date `{}`: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs::File, io::Write};
    use tempfile::tempdir;
    use time::macros::date;

    #[test]
    fn test_university_name_from_file_name() {
        let name = university_name(Path::new("data/Stanford_University_students.csv")).unwrap();
        assert_eq!(name, "Stanford University");
        assert_eq!(roster_file_name("Stanford University"), "Stanford_University_students.csv");
    }

    #[test]
    fn test_university_name_invalid() {
        let result = university_name(Path::new("data/notes.csv"));
        assert!(matches!(result, Err(CredentialError::UnexpectedFileError(_))));
    }

    #[test]
    fn test_build_table_with_legacy_columns() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("MIT_students.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            "student_id,name,university,degree,cgpa,graduation_year,enrollment_date"
        )
        .unwrap();
        writeln!(file, "MIT001,Alice Johnson,MIT,Computer Science,3.85,2023,2019-09-01").unwrap();
        writeln!(file, "MIT002,Bob Smith,MIT,Electrical Engineering,3.62,2024,").unwrap();

        let table = CsvTableBuilder::new(&file_path).build().unwrap();
        assert_eq!(table.university, "MIT");
        assert_eq!(table.rows.len(), 2);

        let students: Vec<Student> = table
            .rows
            .into_iter()
            .map(|row| row.and_then(RowRecord::into_student).unwrap())
            .collect();
        assert_eq!(students[0].program(), "Computer Science");
        assert_eq!(students[0].score(), 3.85);
        assert_eq!(students[0].enrollment_date(), date!(2019 - 09 - 01));
        assert_eq!(students[1].name(), "Bob Smith");
    }

    #[test]
    fn test_bad_rows_are_kept_as_errors() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("UC_Berkeley_students.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "student_id,name,program,score,graduation_year").unwrap();
        writeln!(file, "BERK001,Diana Prince,Cybersecurity,3.96,2024").unwrap();
        writeln!(file, "BERK002,Grace Hopper,Software Engineering,not-a-number,2023").unwrap();
        writeln!(file, "BERK003,Isaac Newton,Computer Science,3.89,2024").unwrap();

        let table = CsvTableBuilder::new(&file_path).build().unwrap();
        assert_eq!(table.university, "UC Berkeley");
        assert!(table.rows[0].is_ok());
        assert!(matches!(table.rows[1], Err(CredentialError::CsvDataError(_))));
        assert!(table.rows[2].is_ok());
    }

    #[test]
    fn test_padded_headers_and_fields() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("Harvard_University_students.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "student_id, name, program, score, graduation_year").unwrap();
        writeln!(file, "HARV001, Jane Doe, Computer Science, 3.81, 2023").unwrap();

        let table = CsvTableBuilder::new(&file_path).build().unwrap();
        assert_eq!(table.rows.len(), 1);
        let student = table
            .rows
            .into_iter()
            .next()
            .unwrap()
            .and_then(RowRecord::into_student)
            .unwrap();
        assert_eq!(student.id(), "HARV001");
        assert_eq!(student.name(), "Jane Doe");
        assert_eq!(student.score(), 3.81);
        assert_eq!(student.graduation_year(), 2023);
    }

    #[test]
    fn test_missing_column_rejects_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("MIT_students.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "student_id,name,graduation_year").unwrap();
        writeln!(file, "MIT001,Alice,2023").unwrap();

        let result = CsvTableBuilder::new(&file_path).build();
        assert!(matches!(result, Err(CredentialError::UnexpectedFileError(_))));
    }

    #[test]
    fn test_bad_date_fails_row() {
        let row = RowRecord {
            student_id: "X1".to_string(),
            name: "X".to_string(),
            program: "CS".to_string(),
            score: 3.0,
            graduation_year: 2024,
            enrollment_date: Some("01/09/2019".to_string()),
        };
        assert!(matches!(row.into_student(), Err(CredentialError::CsvDataError(_))));
    }
}
