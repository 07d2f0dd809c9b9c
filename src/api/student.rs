use std::ops::RangeInclusive;

use time::{Date, OffsetDateTime};

use super::err::{CredentialError, Result};

/// Accepted grade point range, inclusive.
pub const SCORE_RANGE: RangeInclusive<f64> = 0.0..=4.0;

/// Accepted graduation years, inclusive.
pub const YEAR_RANGE: RangeInclusive<u16> = 1900..=2100;

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    // 学号
    id: String,
    // 姓名
    name: String,
    // 专业
    program: String,
    // 绩点
    score: f64,
    // 毕业年份
    graduation_year: u16,
    // 入学登记日期
    enrollment_date: Date,
}

impl Student {
    /// Builds a record, rejecting blank text fields, a non-finite or
    /// out-of-range score and an implausible graduation year.
    ///
    /// The enrollment date defaults to today (UTC); use
    /// [`Student::with_enrollment_date`] to override it.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        program: impl Into<String>,
        score: f64,
        graduation_year: u16,
    ) -> Result<Self> {
        let id = required("student id", id.into())?;
        let name = required("name", name.into())?;
        let program = required("program", program.into())?;

        if !score.is_finite() || !SCORE_RANGE.contains(&score) {
            return Err(CredentialError::InvalidArgument(format!(
                "score {} of `{}` is outside {}..={}",
                score,
                id,
                SCORE_RANGE.start(),
                SCORE_RANGE.end()
            )));
        }
        if !YEAR_RANGE.contains(&graduation_year) {
            return Err(CredentialError::InvalidArgument(format!(
                "graduation year {} of `{}` is outside {}..={}",
                graduation_year,
                id,
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            )));
        }

        Ok(Self {
            id,
            name,
            program,
            score,
            graduation_year,
            enrollment_date: OffsetDateTime::now_utc().date(),
        })
    }

    pub fn with_enrollment_date(mut self, date: Date) -> Self {
        self.enrollment_date = date;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn graduation_year(&self) -> u16 {
        self.graduation_year
    }

    pub fn enrollment_date(&self) -> Date {
        self.enrollment_date
    }
}

/// Trims `value` and fails if nothing is left.
pub(crate) fn required(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CredentialError::InvalidArgument(format!(
            "{} must not be empty",
            field
        )));
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}
