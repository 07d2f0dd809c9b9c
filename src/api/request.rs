use std::fmt;
use std::time::Duration;

use time::OffsetDateTime;

use super::err::Result;
use super::student::{required, Student};

/// Identifier handed out by the system, increasing in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REQ-{:06}", self.0)
    }
}

/// A company asking whether a student id is backed by a real record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    id: RequestId,
    student_id: String,
    organization: String,
    submitted_at: OffsetDateTime,
}

impl ValidationRequest {
    pub(crate) fn new(
        id: RequestId,
        student_id: impl Into<String>,
        organization: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            id,
            student_id: required("student id", student_id.into())?,
            organization: required("organization", organization.into())?,
            submitted_at: OffsetDateTime::now_utc(),
        })
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn submitted_at(&self) -> OffsetDateTime {
        self.submitted_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// A registered university holds the record and the policy accepted it.
    Valid,
    /// The record exists but the policy rejected it.
    Invalid,
    NotFound,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Valid => "VALID",
            Outcome::Invalid => "INVALID",
            Outcome::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal record of one processed request.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub request_id: RequestId,
    pub student_id: String,
    pub organization: String,
    pub outcome: Outcome,
    /// Set for `Valid` and `Invalid`.
    pub university: Option<String>,
    /// Snapshot of the record, only for `Valid`.
    pub student: Option<Student>,
    /// Why the policy said no, only for `Invalid`.
    pub reason: Option<String>,
    pub processed_at: OffsetDateTime,
    pub processing_time: Duration,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.outcome == Outcome::Valid
    }
}
