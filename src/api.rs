use std::collections::HashMap;

use log::info;
use time::Date;

pub mod engine;
pub mod err;
pub mod index;
pub mod policy;
pub mod queue;
pub mod request;
pub mod stats;
pub mod student;
pub mod university;

use engine::ValidationEngine;
use err::{CredentialError, Result};
use policy::CredentialPolicy;
use queue::RequestQueue;
use request::{RequestId, ValidationRequest, ValidationResult};
use stats::{Analytics, BatchReport, Statistics};
use student::Student;
use university::{LoadReport, University};

/// One row handed over by an external loader.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRecord {
    pub university: String,
    pub student_id: String,
    pub name: String,
    pub program: String,
    pub score: f64,
    pub graduation_year: u16,
    pub enrollment_date: Option<Date>,
}

impl LoadRecord {
    pub fn into_student(self) -> Result<Student> {
        let student = Student::new(
            self.student_id,
            self.name,
            self.program,
            self.score,
            self.graduation_year,
        )?;
        Ok(match self.enrollment_date {
            Some(date) => student.with_enrollment_date(date),
            None => student,
        })
    }
}

/// Registry of universities plus the request pipeline in front of them.
///
/// A request only carries a student id, so it is resolved by asking every
/// registered university in registration order and taking the first hit.
/// That fan-out is O(number of universities); the lookup inside each
/// university is O(1).
#[derive(Debug, Default)]
pub struct ValidationSystem {
    universities: Vec<University>,
    positions: HashMap<String, usize>,
    queue: RequestQueue,
    engine: ValidationEngine,
    results: Vec<ValidationResult>,
    next_request: u64,
}

impl ValidationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// A system whose engine applies `policy` to every found record.
    pub fn with_policy(policy: Box<dyn CredentialPolicy>) -> Self {
        Self {
            engine: ValidationEngine::new(policy),
            ..Self::default()
        }
    }

    pub fn register_university(&mut self, university: University) -> Result<()> {
        if self.positions.contains_key(university.name()) {
            return Err(CredentialError::DuplicateUniversity(
                university.name().to_string(),
            ));
        }
        info!(
            "registered {} ({} students)",
            university.name(),
            university.len()
        );
        self.positions
            .insert(university.name().to_string(), self.universities.len());
        self.universities.push(university);
        Ok(())
    }

    pub fn remove_university(&mut self, name: &str) -> Option<University> {
        let position = self.positions.remove(name)?;
        let university = self.universities.remove(position);
        for slot in self.positions.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(university)
    }

    pub fn university(&self, name: &str) -> Option<&University> {
        self.positions.get(name).map(|&i| &self.universities[i])
    }

    pub fn university_mut(&mut self, name: &str) -> Option<&mut University> {
        let i = *self.positions.get(name)?;
        self.universities.get_mut(i)
    }

    /// Registered universities in registration order.
    pub fn universities(&self) -> impl Iterator<Item = &University> {
        self.universities.iter()
    }

    pub fn add_student(&mut self, university: &str, student: Student) -> Result<()> {
        self.university_mut(university)
            .ok_or_else(|| CredentialError::UnknownUniversity(university.to_string()))?
            .add_student(student)
    }

    /// Applies every record it can. Unknown universities, invalid fields and
    /// duplicate ids are reported per record.
    pub fn load_records<I>(&mut self, records: I) -> LoadReport
    where
        I: IntoIterator<Item = LoadRecord>,
    {
        let mut report = LoadReport::default();
        for (position, record) in records.into_iter().enumerate() {
            let university = record.university.clone();
            match record
                .into_student()
                .and_then(|student| self.add_student(&university, student))
            {
                Ok(()) => report.added += 1,
                Err(e) => report.reject(position, e),
            }
        }
        info!("loaded {} of {} records", report.added, report.total());
        report
    }

    pub fn total_students(&self) -> usize {
        self.universities.iter().map(University::len).sum()
    }

    /// Where a request for `student_id` would resolve right now.
    pub fn resolve(&self, student_id: &str) -> Option<(&University, &Student)> {
        engine::route(&self.universities, student_id)
    }

    /// Case-insensitive name search over every university, in registration order.
    pub fn search_student_by_name(&self, pattern: &str) -> Vec<(&str, &Student)> {
        self.universities
            .iter()
            .flat_map(|university| {
                university
                    .search_by_name(pattern, false)
                    .into_iter()
                    .map(move |student| (university.name(), student))
            })
            .collect()
    }

    pub fn request_validation(
        &mut self,
        student_id: impl Into<String>,
        organization: impl Into<String>,
    ) -> Result<RequestId> {
        let id = RequestId(self.next_request + 1);
        let request = ValidationRequest::new(id, student_id, organization)?;
        self.next_request += 1;
        self.queue.enqueue(request);
        Ok(id)
    }

    /// Queues one request per id, or none of them if any id is blank.
    pub fn request_validations_bulk<I, S>(
        &mut self,
        student_ids: I,
        organization: &str,
    ) -> Result<Vec<RequestId>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut requests = Vec::new();
        for (offset, student_id) in student_ids.into_iter().enumerate() {
            let id = RequestId(self.next_request + offset as u64 + 1);
            requests.push(ValidationRequest::new(id, student_id, organization)?);
        }

        self.next_request += requests.len() as u64;
        let ids: Vec<RequestId> = requests.iter().map(ValidationRequest::id).collect();
        for request in requests {
            self.queue.enqueue(request);
        }
        info!("queued {} requests from {}", ids.len(), organization);
        Ok(ids)
    }

    /// Withdraws a request that is still waiting in the queue.
    pub fn cancel_request(&mut self, id: RequestId) -> Option<ValidationRequest> {
        self.queue.remove(id)
    }

    pub fn pending(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn process_all(&mut self) -> BatchReport {
        self.engine
            .process_all(&mut self.queue, &self.universities, &mut self.results)
    }

    pub fn process_next(&mut self) -> Option<&ValidationResult> {
        let result = self.engine.process_next(&mut self.queue, &self.universities)?;
        self.results.push(result);
        self.results.last()
    }

    /// Every result so far, in processing order.
    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn statistics(&self) -> &Statistics {
        self.engine.statistics()
    }

    pub fn analytics(&self) -> Analytics {
        Analytics::from_results(&self.results)
    }
}
