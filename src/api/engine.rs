use std::time::Instant;

use log::{debug, info};
use time::OffsetDateTime;

use super::policy::{AcceptAll, CredentialPolicy};
use super::queue::RequestQueue;
use super::request::{Outcome, ValidationRequest, ValidationResult};
use super::stats::{BatchReport, Statistics};
use super::student::Student;
use super::university::University;

/// The first registered university holding `student_id`, with its record.
pub(crate) fn route<'a>(
    universities: &'a [University],
    student_id: &str,
) -> Option<(&'a University, &'a Student)> {
    universities.iter().find_map(|university| {
        university
            .lookup(student_id)
            .ok()
            .map(|student| (university, student))
    })
}

/// Turns queued requests into results, strictly in submission order.
#[derive(Debug)]
pub struct ValidationEngine {
    policy: Box<dyn CredentialPolicy>,
    stats: Statistics,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(Box::new(AcceptAll))
    }
}

impl ValidationEngine {
    pub fn new(policy: Box<dyn CredentialPolicy>) -> Self {
        Self {
            policy,
            stats: Statistics::default(),
        }
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Drains `queue` and appends one result per request to `results`.
    pub fn process_all(
        &mut self,
        queue: &mut RequestQueue,
        universities: &[University],
        results: &mut Vec<ValidationResult>,
    ) -> BatchReport {
        let start = Instant::now();
        let mut batch = BatchReport::default();
        results.reserve(queue.len());

        for request in queue.dequeue_all() {
            let result = self.resolve(&request, universities);
            batch.record(result.outcome);
            self.stats.processing_time += result.processing_time;
            results.push(result);
        }

        batch.elapsed = start.elapsed();
        self.stats.absorb(&batch);

        if batch.processed > 0 {
            info!(
                "processed {} requests in {:?}: {} valid, {} invalid, {} not found ({:.1} req/s)",
                batch.processed,
                batch.elapsed,
                batch.valid,
                batch.invalid,
                batch.not_found,
                batch.throughput()
            );
        }
        batch
    }

    /// Processes only the oldest pending request.
    pub fn process_next(
        &mut self,
        queue: &mut RequestQueue,
        universities: &[University],
    ) -> Option<ValidationResult> {
        let start = Instant::now();
        let request = queue.dequeue_one()?;
        let result = self.resolve(&request, universities);

        let mut batch = BatchReport::default();
        batch.record(result.outcome);
        batch.elapsed = start.elapsed();
        self.stats.processing_time += result.processing_time;
        self.stats.absorb(&batch);
        Some(result)
    }

    fn resolve(&self, request: &ValidationRequest, universities: &[University]) -> ValidationResult {
        let start = Instant::now();
        let found = route(universities, request.student_id())
            .map(|(university, student)| (university.name(), student));

        let (outcome, university, student, reason) = match found {
            None => (Outcome::NotFound, None, None, None),
            Some((university, student)) => match self.policy.evaluate(request, student) {
                Ok(()) => (
                    Outcome::Valid,
                    Some(university.to_string()),
                    Some(student.clone()),
                    None,
                ),
                Err(reason) => (
                    Outcome::Invalid,
                    Some(university.to_string()),
                    None,
                    Some(reason),
                ),
            },
        };

        debug!(
            "{} {} for {} -> {}",
            request.id(),
            request.student_id(),
            request.organization(),
            outcome
        );

        ValidationResult {
            request_id: request.id(),
            student_id: request.student_id().to_string(),
            organization: request.organization().to_string(),
            outcome,
            university,
            student,
            reason,
            processed_at: OffsetDateTime::now_utc(),
            processing_time: start.elapsed(),
        }
    }
}
