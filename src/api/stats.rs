use std::collections::HashMap;
use std::time::Duration;

use super::request::{Outcome, ValidationResult};

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn per_second(count: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if count == 0 || secs <= 0.0 {
        0.0
    } else {
        count as f64 / secs
    }
}

fn per_item(elapsed: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(n) => elapsed / n,
        Err(_) => Duration::from_secs_f64(elapsed.as_secs_f64() / count as f64),
    }
}

/// What one `process_all` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchReport {
    pub processed: usize,
    pub valid: usize,
    pub invalid: usize,
    pub not_found: usize,
    /// Wall time of the whole call.
    pub elapsed: Duration,
}

impl BatchReport {
    pub(crate) fn record(&mut self, outcome: Outcome) {
        self.processed += 1;
        match outcome {
            Outcome::Valid => self.valid += 1,
            Outcome::Invalid => self.invalid += 1,
            Outcome::NotFound => self.not_found += 1,
        }
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.valid, self.processed)
    }

    /// Requests per second.
    pub fn throughput(&self) -> f64 {
        per_second(self.processed, self.elapsed)
    }

    pub fn average_latency(&self) -> Duration {
        per_item(self.elapsed, self.processed)
    }
}

/// Running counters over every batch the engine has processed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub total_processed: usize,
    pub valid: usize,
    pub invalid: usize,
    pub not_found: usize,
    /// Sum of per-request processing times.
    pub processing_time: Duration,
    /// Sum of `process_all` wall times.
    pub elapsed: Duration,
    pub batches: usize,
}

impl Statistics {
    pub(crate) fn absorb(&mut self, batch: &BatchReport) {
        self.total_processed += batch.processed;
        self.valid += batch.valid;
        self.invalid += batch.invalid;
        self.not_found += batch.not_found;
        self.elapsed += batch.elapsed;
        self.batches += 1;
    }

    /// Counts that did not come back `Valid`.
    pub fn unsuccessful(&self) -> usize {
        self.invalid + self.not_found
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.valid, self.total_processed)
    }

    pub fn throughput(&self) -> f64 {
        per_second(self.total_processed, self.elapsed)
    }

    pub fn average_latency(&self) -> Duration {
        per_item(self.elapsed, self.total_processed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencySummary {
    pub mean: Duration,
    pub median: Duration,
    pub fastest: Duration,
    pub slowest: Duration,
}

impl LatencySummary {
    fn from_times(mut times: Vec<Duration>) -> Option<Self> {
        if times.is_empty() {
            return None;
        }
        times.sort();
        let n = times.len();
        let total: Duration = times.iter().sum();
        let median = if n % 2 == 0 {
            (times[n / 2 - 1] + times[n / 2]) / 2
        } else {
            times[n / 2]
        };
        Some(Self {
            mean: per_item(total, n),
            median,
            fastest: times[0],
            slowest: times[n - 1],
        })
    }
}

/// Breakdown of a result sequence, computed on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analytics {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub not_found: usize,
    /// `None` when there are no results.
    pub latency: Option<LatencySummary>,
    /// Valid results per university, most first.
    pub by_university: Vec<(String, usize)>,
    /// Requests per organization, most first.
    pub by_organization: Vec<(String, usize)>,
}

impl Analytics {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let mut report = BatchReport::default();
        let mut by_university: HashMap<&str, usize> = HashMap::new();
        let mut by_organization: HashMap<&str, usize> = HashMap::new();

        for result in results {
            report.record(result.outcome);
            *by_organization.entry(&result.organization).or_default() += 1;
            if let (Outcome::Valid, Some(university)) = (result.outcome, &result.university) {
                *by_university.entry(university).or_default() += 1;
            }
        }

        Self {
            total: report.processed,
            valid: report.valid,
            invalid: report.invalid,
            not_found: report.not_found,
            latency: LatencySummary::from_times(
                results.iter().map(|r| r.processing_time).collect(),
            ),
            by_university: ranked(by_university),
            by_organization: ranked(by_organization),
        }
    }

    pub fn success_rate(&self) -> f64 {
        ratio(self.valid, self.total)
    }
}

fn ranked(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
