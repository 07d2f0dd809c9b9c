use std::collections::{BTreeMap, HashMap};

use log::warn;

use super::err::{CredentialError, Result};
use super::index::StudentIndex;
use super::student::{required, Student};

/// One university and the students it issued credentials to.
#[derive(Debug)]
pub struct University {
    name: String,
    index: StudentIndex,
}

/// Outcome of a bulk insert: how many records went in and which ones did not.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub added: usize,
    /// (position in the input, reason). Merged reports keep counting
    /// positions across their inputs, so every position is unique.
    pub rejected: Vec<(usize, CredentialError)>,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.added + self.rejected.len()
    }

    pub(crate) fn reject(&mut self, position: usize, err: CredentialError) {
        warn!("rejected record #{}: {}", position, err);
        self.rejected.push((position, err));
    }

    /// Appends `other` as if its input followed this one.
    pub(crate) fn merge(&mut self, other: LoadReport) {
        let offset = self.total();
        self.added += other.added;
        self.rejected.extend(
            other
                .rejected
                .into_iter()
                .map(|(position, err)| (position + offset, err)),
        );
    }
}

/// Aggregate figures over one university's scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniversityStats {
    pub total_students: usize,
    pub average_score: f64,
    pub median_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
    /// Sample standard deviation, 0 below two students.
    pub std_dev_score: f64,
    pub programs_offered: usize,
    pub recent_graduates: usize,
}

impl University {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: required("university name", name.into())?,
            index: StudentIndex::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_student(&mut self, student: Student) -> Result<()> {
        self.index.put(&self.name, student)
    }

    /// Adds every record it can; a bad record never stops the rest.
    pub fn add_students_bulk<I>(&mut self, students: I) -> LoadReport
    where
        I: IntoIterator<Item = Result<Student>>,
    {
        let mut report = LoadReport::default();
        for (position, student) in students.into_iter().enumerate() {
            match student.and_then(|s| self.add_student(s)) {
                Ok(()) => report.added += 1,
                Err(e) => report.reject(position, e),
            }
        }
        report
    }

    pub fn lookup(&self, student_id: &str) -> Result<&Student> {
        self.index.get(student_id)
    }

    /// Administrative correction of an existing record.
    pub fn update_student(&mut self, student: Student) -> Result<Student> {
        self.index.replace(student)
    }

    pub fn remove_student(&mut self, student_id: &str) -> Result<Student> {
        self.index.remove(student_id)
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.index.contains(student_id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.index.iter()
    }

    /// Exact match, or case-insensitive substring match when `exact` is false.
    pub fn search_by_name(&self, pattern: &str, exact: bool) -> Vec<&Student> {
        if exact {
            return self.sorted(|s| s.name() == pattern);
        }
        let needle = pattern.to_lowercase();
        self.sorted(|s| s.name().to_lowercase().contains(&needle))
    }

    pub fn search_by_program(&self, pattern: &str) -> Vec<&Student> {
        let needle = pattern.to_lowercase();
        self.sorted(|s| s.program().to_lowercase().contains(&needle))
    }

    pub fn students_in_score_range(&self, min: f64, max: f64) -> Vec<&Student> {
        self.sorted(|s| s.score() >= min && s.score() <= max)
    }

    pub fn recent_graduates(&self, since_year: u16) -> Vec<&Student> {
        self.sorted(|s| s.graduation_year() >= since_year)
    }

    /// Highest scores first; equal scores are ordered by id.
    pub fn top_students(&self, n: usize) -> Vec<&Student> {
        let mut students: Vec<&Student> = self.students().collect();
        students.sort_by(|a, b| {
            b.score()
                .total_cmp(&a.score())
                .then_with(|| a.id().cmp(b.id()))
        });
        students.truncate(n);
        students
    }

    /// (program, count), most common first, ties by program name.
    pub fn program_distribution(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for student in self.students() {
            *counts.entry(student.program()).or_default() += 1;
        }
        let mut distribution: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(program, count)| (program.to_string(), count))
            .collect();
        distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        distribution
    }

    pub fn graduation_year_distribution(&self) -> BTreeMap<u16, usize> {
        let mut distribution = BTreeMap::new();
        for student in self.students() {
            *distribution.entry(student.graduation_year()).or_default() += 1;
        }
        distribution
    }

    pub fn statistics(&self, recent_since: u16) -> UniversityStats {
        let mut scores: Vec<f64> = self.students().map(Student::score).collect();
        if scores.is_empty() {
            return UniversityStats::default();
        }
        scores.sort_by(f64::total_cmp);

        let n = scores.len();
        let mean = scores.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (scores[n / 2 - 1] + scores[n / 2]) / 2.0
        } else {
            scores[n / 2]
        };
        let std_dev = if n < 2 {
            0.0
        } else {
            let variance =
                scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            variance.sqrt()
        };

        UniversityStats {
            total_students: n,
            average_score: mean,
            median_score: median,
            highest_score: scores[n - 1],
            lowest_score: scores[0],
            std_dev_score: std_dev,
            programs_offered: self.program_distribution().len(),
            recent_graduates: self
                .students()
                .filter(|s| s.graduation_year() >= recent_since)
                .count(),
        }
    }

    // query results are sorted by id so callers get a stable order
    fn sorted<F>(&self, keep: F) -> Vec<&Student>
    where
        F: Fn(&Student) -> bool,
    {
        let mut students: Vec<&Student> = self.students().filter(|&s| keep(s)).collect();
        students.sort_by(|a, b| a.id().cmp(b.id()));
        students
    }
}
