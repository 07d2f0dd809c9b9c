use std::collections::{hash_map::Entry, HashMap};

use super::err::{CredentialError, Result};
use super::student::Student;

/// Student records of one university keyed by student id.
///
/// Every operation is a single hash map access, so lookups cost the same
/// whether the index holds a hundred records or a million. Iteration order
/// is unspecified.
#[derive(Debug, Default)]
pub struct StudentIndex {
    students: HashMap<String, Student>,
}

impl StudentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            students: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts a new record. Fails without touching the index when the id
    /// is already present; `owner` only names the university in the error.
    pub fn put(&mut self, owner: &str, student: Student) -> Result<()> {
        match self.students.entry(student.id().to_string()) {
            Entry::Occupied(entry) => Err(CredentialError::DuplicateIdentifier {
                university: owner.to_string(),
                student_id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(student);
                Ok(())
            }
        }
    }

    pub fn get(&self, student_id: &str) -> Result<&Student> {
        self.students
            .get(student_id)
            .ok_or_else(|| CredentialError::NotFound(student_id.to_string()))
    }

    /// Overwrites an existing record, returning the previous one.
    pub fn replace(&mut self, student: Student) -> Result<Student> {
        match self.students.get_mut(student.id()) {
            Some(slot) => Ok(std::mem::replace(slot, student)),
            None => Err(CredentialError::NotFound(student.id().to_string())),
        }
    }

    pub fn remove(&mut self, student_id: &str) -> Result<Student> {
        self.students
            .remove(student_id)
            .ok_or_else(|| CredentialError::NotFound(student_id.to_string()))
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.students.contains_key(student_id)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.students.values()
    }
}
