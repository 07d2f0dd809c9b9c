use std::fmt;

use super::request::ValidationRequest;
use super::student::Student;

/// Extra rule applied to a record once it has been found.
///
/// Returning `Err(reason)` turns the result into `Outcome::Invalid`.
pub trait CredentialPolicy: fmt::Debug + Send + Sync {
    fn evaluate(&self, request: &ValidationRequest, student: &Student) -> Result<(), String>;
}

/// Every record that exists is valid.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl CredentialPolicy for AcceptAll {
    fn evaluate(&self, _request: &ValidationRequest, _student: &Student) -> Result<(), String> {
        Ok(())
    }
}

/// Rejects records whose score is below a threshold.
#[derive(Debug, Clone, Copy)]
pub struct MinimumScore(pub f64);

impl CredentialPolicy for MinimumScore {
    fn evaluate(&self, _request: &ValidationRequest, student: &Student) -> Result<(), String> {
        if student.score() >= self.0 {
            Ok(())
        } else {
            Err(format!(
                "score {:.2} is below the required {:.2}",
                student.score(),
                self.0
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::RequestId;

    #[test]
    fn test_minimum_score() {
        let request = ValidationRequest::new(RequestId(1), "X1", "Acme").unwrap();
        let good = Student::new("X1", "Good", "CS", 3.5, 2024).unwrap();
        let weak = Student::new("X1", "Weak", "CS", 2.5, 2024).unwrap();

        let policy = MinimumScore(3.0);
        assert!(policy.evaluate(&request, &good).is_ok());
        assert_eq!(
            policy.evaluate(&request, &weak).unwrap_err(),
            "score 2.50 is below the required 3.00"
        );
        assert!(AcceptAll.evaluate(&request, &weak).is_ok());
    }
}
