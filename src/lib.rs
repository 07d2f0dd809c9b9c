//! Credential validation across independent universities.
//!
//! Each [`University`] keeps its students in a hash index, so checking one
//! university is a constant-time lookup. A [`ValidationSystem`] queues
//! requests from companies and resolves them in submission order against
//! every registered university.

pub mod api;
pub mod config;
pub mod loader;
pub mod logger;
pub mod report;

pub use api::err::{CredentialError, Result};
pub use api::policy::{AcceptAll, CredentialPolicy, MinimumScore};
pub use api::request::{Outcome, RequestId, ValidationRequest, ValidationResult};
pub use api::stats::{Analytics, BatchReport, Statistics};
pub use api::student::Student;
pub use api::university::{LoadReport, University, UniversityStats};
pub use api::{LoadRecord, ValidationSystem};
