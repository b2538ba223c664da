//! Non-fatal problems collected while walking a resolution report.

use std::fmt;

/// Problems of one resolve call, in the order they were found.
#[derive(Debug, Default, Clone)]
pub struct ProblemReport {
    pub problems: Vec<ResolveProblem>,
}

/// A single dependency that could not be added to the project model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveProblem {
    /// What the problem is about: a module revision id or an artifact name.
    pub subject: String,
    pub message: String,
    pub cause: Option<String>,
}

impl ResolveProblem {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: Option<String>) -> Self {
        self.cause = cause;
        self
    }
}

impl ProblemReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem; an identical problem already recorded is not repeated.
    pub fn add(&mut self, problem: ResolveProblem) {
        if !self.problems.contains(&problem) {
            self.problems.push(problem);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn as_slice(&self) -> &[ResolveProblem] {
        &self.problems
    }
}

impl fmt::Display for ProblemReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.problems.is_empty() {
            return write!(f, "No resolution problems.");
        }
        writeln!(f, "Resolution problems ({}):", self.problems.len())?;
        for p in &self.problems {
            writeln!(f, "  {p}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ResolveProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}
