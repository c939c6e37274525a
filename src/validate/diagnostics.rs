//! Validation findings.
//!
//! Findings are plain values, not errors: the validator collects every one
//! of them and the caller decides whether any should stop generation.

use std::fmt;
use std::sync::Arc;

// ============================================================================
// PROBLEMS
// ============================================================================

/// What is wrong with a class.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClassProblem {
    #[error("Class does not belong to a domain")]
    NoDomain,
    #[error("no primary key")]
    NoPrimaryKey,
    #[error("To allow polymorphism the primary key must be defined in only the supertype")]
    PolymorphicKey,
    #[error("circular generalization")]
    CircularGeneralization,
}

/// What is wrong with an attribute.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttributeProblem {
    #[error("auto increment field must be int")]
    AutoIncrementNotInt,
    #[error("unknown type: {0}")]
    UnknownType(Arc<str>),
    #[error("multiple ID attributes detected")]
    MultipleIds,
    #[error("is_deleted is a reserved attribute name")]
    ReservedName,
}

/// What is wrong with a test-case instance.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InstanceProblem {
    #[error("abstract class cannot be instantiated")]
    AbstractClassifier,
    #[error("value {value} of {attribute} is not a literal of {enumeration}")]
    NotALiteral {
        attribute: Arc<str>,
        value: String,
        enumeration: Arc<str>,
    },
    #[error("attribute {0} is not declared by the class")]
    ForeignAttribute(Arc<str>),
    #[error("{count} instances linked through to-one association to {dest}")]
    MultipleToOneLinks { dest: Arc<str>, count: usize },
    #[error("reference cycle: {}", .0.join(" -> "))]
    ReferenceCycle(Vec<String>),
}

// ============================================================================
// FINDINGS
// ============================================================================

/// The kind of element a finding is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FindingKind {
    Class,
    Attribute,
    Instance,
}

/// A single validation finding, with enough context to locate it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    Class {
        /// Path of the declaring package, ending in `/`.
        path: Arc<str>,
        class: Arc<str>,
        problem: ClassProblem,
    },
    Attribute {
        path: Arc<str>,
        class: Arc<str>,
        attribute: Arc<str>,
        problem: AttributeProblem,
    },
    Instance {
        instance: Arc<str>,
        class: Arc<str>,
        problem: InstanceProblem,
    },
}

impl ValidationError {
    pub fn kind(&self) -> FindingKind {
        match self {
            ValidationError::Class { .. } => FindingKind::Class,
            ValidationError::Attribute { .. } => FindingKind::Attribute,
            ValidationError::Instance { .. } => FindingKind::Instance,
        }
    }

    /// The problem text without location.
    pub fn message(&self) -> String {
        match self {
            ValidationError::Class { problem, .. } => problem.to_string(),
            ValidationError::Attribute { problem, .. } => problem.to_string(),
            ValidationError::Instance { problem, .. } => problem.to_string(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Class {
                path,
                class,
                problem,
            } => write!(f, "Class error: {path}{class} | {problem}"),
            ValidationError::Attribute {
                path,
                class,
                attribute,
                problem,
            } => write!(f, "Attribute error: {path}{class}.{attribute} | {problem}"),
            ValidationError::Instance {
                instance,
                class,
                problem,
            } => write!(f, "Instance error: {instance} ({class}) | {problem}"),
        }
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// Collects findings across validation passes.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    findings: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, finding: ValidationError) {
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[ValidationError] {
        &self.findings
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.findings.iter()
    }

    /// Number of findings of one kind.
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn into_findings(self) -> Vec<ValidationError> {
        self.findings
    }
}

impl Extend<ValidationError> for ValidationReport {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        self.findings.extend(iter);
    }
}

impl FromIterator<ValidationError> for ValidationReport {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            findings: iter.into_iter().collect(),
        }
    }
}
