//! # xmigen
//!
//! Generates source artifacts and test fixtures from UML class models
//! exported as XMI 2.1, driven by a declarative recipe.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! pipeline  → run(recipe): parse → validate → generate
//!   ↓
//! generate  → template rules, filters, template contexts, fixtures
//!   ↓
//! validate  → structural rules and findings (read-only)
//!   ↓
//! parse     → XMI document → Model + TestCases
//!   ↓
//! model     → arena-owned package tree, test-case instances
//!   ↓
//! project   → recipe loading, type settings
//!   ↓
//! syntax    → namespace-aware XML element tree (quick-xml)
//!   ↓
//! base      → typed ids, line/column positions
//! ```
//!
//! ## Example
//!
//! ```no_run
//! let report = xmigen::pipeline::run_dir("recipes/shop")?;
//! for finding in &report.findings {
//!     eprintln!("{finding}");
//! }
//! # Ok::<(), xmigen::XmiError>(())
//! ```

/// Foundation types: typed ids, positions
pub mod base;

/// Fatal error type
pub mod error;

/// Rendering templates and fixtures
pub mod generate;

/// The in-memory model graph
pub mod model;

/// XMI → model lowering
pub mod parse;

/// Whole-run orchestration
pub mod pipeline;

/// Recipe configuration
pub mod project;

/// XML element tree
pub mod syntax;

/// Structural validation
pub mod validate;

pub use error::{Result, XmiError};
pub use generate::{GenerationReport, Generator};
pub use model::{Model, TestCases};
pub use pipeline::{RunOutcome, RunReport, run, run_dir};
pub use project::{Recipe, TypeSettings};
pub use validate::{ValidationError, ValidationReport, validate, validate_test_cases};
