//! Template rules and filters.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::model::{Association, Class, Enumeration, Model, Package};

/// The structural level a template rule iterates over.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Package,
    Class,
    Enumeration,
    Association,
    /// Destination paths of test-case fixtures.
    TestCase,
}

impl Level {
    /// Name the candidate is bound to in the template context.
    pub fn binding(self) -> &'static str {
        match self {
            Level::Package => "package",
            Level::Class => "cls",
            Level::Enumeration => "enum",
            Level::Association => "association",
            Level::TestCase => "ins",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Package => "package",
            Level::Class => "class",
            Level::Enumeration => "enumeration",
            Level::Association => "association",
            Level::TestCase => "test case",
        })
    }
}

/// The element a filter is asked about.
#[derive(Copy, Clone, Debug)]
pub enum Candidate<'a> {
    Package(&'a Package),
    Class(&'a Class),
    Enumeration(&'a Enumeration),
    Association(&'a Association),
}

impl Candidate<'_> {
    pub fn level(&self) -> Level {
        match self {
            Candidate::Package(_) => Level::Package,
            Candidate::Class(_) => Level::Class,
            Candidate::Enumeration(_) => Level::Enumeration,
            Candidate::Association(_) => Level::Association,
        }
    }

    /// Display name of the candidate, for logging.
    pub fn name(&self) -> &str {
        match self {
            Candidate::Package(p) => &p.name,
            Candidate::Class(c) => &c.name,
            Candidate::Enumeration(e) => &e.name,
            Candidate::Association(a) => a.name.as_deref().unwrap_or("<association>"),
        }
    }
}

/// A typed filter predicate.
pub type Predicate = Arc<dyn Fn(&Model, Candidate<'_>) -> bool + Send + Sync>;

/// Decides whether a rule applies to a candidate.
///
/// A rule without a filter always applies.
#[derive(Clone)]
pub enum Filter {
    /// A template rendered with the candidate bound; matches only when the
    /// output is exactly `True`. Render failures do not match.
    Template(String),
    /// A predicate over the candidate.
    Predicate(Predicate),
}

impl Filter {
    pub fn template(source: impl Into<String>) -> Self {
        Filter::Template(source.into())
    }

    pub fn predicate(f: impl Fn(&Model, Candidate<'_>) -> bool + Send + Sync + 'static) -> Self {
        Filter::Predicate(Arc::new(f))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Template(source) => f.debug_tuple("Template").field(source).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Filter::Template)
    }
}

/// Body template, destination path template and optional filter of a rule.
#[derive(Clone, Debug, Deserialize)]
pub struct RuleSpec {
    /// Template file name, relative to the recipe's templates folder.
    pub source: String,
    /// Path template for the rendered output.
    pub dest: String,
    #[serde(default)]
    pub filter: Option<Filter>,
}

impl RuleSpec {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// A generation rule, one variant per structural level.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum TemplateRule {
    /// Rendered once per package, with the package bound as `package`.
    Package(RuleSpec),
    /// Rendered once per class of each package, bound as `cls`.
    Class(RuleSpec),
    /// Rendered once per enumeration of each package, bound as `enum`.
    Enumeration(RuleSpec),
    /// Rendered once per association of each package, bound as `association`.
    Association(RuleSpec),
}

impl TemplateRule {
    pub fn level(&self) -> Level {
        match self {
            TemplateRule::Package(_) => Level::Package,
            TemplateRule::Class(_) => Level::Class,
            TemplateRule::Enumeration(_) => Level::Enumeration,
            TemplateRule::Association(_) => Level::Association,
        }
    }

    pub fn spec(&self) -> &RuleSpec {
        match self {
            TemplateRule::Package(spec)
            | TemplateRule::Class(spec)
            | TemplateRule::Enumeration(spec)
            | TemplateRule::Association(spec) => spec,
        }
    }
}

/// Where serialized test-case fixtures are written; `dest` is rendered with
/// the instance bound as `ins`.
#[derive(Clone, Debug, Deserialize)]
pub struct TestTemplateRule {
    pub dest: String,
}

impl TestTemplateRule {
    pub fn new(dest: impl Into<String>) -> Self {
        Self { dest: dest.into() }
    }
}
