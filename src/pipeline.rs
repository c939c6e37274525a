//! One full parse -> validate -> generate pass.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{Result, XmiError};
use crate::generate::Generator;
use crate::parse;
use crate::project::Recipe;
use crate::validate::{self, ValidationError};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Output was generated.
    Generated,
    /// The recipe is strict and validation reported findings.
    Gated,
    /// The configured root package is not in the document; nothing was generated.
    RootPackageNotFound,
}

/// Result of a run that did not fail outright.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub findings: Vec<ValidationError>,
    pub written: Vec<PathBuf>,
}

impl RunReport {
    fn ended(outcome: RunOutcome, findings: Vec<ValidationError>) -> Self {
        Self {
            outcome,
            findings,
            written: Vec::new(),
        }
    }
}

/// Run a recipe.
///
/// A missing root package ends the run with
/// [`RunOutcome::RootPackageNotFound`]. Malformed XMI, unresolvable
/// references, render failures and write failures are errors.
pub fn run(recipe: &Recipe) -> Result<RunReport> {
    info!(source = %recipe.source.display(), "parsing");
    let text = std::fs::read_to_string(&recipe.source)
        .map_err(|err| XmiError::io(&recipe.source, err))?;

    let (model, cases) = match parse::parse(&text, &recipe.root_package) {
        Ok(parsed) => parsed,
        Err(XmiError::RootPackageNotFound(name)) => {
            error!(root_package = %name, "Root packaged element not found");
            return Ok(RunReport::ended(RunOutcome::RootPackageNotFound, Vec::new()));
        }
        Err(err) => return Err(err),
    };
    let Some(root) = model.root() else {
        return Ok(RunReport::ended(RunOutcome::RootPackageNotFound, Vec::new()));
    };

    info!("validating");
    let report = validate::validate_all(&model, root, &cases, &recipe.types);
    for finding in report.iter() {
        warn!("{finding}");
    }
    let findings = report.into_findings();

    if recipe.strict && !findings.is_empty() {
        info!(findings = findings.len(), "strict recipe, skipping generation");
        return Ok(RunReport::ended(RunOutcome::Gated, findings));
    }

    info!("generating");
    let generated = Generator::new(recipe, Arc::new(model)).generate(root, &cases)?;
    info!(files = generated.len(), "done");

    Ok(RunReport {
        outcome: RunOutcome::Generated,
        findings,
        written: generated.written,
    })
}

/// Load `config.yaml` from `dir` and run it.
pub fn run_dir(dir: impl AsRef<Path>) -> Result<RunReport> {
    let recipe = Recipe::load(dir)?;
    run(&recipe)
}
