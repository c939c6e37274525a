//! Rendering the model graph through a recipe's templates.
//!
//! The [`Generator`] walks the package tree from the root. At every package
//! it applies each [`TemplateRule`] in recipe order: package rules to the
//! package itself, class/enumeration/association rules to the entities the
//! package declares. It then recurses into child packages whether or not
//! anything matched. Test-case instances are serialized separately into
//! JSON fixtures, one file per instance per [`TestTemplateRule`].
//!
//! Failing to render a template or write a file aborts generation;
//! a filter that does not match simply skips the candidate.

mod case;
mod context;
mod fixtures;
mod output;
mod rules;

use std::path::PathBuf;
use std::sync::Arc;

use minijinja::{Environment, Value};
use tracing::{debug, info};

pub use case::{to_camel_case, to_pascal_case, to_snake_case};
pub use context::{
    Bound, association_value, class_value, enumeration_value, instance_value, package_value,
};
pub use fixtures::{serialize, to_json_string};
pub use rules::{Candidate, Filter, Level, Predicate, RuleSpec, TemplateRule, TestTemplateRule};

use crate::base::PackageId;
use crate::error::{Result, XmiError};
use crate::model::{Model, TestCases};
use crate::project::Recipe;

/// Files written by one generation pass, in write order.
#[derive(Clone, Debug, Default)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
}

impl GenerationReport {
    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

/// Renders model artifacts and test fixtures for one recipe.
pub struct Generator {
    env: Environment<'static>,
    model: Arc<Model>,
    templates: Vec<TemplateRule>,
    test_templates: Vec<TestTemplateRule>,
    output_folder: Option<PathBuf>,
}

impl Generator {
    /// Build a generator whose templates load from the recipe's templates folder.
    pub fn new(recipe: &Recipe, model: Arc<Model>) -> Self {
        let mut env = Self::environment(recipe);
        env.set_loader(minijinja::path_loader(recipe.templates_folder.clone()));
        Self {
            env,
            model,
            templates: recipe.templates.clone(),
            test_templates: recipe.test_templates.clone(),
            output_folder: recipe.output_folder.clone(),
        }
    }

    /// Build a generator over in-memory templates, keyed by rule `source`.
    pub fn with_templates<'a>(
        recipe: &Recipe,
        model: Arc<Model>,
        templates: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        let mut env = Self::environment(recipe);
        for (name, body) in templates {
            env.add_template_owned(name.to_string(), body.to_string())
                .map_err(|source| XmiError::Render {
                    level: Level::Package,
                    template: name.to_string(),
                    source,
                })?;
        }
        Ok(Self {
            env,
            model,
            templates: recipe.templates.clone(),
            test_templates: recipe.test_templates.clone(),
            output_folder: recipe.output_folder.clone(),
        })
    }

    fn environment(recipe: &Recipe) -> Environment<'static> {
        let mut env = Environment::new();
        env.add_global("types", Value::from_serialize(&recipe.types));
        env.add_filter("snake_case", to_snake_case);
        env.add_filter("pascal_case", to_pascal_case);
        env.add_filter("camel_case", to_camel_case);
        env
    }

    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Render every rule over the tree under `root`, then write fixtures.
    pub fn generate(&self, root: PackageId, cases: &TestCases) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();
        info!(
            package = %self.model.package(root).name,
            rules = self.templates.len(),
            "generating model output"
        );
        self.output_model(root, &mut report)?;
        info!(cases = cases.len(), "generating test case output");
        self.output_test_cases(cases, &mut report)?;
        Ok(report)
    }

    /// Apply all rules at `package`, then recurse into its children.
    pub fn output_model(&self, package: PackageId, report: &mut GenerationReport) -> Result<()> {
        let model = &self.model;
        let pkg = model.package(package);

        for rule in &self.templates {
            match rule {
                TemplateRule::Package(spec) => {
                    let object = package_value(model, package);
                    self.emit(spec, Level::Package, Candidate::Package(pkg), object, report)?;
                }
                TemplateRule::Class(spec) => {
                    for &id in &pkg.classes {
                        let candidate = Candidate::Class(model.class(id));
                        self.emit(spec, Level::Class, candidate, class_value(model, id), report)?;
                    }
                }
                TemplateRule::Enumeration(spec) => {
                    for &id in &pkg.enumerations {
                        let candidate = Candidate::Enumeration(model.enumeration(id));
                        let object = enumeration_value(model, id);
                        self.emit(spec, Level::Enumeration, candidate, object, report)?;
                    }
                }
                TemplateRule::Association(spec) => {
                    for &id in &pkg.associations {
                        let candidate = Candidate::Association(model.association(id));
                        let object = association_value(model, id);
                        self.emit(spec, Level::Association, candidate, object, report)?;
                    }
                }
            }
        }

        for &child in &pkg.children {
            self.output_model(child, report)?;
        }
        Ok(())
    }

    /// Serialize every instance and write it to each test template's destination.
    pub fn output_test_cases(&self, cases: &TestCases, report: &mut GenerationReport) -> Result<()> {
        if self.test_templates.is_empty() {
            return Ok(());
        }
        for case in cases.iter() {
            let serialized = to_json_string(&self.model, cases, case.id)?;
            let ctx = Bound::context(
                Level::TestCase.binding(),
                instance_value(&self.model, case),
            );
            for rule in &self.test_templates {
                let dest = self.render_str(Level::TestCase, &rule.dest, &ctx)?;
                let path = self.write(Level::TestCase, &rule.dest, &dest, &serialized)?;
                report.written.push(path);
            }
        }
        Ok(())
    }

    fn emit(
        &self,
        spec: &RuleSpec,
        level: Level,
        candidate: Candidate<'_>,
        object: Value,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let ctx = Bound::context(level.binding(), object);
        if !self.matches(spec.filter.as_ref(), candidate, &ctx) {
            debug!(%level, name = candidate.name(), template = %spec.source, "filter did not match");
            return Ok(());
        }

        let dest = self.render_str(level, &spec.dest, &ctx)?;
        let body = self
            .env
            .get_template(&spec.source)
            .and_then(|template| template.render(&ctx))
            .map_err(|source| XmiError::Render {
                level,
                template: spec.source.clone(),
                source,
            })?;
        let path = self.write(level, &spec.dest, &dest, &body)?;
        debug!(%level, name = candidate.name(), path = %path.display(), "wrote");
        report.written.push(path);
        Ok(())
    }

    fn matches(&self, filter: Option<&Filter>, candidate: Candidate<'_>, ctx: &Value) -> bool {
        match filter {
            None => true,
            Some(Filter::Predicate(predicate)) => predicate(&self.model, candidate),
            Some(Filter::Template(source)) => match self.env.render_str(source, ctx) {
                Ok(rendered) => rendered == "True",
                Err(err) => {
                    debug!(level = %candidate.level(), name = candidate.name(), %err, "filter failed to render");
                    false
                }
            },
        }
    }

    fn render_str(&self, level: Level, source: &str, ctx: &Value) -> Result<String> {
        self.env
            .render_str(source, ctx)
            .map_err(|err| XmiError::Render {
                level,
                template: source.to_string(),
                source: err,
            })
    }

    fn write(&self, level: Level, template: &str, dest: &str, contents: &str) -> Result<PathBuf> {
        let path = output::resolve_dest(self.output_folder.as_deref(), dest).ok_or_else(|| {
            XmiError::Render {
                level,
                template: template.to_string(),
                source: minijinja::Error::new(
                    minijinja::ErrorKind::InvalidOperation,
                    "destination path rendered empty",
                ),
            }
        })?;
        output::write_file(&path, contents)?;
        Ok(path)
    }
}

/// Render all outputs for `root` and write test fixtures.
pub fn generate(
    model: Arc<Model>,
    root: PackageId,
    cases: &TestCases,
    recipe: &Recipe,
) -> Result<GenerationReport> {
    Generator::new(recipe, model).generate(root, cases)
}
