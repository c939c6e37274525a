//! The declarative recipe driving a run.
//!
//! A recipe names the XMI source, the root package, the primitive type
//! table and the template rules. It is deserialized from YAML:
//!
//! ```yaml
//! source: model.xmi
//! root_package: shop
//! types:
//!   int: { sql: INTEGER }
//!   string: { sql: TEXT }
//! templates_folder: templates
//! templates:
//!   - level: class
//!     source: model.py.j2
//!     dest: "out/{{ cls.package.name }}/{{ cls.name | snake_case }}.py"
//!     filter: "{% if not cls.is_abstract %}True{% endif %}"
//! test_templates:
//!   - dest: "out/fixtures/{{ ins.name }}.json"
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Result, XmiError};
use crate::generate::{TemplateRule, TestTemplateRule};

/// File name of the recipe inside a recipe directory.
pub const RECIPE_FILE: &str = "config.yaml";

/// Primitive type name -> generation-time type info.
///
/// Keys are what the validator accepts as attribute types; values are
/// opaque to the core and exposed to templates as the `types` global.
#[derive(Clone, Debug, Default, Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct TypeSettings(IndexMap<String, serde_yaml::Value>);

impl TypeSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, info: serde_yaml::Value) {
        self.0.insert(name.into(), info);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&serde_yaml::Value> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TypeSettings {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|name| (name.into(), serde_yaml::Value::Null))
                .collect(),
        )
    }
}

/// Configuration of one pipeline run.
#[derive(Clone, Debug, Deserialize)]
pub struct Recipe {
    /// Path of the XMI document.
    pub source: PathBuf,
    /// Name of the `packagedElement` used as model root.
    pub root_package: String,
    #[serde(default)]
    pub types: TypeSettings,
    /// Directory template bodies are loaded from.
    pub templates_folder: PathBuf,
    #[serde(default)]
    pub templates: Vec<TemplateRule>,
    #[serde(default)]
    pub test_templates: Vec<TestTemplateRule>,
    /// Base directory for relative rendered destinations.
    #[serde(default)]
    pub output_folder: Option<PathBuf>,
    /// Skip generation when validation reports findings.
    #[serde(default)]
    pub strict: bool,
}

impl Recipe {
    /// Parse a recipe from YAML text. Paths are kept as written.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| XmiError::Recipe {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Load `config.yaml` from a recipe directory.
    ///
    /// Relative `source`, `templates_folder` and `output_folder` paths are
    /// resolved against the directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let path = dir.join(RECIPE_FILE);
        let text = std::fs::read_to_string(&path).map_err(|err| XmiError::io(&path, err))?;
        let mut recipe: Recipe =
            serde_yaml::from_str(&text).map_err(|source| XmiError::Recipe { path, source })?;
        recipe.rebase(dir);
        Ok(recipe)
    }

    fn rebase(&mut self, dir: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        };
        rebase(&mut self.source);
        rebase(&mut self.templates_folder);
        if let Some(output) = self.output_folder.as_mut() {
            rebase(output);
        }
    }
}
