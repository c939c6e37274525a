//! Document-wide lookup tables built before lowering.
//!
//! [`IdIndex`] maps every `xmi:id` to its element. [`Annotations`] gathers
//! stereotypes and tagged values, which XMI keeps away from the elements
//! they describe: in profile applications after the model, or in an
//! Enterprise Architect `xmi:Extension` block.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::model::Tags;
use crate::syntax::{Element, XmlNs};

/// `xmi:id` -> element, over the whole document.
#[derive(Debug, Default)]
pub(crate) struct IdIndex<'a> {
    elements: FxHashMap<&'a str, &'a Element>,
}

impl<'a> IdIndex<'a> {
    pub(crate) fn build(root: &'a Element) -> Self {
        let mut elements = FxHashMap::default();
        for element in root.descendants() {
            if let Some(id) = element.xmi_id() {
                elements.entry(id).or_insert(element);
            }
        }
        Self { elements }
    }

    pub(crate) fn get(&self, id: &str) -> Option<&'a Element> {
        self.elements.get(id).copied()
    }

    /// The `name` of the element `id` refers to.
    pub(crate) fn name_of(&self, id: &str) -> Option<&'a str> {
        self.get(id).and_then(|e| e.attr("name"))
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Stereotypes and tags applied to one element.
#[derive(Clone, Debug, Default)]
pub(crate) struct Annotation {
    /// In application order, without duplicates.
    pub(crate) stereotypes: Vec<Arc<str>>,
    pub(crate) tags: Tags,
}

impl Annotation {
    fn add_stereotype(&mut self, name: &str) {
        if !name.is_empty() && !self.stereotypes.iter().any(|s| &**s == name) {
            self.stereotypes.push(Arc::from(name));
        }
    }

    fn add_tag(&mut self, name: &str, value: &str) {
        self.tags.insert(Arc::from(name), Arc::from(value));
    }

    pub(crate) fn has_stereotype(&self, name: &str) -> bool {
        self.stereotypes.iter().any(|s| &**s == name)
    }

    pub(crate) fn tag(&self, name: &str) -> Option<&Arc<str>> {
        self.tags.get(name)
    }
}

/// Element id -> annotation.
#[derive(Debug, Default)]
pub(crate) struct Annotations<'a> {
    by_id: FxHashMap<&'a str, Annotation>,
}

impl<'a> Annotations<'a> {
    /// Collect annotations from every top-level element other than `uml:Model`.
    pub(crate) fn collect(root: &'a Element) -> Self {
        let mut annotations = Self::default();
        for section in &root.children {
            if section.is(&XmlNs::Uml, "Model") {
                continue;
            }
            if section.is(&XmlNs::Xmi, "Extension") {
                annotations.collect_extension(section);
            } else {
                annotations.collect_profile(section);
            }
        }
        debug!(annotated = annotations.by_id.len(), "collected stereotypes and tags");
        annotations
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Annotation> {
        self.by_id.get(id)
    }

    /// The annotation of an element, empty when it has none or no `xmi:id`.
    pub(crate) fn of(&self, element: &Element) -> Annotation {
        element
            .xmi_id()
            .and_then(|id| self.get(id))
            .cloned()
            .unwrap_or_default()
    }

    fn entry(&mut self, id: &'a str) -> &mut Annotation {
        self.by_id.entry(id).or_default()
    }

    /// `<profile:auto base_Property="X"/>`: stereotype `auto` on `X`, with
    /// every other unprefixed attribute as a tag.
    fn collect_profile(&mut self, section: &'a Element) {
        for element in section.descendants() {
            let Some(base) = element
                .attributes
                .iter()
                .find(|a| a.ns == XmlNs::None && a.name.starts_with("base_"))
            else {
                continue;
            };
            let annotation = self.entry(&base.value);
            annotation.add_stereotype(&element.name);
            for attr in &element.attributes {
                if attr.ns == XmlNs::None && !attr.name.starts_with("base_") {
                    annotation.add_tag(&attr.name, &attr.value);
                }
            }
        }
    }

    /// `xmi:Extension/elements/element` blocks.
    fn collect_extension(&mut self, extension: &'a Element) {
        for elements in extension.children_named("elements") {
            for element in elements.children_named("element") {
                let Some(id) = element.xmi_attr("idref") else {
                    continue;
                };
                if let Some(stereotype) = element
                    .child("properties")
                    .and_then(|p| p.attr("stereotype"))
                {
                    self.entry(id).add_stereotype(stereotype);
                }
                self.collect_ea_tags(id, element);

                for attribute in element
                    .child("attributes")
                    .into_iter()
                    .flat_map(|a| a.children_named("attribute"))
                {
                    let Some(attr_id) = attribute.xmi_attr("idref") else {
                        continue;
                    };
                    if let Some(stereotype) = attribute
                        .child("stereotype")
                        .and_then(|s| s.attr("stereotype"))
                    {
                        self.entry(attr_id).add_stereotype(stereotype);
                    }
                    self.collect_ea_tags(attr_id, attribute);
                }
            }
        }
    }

    fn collect_ea_tags(&mut self, id: &'a str, element: &'a Element) {
        for tag in element
            .child("tags")
            .into_iter()
            .flat_map(|t| t.children_named("tag"))
        {
            if let Some(name) = tag.attr("name") {
                let value = tag.attr("value").unwrap_or_default();
                self.entry(id).add_tag(name, value);
            }
        }
    }
}
