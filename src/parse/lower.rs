//! Lowering the root package subtree into a [`Model`].
//!
//! Lowering runs in two passes. The first walks `packagedElement`s in
//! document order, creating packages, classes and enumerations and
//! remembering every element that refers to others. The second resolves
//! those references (supertypes, attribute types, association ends),
//! after which test-case instances can be built on top.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::index::{Annotations, IdIndex};
use crate::base::{AssociationId, ClassId, EnumId, PackageId};
use crate::error::{Result, XmiError};
use crate::model::{Attribute, Model, Multiplicity, Upper};
use crate::syntax::Element;

/// Which end of an association an end element is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum End {
    Source,
    Dest,
}

/// Mutable state of one lowering.
pub(crate) struct Lowering<'a> {
    pub(crate) index: &'a IdIndex<'a>,
    pub(crate) annotations: &'a Annotations<'a>,
    pub(crate) model: Model,
    pub(crate) classes: FxHashMap<&'a str, ClassId>,
    pub(crate) enumerations: FxHashMap<&'a str, EnumId>,
    pub(crate) associations: FxHashMap<&'a str, AssociationId>,
    /// Attribute `xmi:id` -> (owning class, attribute name).
    pub(crate) attributes: FxHashMap<&'a str, (ClassId, Arc<str>)>,
    /// Association end `xmi:id` -> (association, which end).
    pub(crate) ends: FxHashMap<&'a str, (AssociationId, End)>,
    pending_classes: Vec<(ClassId, &'a Element)>,
    pending_associations: Vec<(PackageId, &'a Element)>,
    pub(crate) pending_instances: Vec<&'a Element>,
}

impl<'a> Lowering<'a> {
    pub(crate) fn new(index: &'a IdIndex<'a>, annotations: &'a Annotations<'a>) -> Self {
        Self {
            index,
            annotations,
            model: Model::new(),
            classes: FxHashMap::default(),
            enumerations: FxHashMap::default(),
            associations: FxHashMap::default(),
            attributes: FxHashMap::default(),
            ends: FxHashMap::default(),
            pending_classes: Vec::new(),
            pending_associations: Vec::new(),
            pending_instances: Vec::new(),
        }
    }

    /// Run both passes over the root package element.
    pub(crate) fn lower(&mut self, root: &'a Element) -> Result<()> {
        self.declare_package(root, None);

        for (class, element) in std::mem::take(&mut self.pending_classes) {
            self.resolve_class(class, element)?;
        }
        for (package, element) in std::mem::take(&mut self.pending_associations) {
            self.resolve_association(package, element)?;
        }
        Ok(())
    }

    // ========================================================================
    // PASS 1: DECLARATIONS
    // ========================================================================

    fn declare_package(&mut self, element: &'a Element, parent: Option<PackageId>) -> PackageId {
        let name = element.attr("name").unwrap_or_default();
        let package = self.model.add_package(name, parent);
        let annotation = self.annotations.of(element);
        let pkg = self.model.package_mut(package);
        pkg.domain = annotation.tag("domain").cloned();
        pkg.tags = annotation.tags;

        for child in element.children_named("packagedElement") {
            match child.xmi_type() {
                Some("Package") => {
                    self.declare_package(child, Some(package));
                }
                Some("Class") => self.declare_class(package, child),
                Some("Enumeration") => self.declare_enumeration(package, child),
                Some("Association") => self.pending_associations.push((package, child)),
                Some("InstanceSpecification") => self.pending_instances.push(child),
                Some("PrimitiveType" | "DataType") => {}
                other => debug!(kind = ?other, name = ?child.attr("name"), "skipping packaged element"),
            }
        }
        package
    }

    fn declare_class(&mut self, package: PackageId, element: &'a Element) {
        let class = self
            .model
            .add_class(package, element.attr("name").unwrap_or_default());
        let annotation = self.annotations.of(element);
        let domain = annotation
            .tag("domain")
            .cloned()
            .or_else(|| self.package_domain(package));

        let cls = self.model.class_mut(class);
        cls.xmi_id = element.xmi_id().map(Arc::from);
        cls.is_abstract = element.attr("isAbstract") == Some("true");
        cls.domain = domain;
        cls.stereotype = annotation.stereotypes.first().cloned();
        cls.tags = annotation.tags;

        if let Some(id) = element.xmi_id() {
            self.classes.insert(id, class);
        }
        self.pending_classes.push((class, element));
    }

    fn declare_enumeration(&mut self, package: PackageId, element: &'a Element) {
        let enumeration = self
            .model
            .add_enumeration(package, element.attr("name").unwrap_or_default());
        let literals = element
            .children_named("ownedLiteral")
            .filter_map(|l| l.attr("name"))
            .map(Arc::from)
            .collect();

        let enm = self.model.enumeration_mut(enumeration);
        enm.xmi_id = element.xmi_id().map(Arc::from);
        enm.literals = literals;

        if let Some(id) = element.xmi_id() {
            self.enumerations.insert(id, enumeration);
        }
    }

    /// Domain tag of the nearest enclosing package that has one.
    fn package_domain(&self, package: PackageId) -> Option<Arc<str>> {
        let mut current = Some(package);
        while let Some(id) = current {
            let pkg = self.model.package(id);
            if let Some(domain) = &pkg.domain {
                return Some(Arc::clone(domain));
            }
            current = pkg.parent;
        }
        None
    }

    // ========================================================================
    // PASS 2: REFERENCES
    // ========================================================================

    fn resolve_class(&mut self, class: ClassId, element: &'a Element) -> Result<()> {
        if let Some(general) = element
            .children_named("generalization")
            .find_map(|g| g.idref("general"))
        {
            let supertype = self
                .classes
                .get(general)
                .copied()
                .ok_or_else(|| XmiError::lookup("generalization target", general))?;
            self.model.class_mut(class).supertype = Some(supertype);
        }

        for owned in element.children_named("ownedAttribute") {
            if owned.attr("association").is_some() {
                continue;
            }
            let attribute = self.attribute(owned);
            if let Some(id) = owned.xmi_id() {
                self.attributes.insert(id, (class, Arc::clone(&attribute.name)));
            }
            self.model.push_attribute(class, attribute);
        }
        Ok(())
    }

    fn attribute(&self, element: &'a Element) -> Attribute {
        let name = element.attr("name").unwrap_or_default();
        let (type_name, classification) = self.attribute_type(element);
        let annotation = self.annotations.of(element);

        let mut attribute = Attribute::new(name, type_name);
        attribute.xmi_id = element.xmi_id().map(Arc::from);
        attribute.classification = classification;
        attribute.is_id = element.attr("isID") == Some("true") || annotation.has_stereotype("id");
        attribute.stereotype = annotation
            .stereotypes
            .iter()
            .find(|s| &***s != "id")
            .cloned();
        attribute.default = element
            .child("defaultValue")
            .and_then(|d| d.attr("value"))
            .map(Arc::from);
        attribute.tags = annotation.tags;
        attribute
    }

    /// The declared type name, and the enumeration when the type is one.
    fn attribute_type(&self, element: &'a Element) -> (Arc<str>, Option<EnumId>) {
        if let Some(id) = element.idref("type") {
            if let Some(&enumeration) = self.enumerations.get(id) {
                let name = Arc::clone(&self.model.enumeration(enumeration).name);
                return (name, Some(enumeration));
            }
            if let Some(name) = self.index.name_of(id) {
                return (Arc::from(name), None);
            }
            return (Arc::from(ea_type_name(id)), None);
        }
        let href = element.child("type").and_then(|t| t.attr("href"));
        match href.and_then(|h| h.rsplit_once('#')) {
            Some((_, fragment)) => (Arc::from(fragment), None),
            None => (Arc::from(""), None),
        }
    }

    fn resolve_association(&mut self, package: PackageId, element: &'a Element) -> Result<()> {
        let member_ends = element.idrefs("memberEnd");
        let mut ends: Vec<&'a Element> = Vec::with_capacity(2);
        for id in &member_ends {
            let end = self
                .index
                .get(id)
                .ok_or_else(|| XmiError::lookup("association end", *id))?;
            ends.push(end);
        }
        if ends.len() < 2 {
            ends = element.children_named("ownedEnd").collect();
        }
        let [first, second] = ends[..] else {
            debug!(
                name = ?element.attr("name"),
                ends = ends.len(),
                "skipping association without exactly two ends"
            );
            return Ok(());
        };

        let class_owned = |e: &Element| &*e.name == "ownedAttribute";
        let (source_end, dest_end) = match (class_owned(first), class_owned(second)) {
            (false, true) => (first, second),
            (true, false) => (second, first),
            _ => (first, second),
        };

        let source = self.end_type(source_end)?;
        let dest = self.end_type(dest_end)?;
        let association = self.model.add_association(
            package,
            source,
            dest,
            multiplicity(source_end),
            multiplicity(dest_end),
        );

        let assoc = self.model.association_mut(association);
        assoc.xmi_id = element.xmi_id().map(Arc::from);
        assoc.name = element.attr("name").filter(|n| !n.is_empty()).map(Arc::from);
        assoc.source_role = source_end.attr("name").filter(|n| !n.is_empty()).map(Arc::from);
        assoc.dest_role = dest_end.attr("name").filter(|n| !n.is_empty()).map(Arc::from);

        if let Some(id) = element.xmi_id() {
            self.associations.insert(id, association);
        }
        if let Some(id) = source_end.xmi_id() {
            self.ends.insert(id, (association, End::Source));
        }
        if let Some(id) = dest_end.xmi_id() {
            self.ends.insert(id, (association, End::Dest));
        }
        Ok(())
    }

    fn end_type(&self, end: &'a Element) -> Result<ClassId> {
        let id = end
            .idref("type")
            .ok_or_else(|| XmiError::lookup("association end type", end.xmi_id().unwrap_or("<anonymous>")))?;
        self.classes
            .get(id)
            .copied()
            .ok_or_else(|| XmiError::lookup("association end type", id))
    }
}

/// Enterprise Architect encodes primitive type ids as `EAJava_int`,
/// `EAnone_string`: the type name follows the first `_`.
fn ea_type_name(id: &str) -> &str {
    match id.split_once('_') {
        Some((prefix, name)) if prefix.starts_with("EA") && prefix != "EAID" && !name.is_empty() => {
            name
        }
        _ => id,
    }
}

/// Multiplicity of an association end.
///
/// A missing `lowerValue` is 1 and one without a value is 0; a missing
/// `upperValue` is 1, and `*` or `-1` is unbounded.
pub(crate) fn multiplicity(end: &Element) -> Multiplicity {
    let lower = match end.child("lowerValue") {
        None => 1,
        Some(value) => value
            .attr("value")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
    };
    let upper = match end.child("upperValue").and_then(|v| v.attr("value")) {
        Some("*" | "-1") => Upper::Unbounded,
        Some(value) => Upper::Bounded(value.parse().unwrap_or(1)),
        None => Upper::Bounded(1),
    };
    Multiplicity::new(lower, upper)
}
