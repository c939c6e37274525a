//! The in-memory model graph.
//!
//! A [`Model`] is an arena that owns every [`Package`], [`Class`],
//! [`Enumeration`] and [`Association`] parsed from one XMI document.
//! Packages list the ids of what they declare, in document order; all
//! other references between entities are ids resolved during parsing.
//!
//! Test-case instances are kept apart from the structural model in
//! [`TestCases`].

mod instance;
mod types;

use std::sync::Arc;

pub use instance::{InstanceLink, LiteralValue, Slot, TestCase, TestCases};
pub use types::{Association, Attribute, Class, Enumeration, Multiplicity, Package, Tags, Upper};

use crate::base::{AssociationId, ClassId, EnumId, PackageId};

/// Arena owning the whole package tree of one run.
#[derive(Clone, Debug, Default)]
pub struct Model {
    packages: Vec<Package>,
    classes: Vec<Class>,
    enumerations: Vec<Enumeration>,
    associations: Vec<Association>,
    /// Associations whose source is the class, indexed by class.
    outgoing: Vec<Vec<AssociationId>>,
    /// Associations whose dest is the class, indexed by class.
    incoming: Vec<Vec<AssociationId>>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Add a package, linking it under `parent` when given.
    pub fn add_package(&mut self, name: impl Into<Arc<str>>, parent: Option<PackageId>) -> PackageId {
        let id = PackageId::from_index(self.packages.len());
        let name = name.into();
        let path: Arc<str> = match parent {
            Some(parent) => Arc::from(format!("{}{}/", self.package(parent).path, name)),
            None => Arc::from(format!("{name}/")),
        };
        self.packages.push(Package {
            id,
            name,
            path,
            parent,
            domain: None,
            tags: Tags::new(),
            classes: Vec::new(),
            enumerations: Vec::new(),
            associations: Vec::new(),
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.packages[parent.index()].children.push(id);
        }
        id
    }

    /// Add a class declared in `package`.
    pub fn add_class(&mut self, package: PackageId, name: impl Into<Arc<str>>) -> ClassId {
        let id = ClassId::from_index(self.classes.len());
        self.classes.push(Class {
            id,
            package,
            xmi_id: None,
            name: name.into(),
            domain: None,
            is_abstract: false,
            stereotype: None,
            tags: Tags::new(),
            supertype: None,
            id_attribute: None,
            attributes: Vec::new(),
        });
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.packages[package.index()].classes.push(id);
        id
    }

    /// Add an enumeration declared in `package`.
    pub fn add_enumeration(&mut self, package: PackageId, name: impl Into<Arc<str>>) -> EnumId {
        let id = EnumId::from_index(self.enumerations.len());
        self.enumerations.push(Enumeration {
            id,
            package,
            xmi_id: None,
            name: name.into(),
            literals: Vec::new(),
        });
        self.packages[package.index()].enumerations.push(id);
        id
    }

    /// Add an association declared in `package` and index it on both classes.
    pub fn add_association(
        &mut self,
        package: PackageId,
        source: ClassId,
        dest: ClassId,
        source_multiplicity: Multiplicity,
        dest_multiplicity: Multiplicity,
    ) -> AssociationId {
        let id = AssociationId::from_index(self.associations.len());
        self.associations.push(Association {
            id,
            package,
            xmi_id: None,
            name: None,
            source,
            dest,
            source_role: None,
            dest_role: None,
            source_multiplicity,
            dest_multiplicity,
        });
        self.outgoing[source.index()].push(id);
        self.incoming[dest.index()].push(id);
        self.packages[package.index()].associations.push(id);
        id
    }

    /// Append an attribute to a class.
    ///
    /// The first attribute flagged `is_id` becomes the class's `id_attribute`;
    /// later ones are kept but do not replace it.
    pub fn push_attribute(&mut self, class: ClassId, attribute: Attribute) {
        let class = &mut self.classes[class.index()];
        if attribute.is_id && class.id_attribute.is_none() {
            class.id_attribute = Some(class.attributes.len());
        }
        class.attributes.push(attribute);
    }

    pub fn package_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.index()]
    }

    pub fn enumeration_mut(&mut self, id: EnumId) -> &mut Enumeration {
        &mut self.enumerations[id.index()]
    }

    pub fn association_mut(&mut self, id: AssociationId) -> &mut Association {
        &mut self.associations[id.index()]
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// The first package added, i.e. the model root.
    pub fn root(&self) -> Option<PackageId> {
        self.packages.first().map(|p| p.id)
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    pub fn class(&self, id: ClassId) -> &Class {
        &self.classes[id.index()]
    }

    pub fn enumeration(&self, id: EnumId) -> &Enumeration {
        &self.enumerations[id.index()]
    }

    pub fn association(&self, id: AssociationId) -> &Association {
        &self.associations[id.index()]
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.iter()
    }

    pub fn enumerations(&self) -> impl Iterator<Item = &Enumeration> {
        self.enumerations.iter()
    }

    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.iter()
    }

    /// Associations whose `source` is `class`, in declaration order.
    pub fn associations_from(&self, class: ClassId) -> impl Iterator<Item = &Association> {
        self.outgoing[class.index()].iter().map(|&id| self.association(id))
    }

    /// Associations whose `dest` is `class`, in declaration order.
    pub fn associations_to(&self, class: ClassId) -> impl Iterator<Item = &Association> {
        self.incoming[class.index()].iter().map(|&id| self.association(id))
    }

    /// Find the first class with the given name.
    pub fn find_class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| &*c.name == name)
    }

    /// `package.path + class.name`, the form used in validation messages.
    pub fn qualified_name(&self, class: ClassId) -> String {
        let class = self.class(class);
        format!("{}{}", self.package(class.package).path, class.name)
    }

    // ------------------------------------------------------------------
    // Inheritance
    // ------------------------------------------------------------------

    /// The supertype chain of `class`, nearest first, excluding `class`.
    ///
    /// Stops before revisiting a class, so a circular generalization
    /// yields a finite chain.
    pub fn supertypes(&self, class: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut current = self.class(class).supertype;
        while let Some(id) = current {
            if id == class || chain.contains(&id) {
                break;
            }
            chain.push(id);
            current = self.class(id).supertype;
        }
        chain
    }

    /// Whether following supertypes from `class` leads back to `class`.
    pub fn has_circular_generalization(&self, class: ClassId) -> bool {
        let mut seen = Vec::new();
        let mut current = self.class(class).supertype;
        while let Some(id) = current {
            if id == class {
                return true;
            }
            if seen.contains(&id) {
                return false;
            }
            seen.push(id);
            current = self.class(id).supertype;
        }
        false
    }

    /// Whether `class` is `ancestor` or inherits from it.
    pub fn is_kind_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        class == ancestor || self.supertypes(class).contains(&ancestor)
    }

    /// The primary key of `class`: its own `id_attribute`, or failing that
    /// the nearest supertype's. Returns the owning class with the attribute.
    pub fn primary_key(&self, class: ClassId) -> Option<(ClassId, &Attribute)> {
        std::iter::once(class)
            .chain(self.supertypes(class))
            .find_map(|id| self.class(id).id_attribute().map(|attr| (id, attr)))
    }

    /// Attributes of `class` including inherited ones, root supertype first.
    pub fn all_attributes(&self, class: ClassId) -> Vec<(ClassId, &Attribute)> {
        let mut lineage = self.supertypes(class);
        lineage.reverse();
        lineage.push(class);
        lineage
            .into_iter()
            .flat_map(|id| self.class(id).attributes.iter().map(move |attr| (id, attr)))
            .collect()
    }
}
