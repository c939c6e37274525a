//! Entity types stored in the [`Model`](super::Model) arena.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::base::{AssociationId, ClassId, EnumId, PackageId};

/// Tagged values attached to a model element, in declaration order.
pub type Tags = IndexMap<Arc<str>, Arc<str>>;

/// A namespace node of the UML model tree.
#[derive(Clone, Debug)]
pub struct Package {
    pub id: PackageId,
    pub name: Arc<str>,
    /// Ancestry of the package ending in `/`, e.g. `shop/sales/`.
    pub path: Arc<str>,
    pub parent: Option<PackageId>,
    /// Domain tag declared on the package, inherited by its classes.
    pub domain: Option<Arc<str>>,
    pub tags: Tags,
    pub classes: Vec<ClassId>,
    pub enumerations: Vec<EnumId>,
    pub associations: Vec<AssociationId>,
    pub children: Vec<PackageId>,
}

#[derive(Clone, Debug)]
pub struct Class {
    pub id: ClassId,
    /// The package that declared the class.
    pub package: PackageId,
    pub xmi_id: Option<Arc<str>>,
    pub name: Arc<str>,
    pub domain: Option<Arc<str>>,
    pub is_abstract: bool,
    pub stereotype: Option<Arc<str>>,
    pub tags: Tags,
    pub supertype: Option<ClassId>,
    /// Index into `attributes` of the first attribute with `is_id`.
    pub id_attribute: Option<usize>,
    pub attributes: Vec<Attribute>,
}

impl Class {
    /// The class's own primary key attribute, ignoring supertypes.
    pub fn id_attribute(&self) -> Option<&Attribute> {
        self.id_attribute.map(|index| &self.attributes[index])
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| &*a.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct Attribute {
    pub xmi_id: Option<Arc<str>>,
    pub name: Arc<str>,
    /// The declared type name; for enumeration-typed attributes, the enum's name.
    pub type_name: Arc<str>,
    /// Set when the attribute is typed by a declared enumeration.
    pub classification: Option<EnumId>,
    /// Free-form tag, e.g. `auto` for auto-increment.
    pub stereotype: Option<Arc<str>>,
    pub is_id: bool,
    pub default: Option<Arc<str>>,
    pub tags: Tags,
}

impl Attribute {
    pub fn new(name: impl Into<Arc<str>>, type_name: impl Into<Arc<str>>) -> Self {
        Self {
            xmi_id: None,
            name: name.into(),
            type_name: type_name.into(),
            classification: None,
            stereotype: None,
            is_id: false,
            default: None,
            tags: Tags::new(),
        }
    }

    pub fn is_auto_increment(&self) -> bool {
        self.stereotype.as_deref() == Some("auto")
    }
}

#[derive(Clone, Debug)]
pub struct Enumeration {
    pub id: EnumId,
    pub package: PackageId,
    pub xmi_id: Option<Arc<str>>,
    pub name: Arc<str>,
    pub literals: Vec<Arc<str>>,
}

impl Enumeration {
    pub fn has_literal(&self, literal: &str) -> bool {
        self.literals.iter().any(|l| &**l == literal)
    }
}

#[derive(Clone, Debug)]
pub struct Association {
    pub id: AssociationId,
    /// The package that declared the association.
    pub package: PackageId,
    pub xmi_id: Option<Arc<str>>,
    pub name: Option<Arc<str>>,
    pub source: ClassId,
    pub dest: ClassId,
    /// Name of the source end, if the model gives one.
    pub source_role: Option<Arc<str>>,
    /// Name of the dest end, if the model gives one.
    pub dest_role: Option<Arc<str>>,
    pub source_multiplicity: Multiplicity,
    pub dest_multiplicity: Multiplicity,
}

impl Association {
    /// Whether a source instance links to a list of dest instances.
    pub fn is_to_many(&self) -> bool {
        self.dest_multiplicity.upper.is_unbounded()
    }
}

/// Upper bound of a multiplicity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Upper {
    Bounded(u32),
    /// `*`
    Unbounded,
}

impl Upper {
    pub fn is_unbounded(self) -> bool {
        matches!(self, Upper::Unbounded)
    }
}

impl fmt::Display for Upper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upper::Bounded(n) => write!(f, "{n}"),
            Upper::Unbounded => f.write_str("*"),
        }
    }
}

/// `(lower, upper)` cardinality of an association end.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Multiplicity {
    pub lower: u32,
    pub upper: Upper,
}

impl Multiplicity {
    pub const fn new(lower: u32, upper: Upper) -> Self {
        Self { lower, upper }
    }

    /// `1..1`, the UML default when no bounds are given.
    pub const fn one() -> Self {
        Self::new(1, Upper::Bounded(1))
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::one()
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Upper::Bounded(upper) if upper == self.lower => write!(f, "{upper}"),
            upper => write!(f, "{}..{}", self.lower, upper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicity_display() {
        assert_eq!(Multiplicity::one().to_string(), "1");
        assert_eq!(Multiplicity::new(0, Upper::Unbounded).to_string(), "0..*");
        assert_eq!(Multiplicity::new(0, Upper::Bounded(1)).to_string(), "0..1");
    }

    #[test]
    fn test_auto_increment_stereotype() {
        let mut attr = Attribute::new("id", "int");
        assert!(!attr.is_auto_increment());
        attr.stereotype = Some(Arc::from("auto"));
        assert!(attr.is_auto_increment());
    }
}
