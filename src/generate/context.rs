//! Template contexts.
//!
//! Every model entity is exposed to templates as a lazy minijinja object
//! holding the shared [`Model`] and an id. Fields are produced on access,
//! so templates can navigate freely (`cls.supertype.package.name`,
//! `association.dest.associations_from`) and cyclic graphs are never
//! walked eagerly.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use minijinja::Value;
use minijinja::value::{Enumerator, Object};

use crate::base::{AssociationId, ClassId, EnumId, PackageId};
use crate::model::{LiteralValue, Model, Multiplicity, Tags, TestCase, Upper};

fn opt_str(value: Option<&Arc<str>>) -> Value {
    value.map_or(Value::from(()), |s| Value::from(&**s))
}

fn tags_value(tags: &Tags) -> Value {
    Value::from_serialize(tags)
}

fn multiplicity_value(multiplicity: Multiplicity) -> Value {
    let upper = match multiplicity.upper {
        Upper::Bounded(n) => Value::from(n),
        Upper::Unbounded => Value::from("*"),
    };
    Value::from(vec![Value::from(multiplicity.lower), upper])
}

pub fn package_value(model: &Arc<Model>, id: PackageId) -> Value {
    Value::from_object(PackageObject {
        model: Arc::clone(model),
        id,
    })
}

pub fn class_value(model: &Arc<Model>, id: ClassId) -> Value {
    Value::from_object(ClassObject {
        model: Arc::clone(model),
        id,
    })
}

pub fn attribute_value(model: &Arc<Model>, class: ClassId, index: usize) -> Value {
    Value::from_object(AttributeObject {
        model: Arc::clone(model),
        class,
        index,
    })
}

pub fn enumeration_value(model: &Arc<Model>, id: EnumId) -> Value {
    Value::from_object(EnumObject {
        model: Arc::clone(model),
        id,
    })
}

pub fn association_value(model: &Arc<Model>, id: AssociationId) -> Value {
    Value::from_object(AssociationObject {
        model: Arc::clone(model),
        id,
    })
}

pub fn instance_value(model: &Arc<Model>, case: &TestCase) -> Value {
    Value::from_object(InstanceObject {
        model: Arc::clone(model),
        case: case.clone(),
    })
}

/// Root context binding a single name, e.g. `cls`, to a value.
#[derive(Debug)]
pub struct Bound {
    name: &'static str,
    value: Value,
}

impl Bound {
    pub fn context(name: &'static str, value: Value) -> Value {
        Value::from_object(Bound { name, value })
    }
}

impl Object for Bound {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        (key.as_str()? == self.name).then(|| self.value.clone())
    }
}

// ============================================================================
// PACKAGE
// ============================================================================

pub struct PackageObject {
    model: Arc<Model>,
    id: PackageId,
}

impl fmt::Debug for PackageObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Package({})", self.model.package(self.id).path)
    }
}

impl Object for PackageObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let model = &self.model;
        let package = model.package(self.id);
        let value = match key.as_str()? {
            "name" => Value::from(&*package.name),
            "path" => Value::from(&*package.path),
            "domain" => opt_str(package.domain.as_ref()),
            "tags" => tags_value(&package.tags),
            "parent" => package
                .parent
                .map_or(Value::from(()), |id| package_value(model, id)),
            "classes" => Value::from(
                package
                    .classes
                    .iter()
                    .map(|&id| class_value(model, id))
                    .collect::<Vec<_>>(),
            ),
            "enumerations" => Value::from(
                package
                    .enumerations
                    .iter()
                    .map(|&id| enumeration_value(model, id))
                    .collect::<Vec<_>>(),
            ),
            "associations" => Value::from(
                package
                    .associations
                    .iter()
                    .map(|&id| association_value(model, id))
                    .collect::<Vec<_>>(),
            ),
            "children" => Value::from(
                package
                    .children
                    .iter()
                    .map(|&id| package_value(model, id))
                    .collect::<Vec<_>>(),
            ),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "name",
            "path",
            "domain",
            "tags",
            "parent",
            "classes",
            "enumerations",
            "associations",
            "children",
        ])
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model.package(self.id).name)
    }
}

// ============================================================================
// CLASS
// ============================================================================

pub struct ClassObject {
    model: Arc<Model>,
    id: ClassId,
}

impl fmt::Debug for ClassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.model.qualified_name(self.id))
    }
}

impl Object for ClassObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let model = &self.model;
        let class = model.class(self.id);
        let value = match key.as_str()? {
            "name" => Value::from(&*class.name),
            "qualified_name" => Value::from(model.qualified_name(self.id)),
            "domain" => opt_str(class.domain.as_ref()),
            "is_abstract" => Value::from(class.is_abstract),
            "stereotype" => opt_str(class.stereotype.as_ref()),
            "tags" => tags_value(&class.tags),
            "package" => package_value(model, class.package),
            "supertype" => class
                .supertype
                .map_or(Value::from(()), |id| class_value(model, id)),
            "supertypes" => Value::from(
                model
                    .supertypes(self.id)
                    .into_iter()
                    .map(|id| class_value(model, id))
                    .collect::<Vec<_>>(),
            ),
            "id_attribute" => class
                .id_attribute
                .map_or(Value::from(()), |index| attribute_value(model, self.id, index)),
            "primary_key" => model.primary_key(self.id).map_or(Value::from(()), |(owner, attr)| {
                let index = model
                    .class(owner)
                    .attributes
                    .iter()
                    .position(|a| std::ptr::eq(a, attr))
                    .unwrap_or_default();
                attribute_value(model, owner, index)
            }),
            "attributes" => Value::from(
                (0..class.attributes.len())
                    .map(|index| attribute_value(model, self.id, index))
                    .collect::<Vec<_>>(),
            ),
            "all_attributes" => {
                let mut values = Vec::new();
                let mut lineage = model.supertypes(self.id);
                lineage.reverse();
                lineage.push(self.id);
                for owner in lineage {
                    let count = model.class(owner).attributes.len();
                    values.extend((0..count).map(|index| attribute_value(model, owner, index)));
                }
                Value::from(values)
            }
            "associations_from" => Value::from(
                model
                    .associations_from(self.id)
                    .map(|a| association_value(model, a.id))
                    .collect::<Vec<_>>(),
            ),
            "associations_to" => Value::from(
                model
                    .associations_to(self.id)
                    .map(|a| association_value(model, a.id))
                    .collect::<Vec<_>>(),
            ),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "name",
            "qualified_name",
            "domain",
            "is_abstract",
            "stereotype",
            "tags",
            "package",
            "supertype",
            "supertypes",
            "id_attribute",
            "primary_key",
            "attributes",
            "all_attributes",
            "associations_from",
            "associations_to",
        ])
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model.class(self.id).name)
    }
}

// ============================================================================
// ATTRIBUTE
// ============================================================================

pub struct AttributeObject {
    model: Arc<Model>,
    class: ClassId,
    index: usize,
}

impl fmt::Debug for AttributeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self.model.class(self.class);
        write!(f, "Attribute({}.{})", class.name, class.attributes[self.index].name)
    }
}

impl Object for AttributeObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let model = &self.model;
        let attr = &model.class(self.class).attributes[self.index];
        let value = match key.as_str()? {
            "name" => Value::from(&*attr.name),
            "type" => Value::from(&*attr.type_name),
            "classification" => attr
                .classification
                .map_or(Value::from(()), |id| enumeration_value(model, id)),
            "stereotype" => opt_str(attr.stereotype.as_ref()),
            "is_id" => Value::from(attr.is_id),
            "is_auto_increment" => Value::from(attr.is_auto_increment()),
            "default" => opt_str(attr.default.as_ref()),
            "tags" => tags_value(&attr.tags),
            "cls" => class_value(model, self.class),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "name",
            "type",
            "classification",
            "stereotype",
            "is_id",
            "is_auto_increment",
            "default",
            "tags",
            "cls",
        ])
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model.class(self.class).attributes[self.index].name)
    }
}

// ============================================================================
// ENUMERATION
// ============================================================================

pub struct EnumObject {
    model: Arc<Model>,
    id: EnumId,
}

impl fmt::Debug for EnumObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Enumeration({})", self.model.enumeration(self.id).name)
    }
}

impl Object for EnumObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let enumeration = self.model.enumeration(self.id);
        let value = match key.as_str()? {
            "name" => Value::from(&*enumeration.name),
            "literals" => Value::from(
                enumeration
                    .literals
                    .iter()
                    .map(|l| Value::from(&**l))
                    .collect::<Vec<_>>(),
            ),
            "package" => package_value(&self.model, enumeration.package),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&["name", "literals", "package"])
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.model.enumeration(self.id).name)
    }
}

// ============================================================================
// ASSOCIATION
// ============================================================================

pub struct AssociationObject {
    model: Arc<Model>,
    id: AssociationId,
}

impl fmt::Debug for AssociationObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assoc = self.model.association(self.id);
        write!(
            f,
            "Association({} -> {})",
            self.model.class(assoc.source).name,
            self.model.class(assoc.dest).name
        )
    }
}

impl Object for AssociationObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let model = &self.model;
        let assoc = model.association(self.id);
        let value = match key.as_str()? {
            "name" => opt_str(assoc.name.as_ref()),
            "source" => class_value(model, assoc.source),
            "dest" => class_value(model, assoc.dest),
            "source_role" => opt_str(assoc.source_role.as_ref()),
            "dest_role" => opt_str(assoc.dest_role.as_ref()),
            "source_multiplicity" => multiplicity_value(assoc.source_multiplicity),
            "dest_multiplicity" => multiplicity_value(assoc.dest_multiplicity),
            "is_to_many" => Value::from(assoc.is_to_many()),
            "package" => package_value(model, assoc.package),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&[
            "name",
            "source",
            "dest",
            "source_role",
            "dest_role",
            "source_multiplicity",
            "dest_multiplicity",
            "is_to_many",
            "package",
        ])
    }
}

// ============================================================================
// TEST CASE INSTANCE
// ============================================================================

#[derive(Debug)]
pub struct InstanceObject {
    model: Arc<Model>,
    case: TestCase,
}

impl Object for InstanceObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let value = match key.as_str()? {
            "name" => Value::from(&*self.case.name),
            "cls" => class_value(&self.model, self.case.classifier),
            "values" => {
                let values: IndexMap<&str, &LiteralValue> = self
                    .case
                    .slots
                    .iter()
                    .map(|slot| (&*slot.attribute, &slot.value))
                    .collect();
                Value::from_serialize(&values)
            }
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&["name", "cls", "values"])
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.case.name)
    }
}
