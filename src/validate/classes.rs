//! Structural rules over the package tree.

use std::sync::Arc;

use super::diagnostics::{AttributeProblem, ClassProblem, ValidationError, ValidationReport};
use crate::base::{ClassId, PackageId};
use crate::model::Model;
use crate::project::TypeSettings;

/// Attribute name generated code uses for soft deletes.
pub const RESERVED_ATTRIBUTE: &str = "is_deleted";

/// Type an auto-increment attribute must have.
pub const AUTO_INCREMENT_TYPE: &str = "int";

pub(crate) fn check_package(
    model: &Model,
    package: PackageId,
    types: &TypeSettings,
    report: &mut ValidationReport,
) {
    let pkg = model.package(package);
    for &class in &pkg.classes {
        check_class(model, class, types, report);
    }
    for &child in &pkg.children {
        check_package(model, child, types, report);
    }
}

fn check_class(model: &Model, id: ClassId, types: &TypeSettings, report: &mut ValidationReport) {
    let class = model.class(id);
    let path = &model.package(class.package).path;
    let class_error = |problem| ValidationError::Class {
        path: Arc::clone(path),
        class: Arc::clone(&class.name),
        problem,
    };

    if class.domain.is_none() {
        report.add(class_error(ClassProblem::NoDomain));
    }

    if model.has_circular_generalization(id) {
        report.add(class_error(ClassProblem::CircularGeneralization));
    } else {
        let inherited = class.supertype.and_then(|s| model.primary_key(s));
        match (class.id_attribute(), inherited) {
            (None, None) if !class.is_abstract => {
                report.add(class_error(ClassProblem::NoPrimaryKey));
            }
            (Some(_), Some(_)) => report.add(class_error(ClassProblem::PolymorphicKey)),
            _ => {}
        }
    }

    let mut has_id = false;
    for attr in &class.attributes {
        let attribute_error = |problem| ValidationError::Attribute {
            path: Arc::clone(path),
            class: Arc::clone(&class.name),
            attribute: Arc::clone(&attr.name),
            problem,
        };

        if attr.is_auto_increment() && &*attr.type_name != AUTO_INCREMENT_TYPE {
            report.add(attribute_error(AttributeProblem::AutoIncrementNotInt));
        }
        if attr.classification.is_none() && !types.contains(&attr.type_name) {
            report.add(attribute_error(AttributeProblem::UnknownType(Arc::clone(
                &attr.type_name,
            ))));
        }
        if attr.is_id {
            if has_id {
                report.add(attribute_error(AttributeProblem::MultipleIds));
            }
            has_id = true;
        }
        if &*attr.name == RESERVED_ATTRIBUTE {
            report.add(attribute_error(AttributeProblem::ReservedName));
        }
    }
}
