//! Rules over test-case instances.

use std::sync::Arc;

use indexmap::IndexMap;

use super::diagnostics::{InstanceProblem, ValidationError, ValidationReport};
use crate::base::{AssociationId, InstanceId};
use crate::model::{LiteralValue, Model, TestCase, TestCases};

pub(crate) fn check_cases(model: &Model, cases: &TestCases, report: &mut ValidationReport) {
    for case in cases.iter() {
        check_case(model, cases, case, report);
    }
}

fn check_case(model: &Model, cases: &TestCases, case: &TestCase, report: &mut ValidationReport) {
    let class = model.class(case.classifier);
    let instance_error = |problem| ValidationError::Instance {
        instance: Arc::clone(&case.name),
        class: Arc::clone(&class.name),
        problem,
    };

    if class.is_abstract {
        report.add(instance_error(InstanceProblem::AbstractClassifier));
    }

    for slot in &case.slots {
        let declared = model.is_kind_of(case.classifier, slot.owner)
            .then(|| model.class(slot.owner).attribute(&slot.attribute))
            .flatten();
        let Some(attr) = declared else {
            report.add(instance_error(InstanceProblem::ForeignAttribute(Arc::clone(
                &slot.attribute,
            ))));
            continue;
        };
        let Some(enumeration) = attr.classification.map(|e| model.enumeration(e)) else {
            continue;
        };
        let is_literal = match &slot.value {
            LiteralValue::Null => true,
            LiteralValue::String(s) => enumeration.has_literal(s),
            _ => false,
        };
        if !is_literal {
            report.add(instance_error(InstanceProblem::NotALiteral {
                attribute: Arc::clone(&attr.name),
                value: display_value(&slot.value),
                enumeration: Arc::clone(&enumeration.name),
            }));
        }
    }

    let mut to_one: IndexMap<AssociationId, usize> = IndexMap::new();
    for link in &case.links {
        if !model.association(link.association).is_to_many() {
            *to_one.entry(link.association).or_default() += 1;
        }
    }
    for (association, count) in to_one {
        if count > 1 {
            let dest = model.association(association).dest;
            report.add(instance_error(InstanceProblem::MultipleToOneLinks {
                dest: Arc::clone(&model.class(dest).name),
                count,
            }));
        }
    }

    if let Some(cycle) = cycle_through(cases, case.id) {
        let path = cycle
            .into_iter()
            .map(|id| cases.get(id).name.to_string())
            .collect();
        report.add(instance_error(InstanceProblem::ReferenceCycle(path)));
    }
}

fn display_value(value: &LiteralValue) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_json().to_string(), str::to_string)
}

/// A link path from `start` back to itself, `start` at both ends.
fn cycle_through(cases: &TestCases, start: InstanceId) -> Option<Vec<InstanceId>> {
    let mut visited = vec![false; cases.len()];
    let mut path = vec![start];
    if walk(cases, start, start, &mut visited, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn walk(
    cases: &TestCases,
    start: InstanceId,
    current: InstanceId,
    visited: &mut [bool],
    path: &mut Vec<InstanceId>,
) -> bool {
    for link in cases.associations_from(current) {
        if link.target == start {
            path.push(start);
            return true;
        }
        if visited[link.target.index()] {
            continue;
        }
        visited[link.target.index()] = true;
        path.push(link.target);
        if walk(cases, start, link.target, visited, path) {
            return true;
        }
        path.pop();
    }
    false
}
