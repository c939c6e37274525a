//! Test-case instances from `InstanceSpecification`s.
//!
//! An instance specification classified by a class is a test-case
//! instance; its slots carry literal values or, for association ends,
//! links to other instances. One classified by an association is a
//! standalone link between two instances.

use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::lower::{End, Lowering};
use crate::base::{AssociationId, InstanceId};
use crate::error::{Result, XmiError};
use crate::model::{InstanceLink, LiteralValue, Slot, TestCases};
use crate::syntax::Element;

/// Where each pending instance specification lands, in document order.
enum Pending<'e> {
    Instance(InstanceId, &'e Element),
    Link(&'e Element),
}

pub(crate) fn build(lowering: &Lowering<'_>) -> Result<TestCases> {
    let mut cases = TestCases::new();
    let mut by_xmi: FxHashMap<&str, InstanceId> = FxHashMap::default();
    let mut pending: Vec<Pending<'_>> = Vec::new();

    for &element in &lowering.pending_instances {
        let Some(classifier) = element.idref("classifier") else {
            debug!(name = ?element.attr("name"), "skipping unclassified instance");
            continue;
        };
        if lowering.associations.contains_key(classifier) {
            pending.push(Pending::Link(element));
            continue;
        }
        let class = lowering
            .classes
            .get(classifier)
            .copied()
            .ok_or_else(|| XmiError::lookup("instance classifier", classifier))?;
        let name = element
            .attr("name")
            .or_else(|| element.xmi_id())
            .unwrap_or_default();
        let id = cases.add(name, class);
        cases.get_mut(id).xmi_id = element.xmi_id().map(Arc::from);
        if let Some(xmi_id) = element.xmi_id() {
            by_xmi.insert(xmi_id, id);
        }
        pending.push(Pending::Instance(id, element));
    }

    let target = |slot: &Element| -> Result<Option<InstanceId>> {
        let Some(value) = slot.child("value") else {
            return Ok(None);
        };
        let Some(id) = value.idref("instance") else {
            return Ok(None);
        };
        by_xmi
            .get(id)
            .copied()
            .map(Some)
            .ok_or_else(|| XmiError::lookup("linked instance", id))
    };

    // Targets may be declared after the instance linking to them, so links
    // resolve in a second walk over the same document order.
    for entry in pending {
        let (id, element) = match entry {
            Pending::Link(element) => {
                if let Some((source, link)) = standalone_link(lowering, element, &target)? {
                    cases.get_mut(source).links.push(link);
                }
                continue;
            }
            Pending::Instance(id, element) => (id, element),
        };

        for slot in element.children_named("slot") {
            let Some(feature) = slot.idref("definingFeature") else {
                debug!(instance = ?element.attr("name"), "skipping slot without defining feature");
                continue;
            };

            if let Some(&(association, end)) = lowering.ends.get(feature) {
                let Some(other) = target(slot)? else {
                    continue;
                };
                let (source, link) = match end {
                    End::Dest => (id, InstanceLink { association, target: other }),
                    End::Source => (other, InstanceLink { association, target: id }),
                };
                cases.get_mut(source).links.push(link);
                continue;
            }

            let (owner, attribute) = lowering
                .attributes
                .get(feature)
                .cloned()
                .ok_or_else(|| XmiError::lookup("slot feature", feature))?;
            let value = literal(lowering, slot.child("value"));
            cases.get_mut(id).slots.push(Slot {
                owner,
                attribute,
                value,
            });
        }
    }
    Ok(cases)
}

/// A link classified by an association: the dest-end slot names the target,
/// the other slot the source.
fn standalone_link(
    lowering: &Lowering<'_>,
    element: &Element,
    target: &dyn Fn(&Element) -> Result<Option<InstanceId>>,
) -> Result<Option<(InstanceId, InstanceLink)>> {
    let mut association: Option<AssociationId> = None;
    let mut source = None;
    let mut dest = None;

    for slot in element.children_named("slot") {
        let Some(&(assoc, end)) = slot
            .idref("definingFeature")
            .and_then(|f| lowering.ends.get(f))
        else {
            continue;
        };
        association = Some(assoc);
        match end {
            End::Source => source = target(slot)?,
            End::Dest => dest = target(slot)?,
        }
    }

    match (association, source, dest) {
        (Some(association), Some(source), Some(dest)) => Ok(Some((
            source,
            InstanceLink {
                association,
                target: dest,
            },
        ))),
        _ => {
            debug!(name = ?element.attr("name"), "skipping incomplete link");
            Ok(None)
        }
    }
}

/// The literal a slot value holds. A missing or unrecognised value is null;
/// a numeric literal without a value is zero.
fn literal(lowering: &Lowering<'_>, value: Option<&Element>) -> LiteralValue {
    let Some(value) = value else {
        return LiteralValue::Null;
    };
    let text = value.attr("value");
    match value.xmi_type() {
        Some("LiteralInteger") => number(text, 0, LiteralValue::Integer),
        Some("LiteralUnlimitedNatural") => match text {
            Some("*" | "-1") => LiteralValue::String(Arc::from("*")),
            other => number(other, 0, LiteralValue::Integer),
        },
        Some("LiteralReal") => number(text, 0.0, LiteralValue::Real),
        Some("LiteralBoolean") => LiteralValue::Boolean(text == Some("true")),
        Some("LiteralString") => LiteralValue::String(Arc::from(text.unwrap_or_default())),
        Some("InstanceValue") => value
            .idref("instance")
            .and_then(|id| lowering.index.get(id))
            .filter(|e| e.xmi_type() == Some("EnumerationLiteral"))
            .and_then(|e| e.attr("name"))
            .map_or(LiteralValue::Null, |name| LiteralValue::String(Arc::from(name))),
        _ => LiteralValue::Null,
    }
}

/// A malformed number is kept as its text rather than coerced.
fn number<T: FromStr>(text: Option<&str>, zero: T, wrap: fn(T) -> LiteralValue) -> LiteralValue {
    let Some(raw) = text else {
        return wrap(zero);
    };
    match raw.trim().parse() {
        Ok(value) => wrap(value),
        Err(_) => {
            warn!(value = raw, "malformed numeric literal, keeping its text");
            LiteralValue::String(Arc::from(raw))
        }
    }
}
