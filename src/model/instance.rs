//! Test-case instances used for fixture generation.

use std::sync::Arc;

use serde::Serialize;

use crate::base::{AssociationId, ClassId, InstanceId};

/// A literal slot value of a test-case instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(Arc<str>),
}

impl LiteralValue {
    /// The value as text, if it is a string (enumeration literals are strings).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            LiteralValue::Null => serde_json::Value::Null,
            LiteralValue::Boolean(b) => serde_json::Value::Bool(*b),
            LiteralValue::Integer(i) => serde_json::Value::from(*i),
            LiteralValue::Real(r) => serde_json::Value::from(*r),
            LiteralValue::String(s) => serde_json::Value::String(s.to_string()),
        }
    }
}

/// A concrete attribute value bound on an instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    /// The class that declares the attribute.
    pub owner: ClassId,
    pub attribute: Arc<str>,
    pub value: LiteralValue,
}

/// An outgoing association link from one instance to another.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InstanceLink {
    pub association: AssociationId,
    pub target: InstanceId,
}

/// A concrete instantiation of a class.
#[derive(Clone, Debug)]
pub struct TestCase {
    pub id: InstanceId,
    pub xmi_id: Option<Arc<str>>,
    pub name: Arc<str>,
    pub classifier: ClassId,
    /// Attribute values in declaration order.
    pub slots: Vec<Slot>,
    /// Outgoing links in declaration order.
    pub links: Vec<InstanceLink>,
}

impl TestCase {
    pub fn value(&self, attribute: &str) -> Option<&LiteralValue> {
        self.slots
            .iter()
            .find(|s| &*s.attribute == attribute)
            .map(|s| &s.value)
    }
}

/// Arena of test-case instances parsed from one document.
#[derive(Clone, Debug, Default)]
pub struct TestCases {
    cases: Vec<TestCase>,
}

impl TestCases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance of `classifier` with no slots or links yet.
    pub fn add(&mut self, name: impl Into<Arc<str>>, classifier: ClassId) -> InstanceId {
        let id = InstanceId::from_index(self.cases.len());
        self.cases.push(TestCase {
            id,
            xmi_id: None,
            name: name.into(),
            classifier,
            slots: Vec::new(),
            links: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: InstanceId) -> &TestCase {
        &self.cases[id.index()]
    }

    pub fn get_mut(&mut self, id: InstanceId) -> &mut TestCase {
        &mut self.cases[id.index()]
    }

    /// Outgoing links of an instance, in declaration order.
    pub fn associations_from(&self, id: InstanceId) -> &[InstanceLink] {
        &self.get(id).links
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_value_json() {
        assert_eq!(LiteralValue::Integer(3).to_json(), serde_json::json!(3));
        assert_eq!(LiteralValue::Boolean(true).to_json(), serde_json::json!(true));
        assert_eq!(LiteralValue::Null.to_json(), serde_json::Value::Null);
        assert_eq!(
            serde_json::to_string(&LiteralValue::String(Arc::from("open"))).unwrap(),
            "\"open\""
        );
    }

    #[test]
    fn test_links_keep_declaration_order() {
        let mut cases = TestCases::new();
        let order = cases.add("order1", ClassId::new(0));
        let first = cases.add("item1", ClassId::new(1));
        let second = cases.add("item2", ClassId::new(1));
        for target in [first, second] {
            cases.get_mut(order).links.push(InstanceLink {
                association: AssociationId::new(0),
                target,
            });
        }

        let targets: Vec<_> = cases.associations_from(order).iter().map(|l| l.target).collect();
        assert_eq!(targets, vec![first, second]);
        assert_eq!(cases.len(), 3);
    }
}
