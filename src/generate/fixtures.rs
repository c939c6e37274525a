//! Test-case fixture serialization.
//!
//! A test-case instance serializes to a JSON object holding its slot
//! values, plus one entry per outgoing link keyed by the association's
//! dest class name. To-many links (dest upper bound `*`) accumulate into
//! a list in link order; to-one links hold a single nested object, the
//! last link winning.

use serde_json::{Map, Value};

use crate::base::InstanceId;
use crate::error::{Result, XmiError};
use crate::model::{Model, TestCases};

/// Serialize an instance and everything it links to.
///
/// Fails with [`XmiError::Cycle`] when an instance is reached again while
/// it is still being serialized. Shared (diamond) references are fine.
pub fn serialize(model: &Model, cases: &TestCases, id: InstanceId) -> Result<Value> {
    let mut active = Vec::new();
    serialize_inner(model, cases, id, &mut active).map(Value::Object)
}

/// [`serialize`] rendered as 2-space indented JSON.
pub fn to_json_string(model: &Model, cases: &TestCases, id: InstanceId) -> Result<String> {
    Ok(serde_json::to_string_pretty(&serialize(model, cases, id)?)?)
}

fn serialize_inner(
    model: &Model,
    cases: &TestCases,
    id: InstanceId,
    active: &mut Vec<InstanceId>,
) -> Result<Map<String, Value>> {
    if active.contains(&id) {
        let mut path: Vec<String> = active
            .iter()
            .map(|&seen| cases.get(seen).name.to_string())
            .collect();
        path.push(cases.get(id).name.to_string());
        return Err(XmiError::Cycle { path });
    }
    active.push(id);

    let case = cases.get(id);
    let mut doc = Map::new();

    for slot in &case.slots {
        doc.insert(slot.attribute.to_string(), slot.value.to_json());
    }

    for link in cases.associations_from(id) {
        let assoc = model.association(link.association);
        let key = model.class(assoc.dest).name.to_string();
        let nested = Value::Object(serialize_inner(model, cases, link.target, active)?);

        if assoc.is_to_many() {
            match doc.get_mut(&key) {
                Some(Value::Array(items)) => items.push(nested),
                _ => {
                    doc.insert(key, Value::Array(vec![nested]));
                }
            }
        } else {
            doc.insert(key, nested);
        }
    }

    active.pop();
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::base::{AssociationId, ClassId};
    use crate::model::{InstanceLink, LiteralValue, Multiplicity, Slot, Upper};

    struct Shop {
        model: Model,
        order: ClassId,
        item: ClassId,
        customer: ClassId,
        items: AssociationId,
        buyer: AssociationId,
    }

    fn shop() -> Shop {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let order = model.add_class(pkg, "Order");
        let item = model.add_class(pkg, "LineItem");
        let customer = model.add_class(pkg, "Customer");
        let items = model.add_association(
            pkg,
            order,
            item,
            Multiplicity::one(),
            Multiplicity::new(0, Upper::Unbounded),
        );
        let buyer = model.add_association(
            pkg,
            order,
            customer,
            Multiplicity::new(0, Upper::Unbounded),
            Multiplicity::one(),
        );
        Shop {
            model,
            order,
            item,
            customer,
            items,
            buyer,
        }
    }

    fn slot(owner: ClassId, name: &str, value: LiteralValue) -> Slot {
        Slot {
            owner,
            attribute: Arc::from(name),
            value,
        }
    }

    fn link(cases: &mut TestCases, from: InstanceId, association: AssociationId, target: InstanceId) {
        cases
            .get_mut(from)
            .links
            .push(InstanceLink { association, target });
    }

    #[test]
    fn test_to_many_links_become_ordered_list() {
        let shop = shop();
        let mut cases = TestCases::new();
        let order = cases.add("order1", shop.order);
        let first = cases.add("item1", shop.item);
        let second = cases.add("item2", shop.item);
        cases.get_mut(order).slots.push(slot(shop.order, "id", LiteralValue::Integer(1)));
        cases.get_mut(first).slots.push(slot(shop.item, "sku", LiteralValue::String(Arc::from("A"))));
        cases.get_mut(second).slots.push(slot(shop.item, "sku", LiteralValue::String(Arc::from("B"))));
        link(&mut cases, order, shop.items, first);
        link(&mut cases, order, shop.items, second);

        let doc = serialize(&shop.model, &cases, order).unwrap();

        assert_eq!(
            doc,
            json!({"id": 1, "LineItem": [{"sku": "A"}, {"sku": "B"}]})
        );
    }

    #[test]
    fn test_single_to_many_link_is_still_a_list() {
        let shop = shop();
        let mut cases = TestCases::new();
        let order = cases.add("order1", shop.order);
        let item = cases.add("item1", shop.item);
        link(&mut cases, order, shop.items, item);

        let doc = serialize(&shop.model, &cases, order).unwrap();
        assert_eq!(doc, json!({"LineItem": [{}]}));
    }

    #[test]
    fn test_to_one_link_is_nested_object_and_last_wins() {
        let shop = shop();
        let mut cases = TestCases::new();
        let order = cases.add("order1", shop.order);
        let alice = cases.add("alice", shop.customer);
        let bob = cases.add("bob", shop.customer);
        cases.get_mut(alice).slots.push(slot(shop.customer, "name", LiteralValue::String(Arc::from("Alice"))));
        cases.get_mut(bob).slots.push(slot(shop.customer, "name", LiteralValue::String(Arc::from("Bob"))));
        link(&mut cases, order, shop.buyer, alice);
        link(&mut cases, order, shop.buyer, bob);

        let doc = serialize(&shop.model, &cases, order).unwrap();
        assert_eq!(doc, json!({"Customer": {"name": "Bob"}}));
    }

    #[test]
    fn test_reference_cycle_fails_fast() {
        let mut shop = shop();
        let pkg = shop.model.root().unwrap();
        let back = shop.model.add_association(
            pkg,
            shop.item,
            shop.order,
            Multiplicity::new(0, Upper::Unbounded),
            Multiplicity::one(),
        );
        let mut cases = TestCases::new();
        let order = cases.add("order1", shop.order);
        let item = cases.add("item1", shop.item);
        link(&mut cases, order, shop.items, item);
        link(&mut cases, item, back, order);

        let err = serialize(&shop.model, &cases, order).unwrap_err();
        match err {
            XmiError::Cycle { path } => assert_eq!(path, vec!["order1", "item1", "order1"]),
            other => panic!("expected cycle error, got {other}"),
        }
    }

    #[test]
    fn test_shared_target_is_not_a_cycle() {
        let shop = shop();
        let mut cases = TestCases::new();
        let order = cases.add("order1", shop.order);
        let item = cases.add("item1", shop.item);
        link(&mut cases, order, shop.items, item);
        link(&mut cases, order, shop.items, item);

        let doc = serialize(&shop.model, &cases, order).unwrap();
        assert_eq!(doc["LineItem"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_json_is_two_space_indented() {
        let shop = shop();
        let mut cases = TestCases::new();
        let order = cases.add("order1", shop.order);
        cases.get_mut(order).slots.push(slot(shop.order, "id", LiteralValue::Integer(7)));

        let text = to_json_string(&shop.model, &cases, order).unwrap();
        assert_eq!(text, "{\n  \"id\": 7\n}");
    }
}
