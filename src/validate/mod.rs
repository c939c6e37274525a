//! Structural validation of a parsed model.
//!
//! Validation is read-only and exhaustive: every rule runs over every class
//! (recursively through child packages) and every test-case instance, and
//! all findings are returned. Nothing here aborts; whether findings gate
//! generation is up to the caller.

mod cases;
mod classes;
mod diagnostics;

pub use classes::{AUTO_INCREMENT_TYPE, RESERVED_ATTRIBUTE};
pub use diagnostics::{
    AttributeProblem, ClassProblem, FindingKind, InstanceProblem, ValidationError,
    ValidationReport,
};

use crate::base::PackageId;
use crate::model::{Model, TestCases};
use crate::project::TypeSettings;

/// Check every class under `package` against the structural rules.
pub fn validate(model: &Model, package: PackageId, types: &TypeSettings) -> Vec<ValidationError> {
    let mut report = ValidationReport::new();
    classes::check_package(model, package, types, &mut report);
    report.into_findings()
}

/// Check test-case instances against the classes they instantiate.
pub fn validate_test_cases(model: &Model, cases: &TestCases) -> Vec<ValidationError> {
    let mut report = ValidationReport::new();
    cases::check_cases(model, cases, &mut report);
    report.into_findings()
}

/// Run both passes into one report.
pub fn validate_all(
    model: &Model,
    package: PackageId,
    cases: &TestCases,
    types: &TypeSettings,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    classes::check_package(model, package, types, &mut report);
    cases::check_cases(model, cases, &mut report);
    report
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::base::ClassId;
    use crate::model::{Attribute, InstanceLink, LiteralValue, Multiplicity, Slot, Upper};

    fn types() -> TypeSettings {
        ["int", "string", "decimal"].into_iter().collect()
    }

    fn id(name: &str) -> Attribute {
        let mut attr = Attribute::new(name, "int");
        attr.is_id = true;
        attr
    }

    fn domain_class(model: &mut Model, package: PackageId, name: &str) -> ClassId {
        let class = model.add_class(package, name);
        model.class_mut(class).domain = Some("retail".into());
        class
    }

    fn messages(findings: &[ValidationError]) -> Vec<String> {
        findings.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_auto_increment_id_is_valid() {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let order = domain_class(&mut model, pkg, "Order");
        let mut attr = id("id");
        attr.stereotype = Some("auto".into());
        model.push_attribute(order, attr);

        assert!(validate(&model, pkg, &types()).is_empty());
    }

    #[test]
    fn test_class_without_key_has_one_finding() {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let sales = model.add_package("sales", Some(pkg));
        let item = domain_class(&mut model, sales, "LineItem");
        model.push_attribute(item, Attribute::new("sku", "string"));

        assert_eq!(
            messages(&validate(&model, pkg, &types())),
            ["Class error: shop/sales/LineItem | no primary key"]
        );
    }

    #[rstest]
    #[case("int")]
    #[case("string")]
    #[case("money")]
    fn test_reserved_name_reported_once_whatever_the_type(#[case] type_name: &str) {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let order = domain_class(&mut model, pkg, "Order");
        model.push_attribute(order, id("id"));
        model.push_attribute(order, Attribute::new("is_deleted", type_name));

        let reserved = validate(&model, pkg, &types())
            .into_iter()
            .filter(|f| {
                matches!(
                    f,
                    ValidationError::Attribute {
                        problem: AttributeProblem::ReservedName,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(reserved, 1);
    }

    #[test]
    fn test_missing_domain() {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let order = model.add_class(pkg, "Order");
        model.push_attribute(order, id("id"));

        assert_eq!(
            messages(&validate(&model, pkg, &types())),
            ["Class error: shop/Order | Class does not belong to a domain"]
        );
    }

    #[rstest]
    #[case::inherits_key(false, false, &[])]
    #[case::redefines_key(true, false, &["To allow polymorphism the primary key must be defined in only the supertype"])]
    #[case::abstract_without_key(false, true, &[])]
    #[case::abstract_redefines_key(true, true, &["To allow polymorphism the primary key must be defined in only the supertype"])]
    fn test_supertype_key_rules(
        #[case] own_key: bool,
        #[case] is_abstract: bool,
        #[case] expected: &[&str],
    ) {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let root = domain_class(&mut model, pkg, "Entity");
        model.class_mut(root).is_abstract = true;
        model.push_attribute(root, id("id"));
        let middle = domain_class(&mut model, pkg, "Document");
        model.class_mut(middle).supertype = Some(root);
        model.class_mut(middle).is_abstract = true;
        let leaf = domain_class(&mut model, pkg, "Invoice");
        model.class_mut(leaf).supertype = Some(middle);
        model.class_mut(leaf).is_abstract = is_abstract;
        if own_key {
            model.push_attribute(leaf, id("invoice_id"));
        }

        let found: Vec<String> = validate(&model, pkg, &types())
            .iter()
            .map(ValidationError::message)
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_attribute_rules() {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let order = domain_class(&mut model, pkg, "Order");
        model.push_attribute(order, id("id"));
        let mut number = id("number");
        number.type_name = "string".into();
        number.stereotype = Some("auto".into());
        model.push_attribute(order, number);
        model.push_attribute(order, Attribute::new("total", "money"));
        let status = model.add_enumeration(pkg, "Status");
        let mut state = Attribute::new("state", "Status");
        state.classification = Some(status);
        model.push_attribute(order, state);

        assert_eq!(
            messages(&validate(&model, pkg, &types())),
            [
                "Attribute error: shop/Order.number | auto increment field must be int",
                "Attribute error: shop/Order.number | multiple ID attributes detected",
                "Attribute error: shop/Order.total | unknown type: money",
            ]
        );
    }

    #[test]
    fn test_circular_generalization_is_reported_not_looped() {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let a = domain_class(&mut model, pkg, "A");
        let b = domain_class(&mut model, pkg, "B");
        model.class_mut(a).supertype = Some(b);
        model.class_mut(b).supertype = Some(a);

        let findings = validate(&model, pkg, &types());
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.message() == "circular generalization"));
    }

    #[test]
    fn test_case_rules() {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let entity = domain_class(&mut model, pkg, "Entity");
        model.class_mut(entity).is_abstract = true;
        let order = domain_class(&mut model, pkg, "Order");
        let customer = domain_class(&mut model, pkg, "Customer");
        let status = model.add_enumeration(pkg, "Status");
        model.enumeration_mut(status).literals.push("open".into());
        let mut state = Attribute::new("state", "Status");
        state.classification = Some(status);
        model.push_attribute(order, state);
        let buyer = model.add_association(
            pkg,
            order,
            customer,
            Multiplicity::new(0, Upper::Unbounded),
            Multiplicity::one(),
        );

        let mut cases = TestCases::new();
        cases.add("thing", entity);
        let order1 = cases.add("order1", order);
        let alice = cases.add("alice", customer);
        let bob = cases.add("bob", customer);
        let case = cases.get_mut(order1);
        case.slots.push(Slot {
            owner: order,
            attribute: "state".into(),
            value: LiteralValue::String("shipped".into()),
        });
        case.slots.push(Slot {
            owner: customer,
            attribute: "name".into(),
            value: LiteralValue::String("x".into()),
        });
        case.links.push(InstanceLink { association: buyer, target: alice });
        case.links.push(InstanceLink { association: buyer, target: bob });

        assert_eq!(
            messages(&validate_test_cases(&model, &cases)),
            [
                "Instance error: thing (Entity) | abstract class cannot be instantiated",
                "Instance error: order1 (Order) | value shipped of state is not a literal of Status",
                "Instance error: order1 (Order) | attribute name is not declared by the class",
                "Instance error: order1 (Order) | 2 instances linked through to-one association to Customer",
            ]
        );
    }

    #[test]
    fn test_instance_reference_cycle() {
        let mut model = Model::new();
        let pkg = model.add_package("shop", None);
        let order = domain_class(&mut model, pkg, "Order");
        let item = domain_class(&mut model, pkg, "LineItem");
        let items = model.add_association(pkg, order, item, Multiplicity::one(), Multiplicity::new(0, Upper::Unbounded));
        let back = model.add_association(pkg, item, order, Multiplicity::new(0, Upper::Unbounded), Multiplicity::one());

        let mut cases = TestCases::new();
        let order1 = cases.add("order1", order);
        let item1 = cases.add("item1", item);
        cases.get_mut(order1).links.push(InstanceLink { association: items, target: item1 });
        cases.get_mut(item1).links.push(InstanceLink { association: back, target: order1 });

        let report = validate_all(&model, pkg, &cases, &types());
        assert_eq!(report.count(FindingKind::Instance), 2);
        assert_eq!(
            report.findings().iter().find(|f| f.kind() == FindingKind::Instance).map(ToString::to_string),
            Some("Instance error: order1 (Order) | reference cycle: order1 -> item1 -> order1".to_string())
        );
    }
}
