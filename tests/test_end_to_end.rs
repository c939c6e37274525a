//! End-to-end runs of the shop recipe under `tests/fixtures/shop`.
//!
//! Every test loads the recipe from the fixture directory and redirects
//! output into a temporary directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;
use walkdir::WalkDir;
use xmigen::generate::{Filter, RuleSpec, TemplateRule};
use xmigen::{Recipe, RunOutcome, XmiError, pipeline};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shop")
}

fn recipe(out: &TempDir) -> Recipe {
    let mut recipe = Recipe::load(fixture_dir()).unwrap();
    recipe.output_folder = Some(out.path().to_path_buf());
    recipe
}

/// Relative path -> contents of every file under `dir`.
fn snapshot(dir: &Path) -> BTreeMap<String, String> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(dir).unwrap().to_string_lossy().replace('\\', "/");
            (rel, fs::read_to_string(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn test_generates_every_level_and_fixture() {
    let out = TempDir::new().unwrap();
    let report = pipeline::run(&recipe(&out)).unwrap();

    assert_eq!(report.outcome, RunOutcome::Generated);
    let files = snapshot(out.path());
    let names: Vec<&str> = files.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        [
            "fixtures/customer/alice.json",
            "fixtures/line_item/item1.json",
            "fixtures/line_item/item2.json",
            "fixtures/order/order1.json",
            "shop/__init__.py",
            "shop/catalog/__init__.py",
            "shop/catalog/product.py",
            "shop/sales/__init__.py",
            "shop/sales/customer.py",
            "shop/sales/line_item.py",
            "shop/sales/order.py",
            "shop/sales/order_status.py",
            "shop/sales/relations/Order_Customer.txt",
            "shop/sales/relations/Order_LineItem.txt",
        ]
    );
    assert_eq!(report.written.len(), files.len());
}

#[test]
fn test_rendered_class_navigates_model() {
    let out = TempDir::new().unwrap();
    pipeline::run(&recipe(&out)).unwrap();
    let files = snapshot(out.path());

    let order = &files["shop/sales/order.py"];
    assert!(order.starts_with("class Order:"));
    assert!(order.contains(r#"__domain__ = "retail""#));
    assert!(order.contains(r#"__key__ = "id""#));
    assert!(order.contains("status: OrderStatus"));
    assert!(order.contains("total: Decimal"));
    assert!(order.contains("items: list[LineItem]"));
    assert!(order.contains("customer: Customer"));

    let product = &files["shop/catalog/product.py"];
    assert!(product.starts_with("class Product(Entity):"));
    assert!(product.contains(r#"__key__ = "id""#));

    assert!(!files["shop/sales/line_item.py"].contains("__key__"));
    assert!(files["shop/sales/order_status.py"].contains(r#"SHIPPED = "shipped""#));
    assert_eq!(files["shop/sales/relations/Order_LineItem.txt"], "Order 1..1 -> LineItem 0..*");
    assert_eq!(files["shop/sales/relations/Order_Customer.txt"], "Order 0..* -> Customer 1..1");
}

#[test]
fn test_findings_are_reported_not_fatal() {
    let out = TempDir::new().unwrap();
    let report = pipeline::run(&recipe(&out)).unwrap();

    let findings: Vec<String> = report.findings.iter().map(ToString::to_string).collect();
    assert_eq!(
        findings,
        [
            "Class error: shop/sales/LineItem | no primary key",
            "Attribute error: shop/sales/Customer.is_deleted | is_deleted is a reserved attribute name",
        ]
    );
}

#[test]
fn test_to_many_fixture_is_a_list_in_link_order() {
    let out = TempDir::new().unwrap();
    pipeline::run(&recipe(&out)).unwrap();

    let text = fs::read_to_string(out.path().join("fixtures/order/order1.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        doc,
        json!({
            "id": 1,
            "status": "open",
            "total": 19.99,
            "LineItem": [
                {"sku": "A-1", "quantity": 2},
                {"sku": "B-2", "quantity": 1}
            ],
            "Customer": {"id": 7, "name": "Alice"}
        })
    );
    assert!(text.starts_with("{\n  \"id\": 1,"));
}

#[test]
fn test_generation_is_idempotent() {
    let out = TempDir::new().unwrap();
    let recipe = recipe(&out);

    pipeline::run(&recipe).unwrap();
    let first = snapshot(out.path());
    pipeline::run(&recipe).unwrap();
    let second = snapshot(out.path());

    assert_eq!(first, second);
}

#[rstest]
#[case::class(TemplateRule::Class(RuleSpec::new("class.py.j2", "{{ cls.name }}.py")))]
#[case::enumeration(TemplateRule::Enumeration(RuleSpec::new("enum.py.j2", "{{ enum.name }}.py")))]
#[case::package(TemplateRule::Package(RuleSpec::new("package.py.j2", "{{ package.path }}x.py")))]
fn test_false_filter_produces_nothing(#[case] rule: TemplateRule) {
    let out = TempDir::new().unwrap();
    let mut recipe = recipe(&out);
    let rule = match rule {
        TemplateRule::Class(spec) => TemplateRule::Class(spec.with_filter(Filter::template("False"))),
        TemplateRule::Enumeration(spec) => {
            TemplateRule::Enumeration(spec.with_filter(Filter::template("False")))
        }
        TemplateRule::Package(spec) => TemplateRule::Package(spec.with_filter(Filter::template("False"))),
        other => other,
    };
    recipe.templates = vec![rule];
    recipe.test_templates.clear();

    let report = pipeline::run(&recipe).unwrap();

    assert_eq!(report.outcome, RunOutcome::Generated);
    assert!(report.written.is_empty());
    assert!(snapshot(out.path()).is_empty());
}

#[test]
fn test_strict_recipe_gates_generation() {
    let out = TempDir::new().unwrap();
    let mut recipe = recipe(&out);
    recipe.strict = true;

    let report = pipeline::run(&recipe).unwrap();

    assert_eq!(report.outcome, RunOutcome::Gated);
    assert_eq!(report.findings.len(), 2);
    assert!(snapshot(out.path()).is_empty());
}

#[test]
fn test_missing_root_package_ends_gracefully() {
    let out = TempDir::new().unwrap();
    let mut recipe = recipe(&out);
    recipe.root_package = "warehouse".to_string();

    let report = pipeline::run(&recipe).unwrap();

    assert_eq!(report.outcome, RunOutcome::RootPackageNotFound);
    assert!(report.findings.is_empty());
    assert!(snapshot(out.path()).is_empty());
}

#[rstest]
#[case::wrong_version(r#"xmi:version="2.1""#, r#"xmi:version="2.5""#, "XMI version must be 2.1")]
#[case::no_version(r#"xmi:version="2.1""#, "", "No XMI version specified")]
#[case::no_model("uml:Model", "uml:Diagram", "Could not find model, UML version must be 2.1")]
fn test_bad_header_is_format_error(#[case] from: &str, #[case] to: &str, #[case] expected: &str) {
    let out = TempDir::new().unwrap();
    let text = fs::read_to_string(fixture_dir().join("shop.xmi"))
        .unwrap()
        .replace(from, to);
    let source = out.path().join("broken.xmi");
    fs::write(&source, text).unwrap();
    let mut recipe = recipe(&out);
    recipe.source = source;

    match pipeline::run(&recipe) {
        Err(XmiError::Format(message)) => assert_eq!(message, expected),
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn test_missing_source_is_io_error() {
    let out = TempDir::new().unwrap();
    let mut recipe = recipe(&out);
    recipe.source = out.path().join("absent.xmi");

    assert!(matches!(pipeline::run(&recipe), Err(XmiError::Io { .. })));
}

#[test]
fn test_run_dir_resolves_paths_against_recipe() {
    let recipe = Recipe::load(fixture_dir()).unwrap();
    assert_eq!(recipe.source, fixture_dir().join("shop.xmi"));
    assert_eq!(recipe.templates_folder, fixture_dir().join("templates"));
    assert_eq!(recipe.templates.len(), 4);
    assert!(recipe.types.contains("decimal"));
}
