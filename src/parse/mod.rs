//! XMI 2.1 -> [`Model`] + [`TestCases`].
//!
//! Parsing checks the document header, locates the configured root
//! package anywhere in the document, and lowers that subtree:
//!
//! 1. [`IdIndex`](index::IdIndex) and [`Annotations`](index::Annotations)
//!    are built over the whole document, since types, stereotypes and tags
//!    may live outside the root package.
//! 2. The root package subtree is lowered into a [`Model`] (see `lower`).
//! 3. Instance specifications found while lowering become [`TestCases`].
//!
//! Package, class and attribute order follow document order.

mod index;
mod instances;
mod lower;

use tracing::{debug, info};

use crate::error::{Result, XmiError};
use crate::model::{Model, TestCases};
use crate::syntax::{Document, Element, XmlNs};

/// The only supported `xmi:version`.
pub const XMI_VERSION: &str = "2.1";

/// Parse XMI text and lower the package named `root_package`.
pub fn parse(text: &str, root_package: &str) -> Result<(Model, TestCases)> {
    let document = Document::parse(text)?;
    parse_document(&document, root_package)
}

/// Lower the package named `root_package` from an already parsed document.
pub fn parse_document(document: &Document, root_package: &str) -> Result<(Model, TestCases)> {
    let root = document.root();
    check_header(root)?;

    let package = find_root_package(root, root_package)
        .ok_or_else(|| XmiError::RootPackageNotFound(root_package.to_string()))?;

    let index = index::IdIndex::build(root);
    let annotations = index::Annotations::collect(root);
    debug!(ids = index.len(), "indexed document");

    let mut lowering = lower::Lowering::new(&index, &annotations);
    lowering.lower(package)?;
    let cases = instances::build(&lowering)?;
    let model = lowering.model;

    info!(
        package = root_package,
        classes = model.classes().count(),
        enumerations = model.enumerations().count(),
        associations = model.associations().count(),
        test_cases = cases.len(),
        "parsed model"
    );
    Ok((model, cases))
}

/// Require `xmi:version="2.1"` on the root and a `uml:Model` child.
fn check_header(root: &Element) -> Result<()> {
    match root.xmi_attr("version") {
        None => return Err(XmiError::format("No XMI version specified")),
        Some(version) if version != XMI_VERSION => {
            return Err(XmiError::format("XMI version must be 2.1"));
        }
        Some(_) => {}
    }
    if !root.children.iter().any(|c| c.is(&XmlNs::Uml, "Model")) {
        return Err(XmiError::format(
            "Could not find model, UML version must be 2.1",
        ));
    }
    Ok(())
}

/// The first `packagedElement` in document order with the given name.
fn find_root_package<'a>(root: &'a Element, name: &str) -> Option<&'a Element> {
    root.descendants()
        .find(|e| &*e.name == "packagedElement" && e.attr("name") == Some(name))
}
