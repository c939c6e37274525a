//! Namespace-aware XML element tree.
//!
//! The XMI document is read once with quick-xml's `NsReader` into a small
//! owned tree of [`Element`]s. Element and attribute names are resolved to
//! an [`XmlNs`] so the parser can ask for "the XMI `id` attribute" or "the
//! UML `Model` element" without caring which prefixes or URIs an exporter
//! chose.

mod element;
mod reader;

pub use element::{Attribute, Descendants, Element, XmlNs};
pub use reader::Document;
