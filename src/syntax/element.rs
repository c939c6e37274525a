//! Owned XML elements with resolved namespaces.

use std::sync::Arc;

/// The namespace an element or attribute name resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum XmlNs {
    /// Any XMI namespace (`http://schema.omg.org/spec/XMI/2.1`, ...).
    Xmi,
    /// Any UML namespace (`http://schema.omg.org/spec/UML/2.1`, ...).
    Uml,
    /// Some other declared namespace, kept by URI.
    Other(Arc<str>),
    /// No namespace.
    None,
}

impl XmlNs {
    /// Classify a namespace URI.
    pub fn from_uri(uri: &str) -> Self {
        if uri.contains("/XMI") {
            XmlNs::Xmi
        } else if uri.contains("/UML") {
            XmlNs::Uml
        } else {
            XmlNs::Other(Arc::from(uri))
        }
    }

    /// Classify an undeclared prefix by its conventional name.
    pub fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "xmi" => XmlNs::Xmi,
            "uml" => XmlNs::Uml,
            other => XmlNs::Other(Arc::from(other)),
        }
    }
}

/// An attribute with its resolved namespace.
#[derive(Clone, Debug)]
pub struct Attribute {
    pub ns: XmlNs,
    pub name: Arc<str>,
    pub value: String,
}

/// An XML element.
#[derive(Clone, Debug)]
pub struct Element {
    pub ns: XmlNs,
    /// Local name, without prefix.
    pub name: Arc<str>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Element>,
    /// Byte offset of the start tag in the document.
    pub offset: u64,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(ns: XmlNs, name: impl Into<Arc<str>>) -> Self {
        Self {
            ns,
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            offset: 0,
        }
    }

    /// Check the element's namespace and local name.
    pub fn is(&self, ns: &XmlNs, name: &str) -> bool {
        self.ns == *ns && &*self.name == name
    }

    /// Get an attribute that carries no namespace prefix.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attr_ns(&XmlNs::None, name)
    }

    /// Get an attribute in the XMI namespace.
    pub fn xmi_attr(&self, name: &str) -> Option<&str> {
        self.attr_ns(&XmlNs::Xmi, name)
    }

    fn attr_ns(&self, ns: &XmlNs, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.ns == *ns && &*a.name == name)
            .map(|a| a.value.as_str())
    }

    /// The element's `xmi:id`.
    pub fn xmi_id(&self) -> Option<&str> {
        self.xmi_attr("id")
    }

    /// The local part of the element's `xmi:type` (`uml:Class` -> `Class`).
    pub fn xmi_type(&self) -> Option<&str> {
        self.xmi_attr("type")
            .map(|t| t.rsplit_once(':').map_or(t, |(_, local)| local))
    }

    /// Resolve a reference held either as a plain attribute or as a child
    /// element carrying `xmi:idref`.
    ///
    /// `<generalization general="X"/>` and
    /// `<generalization><general xmi:idref="X"/></generalization>` both yield `X`.
    pub fn idref(&self, name: &str) -> Option<&str> {
        self.attr(name).or_else(|| {
            self.child(name)
                .and_then(|c| c.xmi_attr("idref").or_else(|| c.attr("idref")))
        })
    }

    /// All references held as a whitespace separated attribute list or as
    /// repeated children carrying `xmi:idref`.
    pub fn idrefs(&self, name: &str) -> Vec<&str> {
        if let Some(list) = self.attr(name) {
            return list.split_whitespace().collect();
        }
        self.children
            .iter()
            .filter(|c| &*c.name == name)
            .filter_map(|c| c.xmi_attr("idref").or_else(|| c.attr("idref")))
            .collect()
    }

    /// The first child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| &*c.name == name)
    }

    /// Children with the given local name, in document order.
    pub fn children_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| &*c.name == name)
    }

    /// Pre-order traversal of this element and everything below it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Document-order iterator over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_attr(mut el: Element, ns: XmlNs, name: &str, value: &str) -> Element {
        el.attributes.push(Attribute {
            ns,
            name: Arc::from(name),
            value: value.to_string(),
        });
        el
    }

    #[test]
    fn test_namespace_classification() {
        assert_eq!(XmlNs::from_uri("http://schema.omg.org/spec/XMI/2.1"), XmlNs::Xmi);
        assert_eq!(XmlNs::from_uri("http://www.omg.org/spec/UML/20131001"), XmlNs::Uml);
        assert_eq!(XmlNs::from_prefix("xmi"), XmlNs::Xmi);
        assert!(matches!(
            XmlNs::from_uri("http://www.sparxsystems.com/profiles/thecustomprofile/1.0"),
            XmlNs::Other(_)
        ));
    }

    #[test]
    fn test_xmi_type_local_part() {
        let el = with_attr(Element::new(XmlNs::None, "packagedElement"), XmlNs::Xmi, "type", "uml:Class");
        assert_eq!(el.xmi_type(), Some("Class"));
        assert_eq!(el.attr("type"), None);
    }

    #[test]
    fn test_idref_attribute_or_child() {
        let inline = with_attr(Element::new(XmlNs::None, "generalization"), XmlNs::None, "general", "C1");
        assert_eq!(inline.idref("general"), Some("C1"));

        let mut nested = Element::new(XmlNs::None, "generalization");
        nested.children.push(with_attr(Element::new(XmlNs::None, "general"), XmlNs::Xmi, "idref", "C2"));
        assert_eq!(nested.idref("general"), Some("C2"));
    }

    #[test]
    fn test_idrefs_list() {
        let el = with_attr(Element::new(XmlNs::None, "packagedElement"), XmlNs::None, "memberEnd", "a  b");
        assert_eq!(el.idrefs("memberEnd"), vec!["a", "b"]);
    }

    #[test]
    fn test_lookups_borrow_only_the_element() {
        let mut root = Element::new(XmlNs::None, "a");
        root.children.push(with_attr(Element::new(XmlNs::None, "end"), XmlNs::Xmi, "idref", "E1"));

        let (child, refs) = {
            let name = String::from("end");
            (root.child(&name), root.idrefs(&name))
        };
        assert_eq!(child.map(|c| &*c.name), Some("end"));
        assert_eq!(refs, vec!["E1"]);
    }

    #[test]
    fn test_descendants_document_order() {
        let mut root = Element::new(XmlNs::None, "a");
        let mut b = Element::new(XmlNs::None, "b");
        b.children.push(Element::new(XmlNs::None, "c"));
        root.children.push(b);
        root.children.push(Element::new(XmlNs::None, "d"));

        let names: Vec<_> = root.descendants().map(|e| e.name.to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }
}
