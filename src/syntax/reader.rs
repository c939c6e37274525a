//! Building an [`Element`] tree with quick-xml.

use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use super::element::{Attribute, Element, XmlNs};
use crate::base::LineIndex;
use crate::error::{Result, XmiError};

/// A parsed XML document.
#[derive(Clone, Debug)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Parse XML text into an element tree.
    ///
    /// Fails with [`XmiError::Format`] on malformed XML, reporting the
    /// 1-based line and column of the problem.
    pub fn parse(text: &str) -> Result<Self> {
        let lines = LineIndex::new(text);
        let mut reader = NsReader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let offset = reader.buffer_position() as u64;
            let (ns, event) = match reader.read_resolved_event() {
                Ok(pair) => pair,
                Err(err) => {
                    let at = lines.position(reader.error_position() as u64);
                    return Err(XmiError::format(format!("malformed XML at {at}: {err}")));
                }
            };
            let ns = resolve_ns(ns);

            match event {
                Event::Start(start) => {
                    let element = open_element(&reader, &lines, ns, &start, offset)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = open_element(&reader, &lines, ns, &start, offset)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        XmiError::format(format!(
                            "unbalanced end tag at {}",
                            lines.position(offset)
                        ))
                    })?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmiError::format(format!(
                "unclosed element <{}> at {}",
                open.name,
                lines.position(open.offset)
            )));
        }

        let root = root.ok_or_else(|| XmiError::format("Not a valid XMI: document has no root element"))?;
        Ok(Self { root })
    }

    /// The document element.
    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn resolve_ns(result: ResolveResult<'_>) -> XmlNs {
    match result {
        ResolveResult::Bound(ns) => XmlNs::from_uri(&String::from_utf8_lossy(ns.as_ref())),
        ResolveResult::Unknown(prefix) => XmlNs::from_prefix(&String::from_utf8_lossy(&prefix)),
        ResolveResult::Unbound => XmlNs::None,
    }
}

fn open_element(
    reader: &NsReader<&[u8]>,
    lines: &LineIndex,
    ns: XmlNs,
    start: &BytesStart<'_>,
    offset: u64,
) -> Result<Element> {
    let mut element = Element::new(ns, String::from_utf8_lossy(start.local_name().as_ref()).as_ref());
    element.offset = offset;

    for attr in start.attributes() {
        let attr = attr.map_err(|err| {
            XmiError::format(format!("bad attribute at {}: {err}", lines.position(offset)))
        })?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (attr_ns, local) = reader.resolve_attribute(attr.key);
        let attr_ns = resolve_ns(attr_ns);
        let value = attr.unescape_value().map_err(|err| {
            XmiError::format(format!("bad attribute value at {}: {err}", lines.position(offset)))
        })?;
        element.attributes.push(Attribute {
            ns: attr_ns,
            name: Arc::from(String::from_utf8_lossy(local.as_ref()).as_ref()),
            value: value.into_owned(),
        });
    }

    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
