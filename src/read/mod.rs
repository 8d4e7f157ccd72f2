//! Reading the XML documents of an unpacked AOT archive.

pub mod namespaces;
pub mod obs_project;
pub mod sched_block;

use std::{path::Path, str::FromStr};

use roxmltree::Node;

use crate::{AotError, SchedBlockError};

/// Read a whole document into memory.
pub(crate) fn read_xml(file: &Path) -> Result<String, AotError> {
    std::fs::read_to_string(file).map_err(|source| AotError::Io {
        file: file.to_path_buf(),
        source,
    })
}

/// All child elements of `node` named `name` in namespace `ns`, in document
/// order.
pub(crate) fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &str,
    name: &str,
) -> Vec<Node<'a, 'input>> {
    node.children()
        .filter(|c| c.is_element() && c.has_tag_name((ns, name)))
        .collect()
}

/// The first child element of `node` named `name` in namespace `ns`.
pub(crate) fn first_child<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.has_tag_name((ns, name)))
}

pub(crate) fn required_child<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &str,
    name: &str,
) -> Result<Node<'a, 'input>, SchedBlockError> {
    first_child(node, ns, name).ok_or_else(|| SchedBlockError::MissingElement {
        parent: node.tag_name().name().to_string(),
        element: name.to_string(),
    })
}

pub(crate) fn required_attribute<'a>(
    node: Node<'a, '_>,
    attribute: &str,
) -> Result<&'a str, SchedBlockError> {
    node.attribute(attribute)
        .ok_or_else(|| SchedBlockError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

/// The element's text with surrounding whitespace removed; empty if it has
/// none.
pub(crate) fn element_text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().map(str::trim).unwrap_or("")
}

/// Parse the element's text as a number.
pub(crate) fn parse_element<T: FromStr>(node: Node) -> Result<T, SchedBlockError> {
    let text = element_text(node);
    text.parse().map_err(|_| SchedBlockError::BadNumber {
        element: node.tag_name().name().to_string(),
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;

    const XML: &str = r#"<a:root xmlns:a="urn:a" xmlns:b="urn:b">
  <a:item unit="GHz"> 1.5 </a:item>
  <b:item>other</b:item>
  <a:item>two</a:item>
  <a:count>3840</a:count>
</a:root>"#;

    #[test]
    fn test_children_are_namespace_qualified() {
        let doc = Document::parse(XML).unwrap();
        let root = doc.root_element();
        let items = child_elements(root, "urn:a", "item");
        assert_eq!(items.len(), 2);
        assert_eq!(element_text(items[1]), "two");
        assert_eq!(child_elements(root, "urn:b", "item").len(), 1);
        assert!(first_child(root, "urn:c", "item").is_none());
    }

    #[test]
    fn test_required_lookups() {
        let doc = Document::parse(XML).unwrap();
        let root = doc.root_element();
        let item = required_child(root, "urn:a", "item").unwrap();
        assert_eq!(required_attribute(item, "unit").unwrap(), "GHz");
        assert_eq!(parse_element::<f64>(item).unwrap(), 1.5);

        let count = required_child(root, "urn:a", "count").unwrap();
        assert_eq!(parse_element::<u32>(count).unwrap(), 3840);

        assert!(matches!(
            required_child(root, "urn:a", "missing"),
            Err(SchedBlockError::MissingElement { ref parent, ref element })
                if parent == "root" && element == "missing"
        ));
        assert!(matches!(
            required_attribute(count, "unit"),
            Err(SchedBlockError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_bad_number() {
        let doc = Document::parse(XML).unwrap();
        let items = child_elements(doc.root_element(), "urn:a", "item");
        assert!(matches!(
            parse_element::<f64>(items[1]),
            Err(SchedBlockError::BadNumber { ref text, .. }) if text == "two"
        ));
    }
}
