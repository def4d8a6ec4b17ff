//! Generic XML → JSON conversion for operator inspection.

use roxmltree::{Document, Node};
use serde_json::{Map, Value};

use crate::error::{DocumentLevel, ExtractError};

/// Convert a whole XML document into a JSON tree keyed by the root tag.
///
/// Attributes become string entries, repeated child tags become arrays, and a
/// childless element becomes its trimmed text (text wins over attributes).
pub fn document_tree(xml: &str) -> Result<Value, ExtractError> {
    let doc = Document::parse(xml).map_err(|e| ExtractError::Parse {
        level: DocumentLevel::Outer,
        message: e.to_string(),
    })?;
    let root = doc.root_element();
    let mut out = Map::new();
    out.insert(root.tag_name().name().to_string(), element_value(root));
    Ok(Value::Object(out))
}

fn element_value(node: Node<'_, '_>) -> Value {
    let children: Vec<Node<'_, '_>> = node.children().filter(|c| c.is_element()).collect();
    if children.is_empty() {
        let text = node.text().map(str::trim).unwrap_or_default();
        return Value::String(text.to_string());
    }

    let mut map = Map::new();
    for attr in node.attributes() {
        map.insert(attr.name().to_string(), Value::String(attr.value().to_string()));
    }
    for child in children {
        let tag = child.tag_name().name().to_string();
        let value = element_value(child);
        match map.get_mut(&tag) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(tag, value);
            }
        }
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_and_repeated_elements() {
        let xml = r#"<Report version="2"><Data>
            <SLOPE><Pos>1</Pos></SLOPE>
            <SLOPE><Pos>2</Pos></SLOPE>
            <Name> beam </Name>
        </Data></Report>"#;
        let tree = document_tree(xml).unwrap();
        assert_eq!(
            tree,
            json!({
                "Report": {
                    "version": "2",
                    "Data": {
                        "SLOPE": [{"Pos": "1"}, {"Pos": "2"}],
                        "Name": "beam"
                    }
                }
            })
        );
    }

    #[test]
    fn escaped_payload_stays_text() {
        let xml = "<Report><Data>&lt;OUTPUT/&gt;</Data></Report>";
        let tree = document_tree(xml).unwrap();
        assert_eq!(tree["Report"]["Data"], json!("<OUTPUT/>"));
    }

    #[test]
    fn malformed_input_is_parse_error() {
        assert!(matches!(
            document_tree("<a><b></a>"),
            Err(ExtractError::Parse { .. })
        ));
    }
}
