use kuchiki::NodeRef;
use kuchiki::traits::*;

use crate::factory::ContainerOptions;

const FRAGMENT_WRAPPER_ID: &str = "__simple_components_wrapper";

/// Parse a full HTML page into a document tree.
///
/// html5ever normalizes the input, so the resulting document always carries
/// `<html>`, `<head>` and `<body>` elements even when the source omits them.
pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

/// The `<body>` element of a parsed document.
pub fn document_body(document: &NodeRef) -> Option<NodeRef> {
    document
        .select_first("body")
        .ok()
        .map(|body| body.as_node().clone())
}

/// Resolve a CSS selector against `scope`.
///
/// `Err(())` means the selector itself could not be parsed; `Ok(None)` means
/// it matched nothing.
pub fn query_selector(scope: &NodeRef, selector: &str) -> Result<Option<NodeRef>, ()> {
    let mut matches = scope.select(selector)?;
    Ok(matches.next().map(|element| element.as_node().clone()))
}

/// Create a detached element with the given tag name.
pub fn create_element(tag: &str) -> Result<NodeRef, ()> {
    let fragment = kuchiki::parse_html().one(format!("<{tag}></{tag}>"));
    let element = fragment.select_first(tag)?;
    let node = element.as_node().clone();
    node.detach();
    Ok(node)
}

/// Detach every child of `node`.
pub fn clear_children(node: &NodeRef) {
    let existing: Vec<_> = node.children().collect();
    for child in existing {
        child.detach();
    }
}

/// Replace the children of `node` with the parsed contents of `html`.
///
/// The fragment is parsed wrapped in a marker `<div>` to guarantee a valid
/// HTML structure, then the wrapper's children are moved under `node`. An
/// empty fragment simply clears the node.
pub fn set_inner_html(node: &NodeRef, html: &str) -> Result<(), ()> {
    clear_children(node);

    let wrapper_html = format!("<div id=\"{FRAGMENT_WRAPPER_ID}\">{html}</div>");
    let fragment_doc = kuchiki::parse_html().one(wrapper_html);
    let wrapper = fragment_doc.select_first(&format!("#{FRAGMENT_WRAPPER_ID}"))?;
    let children: Vec<_> = wrapper.as_node().children().collect();
    for child in children {
        node.append(child);
    }
    Ok(())
}

/// Apply the requested container attributes and style properties to `element`.
///
/// Attributes are set first, then style declarations are merged property by
/// property into the `style` attribute, so a `style` key in the attribute map
/// composes with the style map instead of being clobbered by it.
pub fn apply_container(element: &NodeRef, options: &ContainerOptions) {
    let Some(data) = element.as_element() else {
        return;
    };
    {
        let mut attributes = data.attributes.borrow_mut();
        for (name, value) in &options.attributes {
            attributes.insert(name.as_str(), value.clone());
        }
    }
    for (property, value) in &options.style {
        set_style_property(element, property, value);
    }
}

/// Reverse exactly what [`apply_container`] applied for the same options.
///
/// Attribute keys and style property names are re-derived from the options;
/// anything not named there is left untouched. Removing an attribute or
/// property that is already gone is a no-op.
pub fn remove_container(element: &NodeRef, options: &ContainerOptions) {
    let Some(data) = element.as_element() else {
        return;
    };
    {
        let mut attributes = data.attributes.borrow_mut();
        for name in options.attributes.keys() {
            attributes.remove(name.as_str());
        }
    }
    for property in options.style.keys() {
        remove_style_property(element, property);
    }
}

/// Set one declaration in the element's `style` attribute, preserving the
/// other declarations already present.
pub fn set_style_property(element: &NodeRef, property: &str, value: &str) {
    let Some(data) = element.as_element() else {
        return;
    };
    let mut attributes = data.attributes.borrow_mut();
    let mut declarations = attributes
        .get("style")
        .map(parse_style)
        .unwrap_or_default();
    match declarations.iter_mut().find(|(name, _)| name == property) {
        Some(declaration) => declaration.1 = value.to_string(),
        None => declarations.push((property.to_string(), value.to_string())),
    }
    attributes.insert("style", serialize_style(&declarations));
}

/// Remove one declaration from the element's `style` attribute. The attribute
/// itself is dropped once no declarations remain.
pub fn remove_style_property(element: &NodeRef, property: &str) {
    let Some(data) = element.as_element() else {
        return;
    };
    let mut attributes = data.attributes.borrow_mut();
    let Some(style) = attributes.get("style") else {
        return;
    };
    let declarations: Vec<_> = parse_style(style)
        .into_iter()
        .filter(|(name, _)| name != property)
        .collect();
    if declarations.is_empty() {
        attributes.remove("style");
    } else {
        attributes.insert("style", serialize_style(&declarations));
    }
}

/// Escape text for interpolation into an HTML fragment or attribute value.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn serialize_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn attribute(node: &NodeRef, name: &str) -> Option<String> {
        node.as_element()
            .and_then(|data| data.attributes.borrow().get(name).map(str::to_string))
    }

    #[test]
    fn parses_and_finds_body() {
        let document = parse_document("<html><body><p>hi</p></body></html>");
        let body = document_body(&document).expect("body");
        assert_eq!(body.children().count(), 1);
    }

    #[test]
    fn query_selector_distinguishes_no_match_from_bad_selector() {
        let document = parse_document("<html><body><div id=\"host\"></div></body></html>");
        assert!(query_selector(&document, "#host").unwrap().is_some());
        assert!(query_selector(&document, "#missing").unwrap().is_none());
        assert!(query_selector(&document, "###").is_err());
    }

    #[test]
    fn created_element_is_detached() {
        let element = create_element("div").unwrap();
        assert!(element.parent().is_none());
    }

    #[test]
    fn set_inner_html_replaces_children() {
        let document = parse_document("<html><body><div id=\"host\"><span>old</span></div></body></html>");
        let host = query_selector(&document, "#host").unwrap().unwrap();

        set_inner_html(&host, "<p class=\"fresh\">new</p><p>more</p>").unwrap();
        let serialized = document.to_string();
        assert!(serialized.contains("class=\"fresh\""));
        assert!(!serialized.contains("old"));
        assert_eq!(host.children().count(), 2);

        set_inner_html(&host, "").unwrap();
        assert_eq!(host.children().count(), 0);
    }

    #[test]
    fn style_properties_merge_and_remove_without_clobbering() {
        let document = parse_document("<html><body><div id=\"host\" style=\"color: red\"></div></body></html>");
        let host = query_selector(&document, "#host").unwrap().unwrap();

        set_style_property(&host, "position", "fixed");
        set_style_property(&host, "color", "blue");
        assert_eq!(attribute(&host, "style").unwrap(), "color: blue; position: fixed");

        remove_style_property(&host, "position");
        assert_eq!(attribute(&host, "style").unwrap(), "color: blue");

        remove_style_property(&host, "color");
        assert_eq!(attribute(&host, "style"), None);

        // Removing from an element with no style attribute must not panic.
        remove_style_property(&host, "color");
    }

    #[test]
    fn container_options_apply_and_reverse() {
        let document = parse_document(
            "<html><body><div id=\"host\" data-keep=\"yes\" style=\"margin: 0\"></div></body></html>",
        );
        let host = query_selector(&document, "#host").unwrap().unwrap();

        let options = ContainerOptions {
            attributes: BTreeMap::from([("data-x".to_string(), "1".to_string())]),
            style: BTreeMap::from([("position".to_string(), "fixed".to_string())]),
        };

        apply_container(&host, &options);
        assert_eq!(attribute(&host, "data-x").unwrap(), "1");
        assert_eq!(attribute(&host, "style").unwrap(), "margin: 0; position: fixed");

        remove_container(&host, &options);
        assert_eq!(attribute(&host, "data-x"), None);
        assert_eq!(attribute(&host, "data-keep").unwrap(), "yes");
        assert_eq!(attribute(&host, "style").unwrap(), "margin: 0");

        // A second reversal is a no-op.
        remove_container(&host, &options);
        assert_eq!(attribute(&host, "data-keep").unwrap(), "yes");
    }

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            escape_html("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }
}
