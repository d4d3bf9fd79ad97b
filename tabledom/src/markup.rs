//! Lenient parsing of server-rendered XHTML fragments.
//!
//! Fragments are read with `quick-xml`: every element must be closed (or
//! self-closed), `data-*` attributes land in [`Element::data`], `class` is
//! split into [`Element::classes`], and the `hidden`, `disabled` and
//! `checked` boolean attributes map onto element state. Comments,
//! declarations and processing instructions are skipped.

use std::borrow::Cow;

use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::element::{Content, Element};
use crate::error::MarkupError;

/// Parse a fragment into its top-level elements.
///
/// # Example
///
/// ```
/// use tabledom::markup::parse_fragment;
///
/// let roots = parse_fragment(r#"<tbody id="users-body"><tr data-id="7"><td>Ada</td></tr></tbody>"#).unwrap();
/// assert_eq!(roots[0].id, "users-body");
/// assert_eq!(roots[0].child_elements()[0].data_value("id"), Some("7"));
/// ```
pub fn parse_fragment(markup: &str) -> Result<Vec<Element>, MarkupError> {
    let mut reader = Reader::from_str(markup);
    let mut stack: Vec<(Element, Vec<Element>)> = Vec::new();
    let mut roots = Vec::new();
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| MarkupError::Syntax {
            position: reader.error_position(),
            message: e.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                flush_text(&mut text, &mut stack, &mut roots);
                let element = element_from_start(&start, reader.buffer_position())?;
                stack.push((element, Vec::new()));
            }
            Event::Empty(start) => {
                flush_text(&mut text, &mut stack, &mut roots);
                let element = element_from_start(&start, reader.buffer_position())?;
                attach(element, &mut stack, &mut roots);
            }
            Event::End(end) => {
                flush_text(&mut text, &mut stack, &mut roots);
                let Some((mut element, children)) = stack.pop() else {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    return Err(MarkupError::UnexpectedClose(name));
                };
                element.content = collapse(children);
                attach(element, &mut stack, &mut roots);
            }
            Event::Text(chunk) => text.push_str(&String::from_utf8_lossy(&chunk)),
            Event::GeneralRef(reference) => {
                text.push('&');
                text.push_str(&String::from_utf8_lossy(&reference));
                text.push(';');
            }
            Event::CData(data) => {
                text.push_str(&escape_raw(&String::from_utf8_lossy(&data)));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some((element, _)) = stack.pop() {
        return Err(MarkupError::Unclosed(element.tag));
    }
    flush_text(&mut text, &mut stack, &mut roots);

    Ok(roots)
}

/// Parse a fragment and return the first element with the given ID.
pub fn find_in_fragment(markup: &str, id: &str) -> Result<Option<Element>, MarkupError> {
    let roots = parse_fragment(markup)?;
    Ok(roots
        .iter()
        .find_map(|root| crate::element::find_element(root, id))
        .cloned())
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<Element, MarkupError> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    let mut element = Element::new(tag);

    for attr in start.html_attributes() {
        let attr = attr.map_err(|e| MarkupError::Syntax {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = decode_entities(&raw).into_owned();

        match key.as_str() {
            "id" => element.id = value,
            "class" => {
                element.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "hidden" => element.hidden = true,
            "disabled" => element.disabled = true,
            "checked" => element.checked = true,
            _ => {
                if let Some(name) = key.strip_prefix("data-") {
                    element.data.insert(name.to_string(), value);
                } else {
                    element.attrs.insert(key, value);
                }
            }
        }
    }

    Ok(element)
}

fn attach(element: Element, stack: &mut [(Element, Vec<Element>)], roots: &mut Vec<Element>) {
    match stack.last_mut() {
        Some((_, children)) => children.push(element),
        None => roots.push(element),
    }
}

fn flush_text(text: &mut String, stack: &mut [(Element, Vec<Element>)], roots: &mut Vec<Element>) {
    if text.trim().is_empty() {
        text.clear();
        return;
    }
    let decoded = decode_entities(text.trim()).into_owned();
    text.clear();
    // Top-level text has no element to hang on.
    if !stack.is_empty() {
        attach(Element::text(decoded), stack, roots);
    }
}

/// A lone text child collapses into `Content::Text`.
fn collapse(mut children: Vec<Element>) -> Content {
    if children.len() == 1 && children[0].is_text() {
        let only = children.remove(0);
        return only.content;
    }
    Content::from_children(children)
}

fn decode_entities(raw: &str) -> Cow<'_, str> {
    match unescape_with(raw, resolve_entity) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("Keeping undecodable text verbatim: {e}");
            Cow::Borrowed(raw)
        }
    }
}

fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        "nbsp" => Some("\u{a0}"),
        _ => None,
    }
}

// CDATA is literal; re-escape ampersands so the shared decode pass leaves it intact.
fn escape_raw(raw: &str) -> String {
    raw.replace('&', "&amp;")
}
