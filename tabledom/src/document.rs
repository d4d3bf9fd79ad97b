use crate::element::{self, restamp, Content, Element};
use crate::error::DomError;
use crate::markup::parse_fragment;

/// An element tree plus a queue of "content replaced" notifications.
///
/// External swaps go through [`Document::replace_element`] and
/// [`Document::replace_children`]; both give the incoming subtree fresh
/// generations and record the affected ID so that interested engines can
/// drain [`Document::take_replaced`] and re-bind. Projection writes made by
/// the owner itself (`set_children`, `with_element`) are silent.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
    replaced: Vec<String>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            root,
            replaced: Vec::new(),
        }
    }

    /// Parse markup with a single root element.
    pub fn parse(markup: &str) -> Result<Self, DomError> {
        let mut roots = parse_fragment(markup)?;
        let root = if roots.len() == 1 {
            roots.remove(0)
        } else {
            Element::new("body").id("document").children(roots)
        };
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        element::find_element(&self.root, id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        element::find_element_mut(&mut self.root, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn generation(&self, id: &str) -> Option<u64> {
        self.get(id).map(Element::generation)
    }

    /// `(id, generation)` from `id` up to the root, target first.
    pub fn ancestors(&self, id: &str) -> Option<Vec<(String, u64)>> {
        element::ancestor_path(&self.root, id)
    }

    /// Run `f` on the element if present. Returns whether it was found.
    pub fn with_element(&mut self, id: &str, f: impl FnOnce(&mut Element)) -> bool {
        match self.get_mut(id) {
            Some(element) => {
                f(element);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // External replacement
    // =========================================================================

    /// Swap the element with `id` for `replacement` (outer replacement).
    pub fn replace_element(&mut self, id: &str, mut replacement: Element) -> Result<(), DomError> {
        if self.root.id == id {
            return Err(DomError::RootReplacement);
        }
        let target = self
            .get_mut(id)
            .ok_or_else(|| DomError::NotFound(id.to_string()))?;
        restamp(&mut replacement);
        let new_id = replacement.id.clone();
        *target = replacement;

        log::debug!("Replaced element {id}");
        self.notify(id);
        if new_id != id {
            self.notify(&new_id);
        }
        Ok(())
    }

    /// Swap the children of `id` (inner replacement). The container keeps
    /// its generation, the incoming children get fresh ones.
    pub fn replace_children(&mut self, id: &str, mut children: Vec<Element>) -> Result<(), DomError> {
        let target = self
            .get_mut(id)
            .ok_or_else(|| DomError::NotFound(id.to_string()))?;
        for child in &mut children {
            restamp(child);
        }
        target.content = Content::from_children(children);

        log::debug!("Replaced children of {id}");
        self.notify(id);
        Ok(())
    }

    /// Parse `markup` and swap it in as the children of `id`.
    pub fn replace_inner_markup(&mut self, id: &str, markup: &str) -> Result<(), DomError> {
        let children = parse_fragment(markup)?;
        self.replace_children(id, children)
    }

    /// Drain the IDs whose content was replaced since the last call.
    pub fn take_replaced(&mut self) -> Vec<String> {
        std::mem::take(&mut self.replaced)
    }

    fn notify(&mut self, id: &str) {
        if !self.replaced.iter().any(|r| r == id) {
            self.replaced.push(id.to_string());
        }
    }

    // =========================================================================
    // Owner projection
    // =========================================================================

    /// Set children without a replacement notification.
    pub fn set_children(&mut self, id: &str, children: Vec<Element>) -> bool {
        self.with_element(id, |element| {
            element.content = Content::from_children(children);
        })
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        self.with_element(id, |element| element.set_text(text))
    }

    pub fn set_hidden(&mut self, id: &str, hidden: bool) -> bool {
        self.with_element(id, |element| element.hidden = hidden)
    }

    pub fn set_disabled(&mut self, id: &str, disabled: bool) -> bool {
        self.with_element(id, |element| element.disabled = disabled)
    }

    pub fn set_data(&mut self, id: &str, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.with_element(id, |element| {
            element.data.insert(key.to_string(), value);
        })
    }

    pub fn set_class(&mut self, id: &str, class: &str, on: bool) -> bool {
        self.with_element(id, |element| element.set_class(class, on))
    }

    /// Reorder the children of `id` so that those whose IDs appear in
    /// `order` come first, in that order. Others keep their relative order
    /// after them.
    pub fn reorder_children(&mut self, id: &str, order: &[String]) -> bool {
        self.with_element(id, |element| {
            let Content::Children(children) = &mut element.content else {
                return;
            };
            let mut remaining = std::mem::take(children);
            let mut sorted = Vec::with_capacity(remaining.len());
            for wanted in order {
                if let Some(pos) = remaining.iter().position(|c| &c.id == wanted) {
                    sorted.push(remaining.remove(pos));
                }
            }
            sorted.append(&mut remaining);
            *children = sorted;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(
            Element::div().id("root").child(
                Element::div()
                    .id("card")
                    .child(Element::new("tbody").id("body").child(Element::new("tr").id("r1")))
                    .child(Element::div().id("footer")),
            ),
        )
    }

    #[test]
    fn test_replace_element_bumps_generation() {
        let mut doc = sample();
        let before = doc.generation("footer").unwrap();
        doc.replace_element("footer", Element::div().id("footer")).unwrap();
        assert_ne!(doc.generation("footer").unwrap(), before);
        assert_eq!(doc.take_replaced(), vec!["footer".to_string()]);
        assert!(doc.take_replaced().is_empty());
    }

    #[test]
    fn test_replace_children_keeps_container_generation() {
        let mut doc = sample();
        let body = doc.generation("body").unwrap();
        doc.replace_inner_markup("body", "<tr id=\"r2\"/>").unwrap();
        assert_eq!(doc.generation("body"), Some(body));
        assert!(doc.contains("r2"));
        assert!(!doc.contains("r1"));
    }

    #[test]
    fn test_replace_missing_is_error() {
        let mut doc = sample();
        assert!(matches!(
            doc.replace_element("nope", Element::div()),
            Err(DomError::NotFound(_))
        ));
        assert!(matches!(
            doc.replace_element("root", Element::div()),
            Err(DomError::RootReplacement)
        ));
    }

    #[test]
    fn test_projection_is_silent() {
        let mut doc = sample();
        doc.set_children("body", vec![Element::new("tr").id("r9")]);
        doc.set_text("footer", "1 to 1");
        assert!(doc.take_replaced().is_empty());
    }

    #[test]
    fn test_reorder_children() {
        let mut doc = Document::new(
            Element::div()
                .id("list")
                .child(Element::div().id("a"))
                .child(Element::div().id("b"))
                .child(Element::div().id("c")),
        );
        doc.reorder_children("list", &["c".to_string(), "a".to_string()]);
        let ids: Vec<_> = doc.root().child_elements().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_ancestors() {
        let doc = sample();
        let path: Vec<_> = doc.ancestors("r1").unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(path, vec!["r1", "body", "card", "root"]);
    }
}
