mod content;
mod node;

pub use content::Content;
pub use node::{Element, TEXT_TAG};
pub(crate) use node::{next_generation, restamp};

/// Find an element by ID in the tree.
pub fn find_element<'a>(root: &'a Element, id: &str) -> Option<&'a Element> {
    if root.id == id {
        return Some(root);
    }

    if let Content::Children(children) = &root.content {
        for child in children {
            if let Some(found) = find_element(child, id) {
                return Some(found);
            }
        }
    }

    None
}

/// Find an element by ID, mutably.
pub fn find_element_mut<'a>(root: &'a mut Element, id: &str) -> Option<&'a mut Element> {
    if root.id == id {
        return Some(root);
    }

    if let Content::Children(children) = &mut root.content {
        for child in children {
            if let Some(found) = find_element_mut(child, id) {
                return Some(found);
            }
        }
    }

    None
}

/// Path of `(id, generation)` pairs from `id` up to `root`, target first.
pub fn ancestor_path(root: &Element, id: &str) -> Option<Vec<(String, u64)>> {
    let mut path = Vec::new();
    if build_path(root, id, &mut path) {
        path.reverse();
        Some(path)
    } else {
        None
    }
}

fn build_path(element: &Element, id: &str, path: &mut Vec<(String, u64)>) -> bool {
    path.push((element.id.clone(), element.generation()));
    if element.id == id {
        return true;
    }
    for child in element.child_elements() {
        if build_path(child, id, path) {
            return true;
        }
    }
    path.pop();
    false
}

/// Collect every element in the subtree matching `predicate`, in document order.
pub fn collect<'a>(root: &'a Element, predicate: &dyn Fn(&Element) -> bool) -> Vec<&'a Element> {
    let mut found = Vec::new();
    collect_into(root, predicate, &mut found);
    found
}

fn collect_into<'a>(
    element: &'a Element,
    predicate: &dyn Fn(&Element) -> bool,
    found: &mut Vec<&'a Element>,
) {
    if predicate(element) {
        found.push(element);
    }
    for child in element.child_elements() {
        collect_into(child, predicate, found);
    }
}

/// Apply `f` to every element in the subtree matching `predicate`.
pub fn for_each_mut(
    root: &mut Element,
    predicate: &dyn Fn(&Element) -> bool,
    f: &mut dyn FnMut(&mut Element),
) {
    if predicate(root) {
        f(root);
    }
    if let Content::Children(children) = &mut root.content {
        for child in children {
            for_each_mut(child, predicate, f);
        }
    }
}
