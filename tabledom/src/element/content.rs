use super::Element;

/// What an element holds between its tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Content {
    #[default]
    Empty,
    Text(String),
    Children(Vec<Element>),
}

impl Content {
    /// Wrap children, collapsing an empty list to `Empty`.
    pub fn from_children(children: Vec<Element>) -> Self {
        if children.is_empty() {
            Content::Empty
        } else {
            Content::Children(children)
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Content::Children(children) => children,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Content::Empty => true,
            Content::Text(text) => text.is_empty(),
            Content::Children(children) => children.is_empty(),
        }
    }
}
