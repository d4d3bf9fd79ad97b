//! Interpreting server-rendered markup for a table.

use tabledom::Element;
use tabledom::element::find_element;
use tabledom::parse_fragment;

use super::PaginationMeta;
use crate::anchors::Anchors;
use crate::error::SyncError;

/// Body, footer and metadata fragments for an in-place update.
#[derive(Debug, Clone)]
pub struct TargetedPatch {
    /// New children of the table body.
    pub body: Option<Vec<Element>>,
    /// Replacement footer.
    pub footer: Option<Element>,
    pub meta: PaginationMeta,
}

/// A parsed render response.
#[derive(Debug, Clone)]
pub enum RenderResponse {
    /// Swap body and footer, adopt metadata.
    Patch(TargetedPatch),
    /// Replace the whole card.
    Full(Element),
}

impl RenderResponse {
    pub fn is_patch(&self) -> bool {
        matches!(self, RenderResponse::Patch(_))
    }
}

/// Parse markup returned for `anchors`' table.
///
/// Markup carrying `{id}-meta` is a targeted patch; otherwise it must carry
/// the `{id}-card` container.
pub fn parse_response(anchors: &Anchors, markup: &str) -> Result<RenderResponse, SyncError> {
    let roots = parse_fragment(markup)?;
    let find = |id: &str| roots.iter().find_map(|root| find_element(root, id));

    if let Some(meta) = find(&anchors.meta()) {
        let meta = PaginationMeta::from_element(meta);
        let body = find(&anchors.body()).map(|b| b.child_elements().to_vec());
        let footer = find(&anchors.footer()).cloned();
        return Ok(RenderResponse::Patch(TargetedPatch { body, footer, meta }));
    }

    if let Some(card) = find(&anchors.card()) {
        return Ok(RenderResponse::Full(card.clone()));
    }

    Err(SyncError::malformed(format!(
        "response for {} has neither {} nor {}",
        anchors.table(),
        anchors.meta(),
        anchors.card()
    )))
}

/// Parse markup that must be a full card.
pub fn parse_card(anchors: &Anchors, markup: &str) -> Result<Element, SyncError> {
    let roots = parse_fragment(markup)?;
    roots
        .iter()
        .find_map(|root| find_element(root, &anchors.card()))
        .cloned()
        .ok_or_else(|| SyncError::malformed(format!("response has no {}", anchors.card())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targeted_patch() {
        let anchors = Anchors::new("users");
        let response = parse_response(
            &anchors,
            r#"<tbody id="users-body"><tr data-id="1"/><tr data-id="2"/></tbody>
               <div id="users-footer"><span id="users-total">2</span></div>
               <div id="users-meta" data-current-page="1" data-total-rows="2"/>"#,
        )
        .unwrap();
        let RenderResponse::Patch(patch) = response else {
            panic!("expected a targeted patch");
        };
        assert_eq!(patch.body.map(|b| b.len()), Some(2));
        assert!(patch.footer.is_some());
        assert_eq!(patch.meta.total_rows, Some(2));
    }

    #[test]
    fn test_full_card() {
        let anchors = Anchors::new("users");
        let response = parse_response(
            &anchors,
            r#"<div id="users-card"><table id="users"><tbody id="users-body"/></table></div>"#,
        )
        .unwrap();
        assert!(!response.is_patch());
    }

    #[test]
    fn test_malformed() {
        let anchors = Anchors::new("users");
        assert!(matches!(
            parse_response(&anchors, "<div id=\"other\"/>"),
            Err(SyncError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response(&anchors, "<div id=\"users-meta\">"),
            Err(SyncError::Markup(_))
        ));
    }
}
