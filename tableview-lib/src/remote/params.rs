//! Request parameters for server-rendered tables.

use url::Url;

use crate::model::Direction;
use crate::model::Pagination;
use crate::model::Sort;
use crate::model::TableView;
use crate::model::ViewDelta;
use crate::query::FilterList;
use crate::query::clamp_page;

/// Parameter names owned by the table on request and address URLs.
pub const PARAM_NAMES: [&str; 8] = [
    "page", "size", "cursor", "curdir", "search", "sort", "dir", "filters",
];

/// Which neighbour a cursor token points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirection {
    Next,
    Prev,
}

impl CursorDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            CursorDirection::Next => "next",
            CursorDirection::Prev => "prev",
        }
    }
}

/// The position part of a request. Offset and cursor fields never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Offset {
        page: u32,
    },
    /// `cursor: None` asks for the first page.
    Cursor {
        cursor: Option<(String, CursorDirection)>,
    },
}

/// Everything a render request carries.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub position: PageRequest,
    pub size: u32,
    pub search: String,
    pub sort: Option<Sort>,
    pub filters: FilterList,
}

impl RequestParams {
    /// Parameters reproducing the view as it is.
    ///
    /// Cursor-mode tables have no addressable current page, so this asks
    /// for the first one.
    pub fn from_view(view: &TableView) -> Self {
        let position = match &view.pagination {
            Pagination::Offset { page } => PageRequest::Offset { page: *page },
            Pagination::Cursor { .. } => PageRequest::Cursor { cursor: None },
        };
        Self {
            position,
            size: view.page_size,
            search: view.search.clone(),
            sort: view.sort.clone(),
            filters: view.filters.clone(),
        }
    }

    /// Parameters for the view after `delta`, leaving the view untouched.
    ///
    /// Returns `None` when the delta is not possible, such as moving
    /// past the last cursor page.
    pub fn for_delta(view: &TableView, delta: &ViewDelta) -> Option<Self> {
        match (&view.pagination, delta) {
            (Pagination::Cursor { tokens, has_next, .. }, ViewDelta::NextPage) => {
                let token = tokens.next.clone().filter(|_| *has_next)?;
                let mut params = Self::from_view(view);
                params.position = PageRequest::Cursor {
                    cursor: Some((token, CursorDirection::Next)),
                };
                Some(params)
            }
            (Pagination::Cursor { tokens, has_prev, .. }, ViewDelta::PrevPage) => {
                let token = tokens.prev.clone().filter(|_| *has_prev)?;
                let mut params = Self::from_view(view);
                params.position = PageRequest::Cursor {
                    cursor: Some((token, CursorDirection::Prev)),
                };
                Some(params)
            }
            (Pagination::Cursor { .. }, ViewDelta::GoToPage(_)) => None,
            (Pagination::Offset { page }, ViewDelta::PrevPage) if *page <= 1 => None,
            _ => {
                let mut projected = view.clone();
                projected.apply(delta);
                // The server total is known after the first response.
                if let Pagination::Offset { page } = &mut projected.pagination
                    && view.total_rows > 0
                {
                    *page = clamp_page(*page, view.total_rows, projected.page_size);
                }
                Some(Self::from_view(&projected))
            }
        }
    }

    /// Query pairs with default values omitted.
    pub fn query_pairs(&self, default_size: u32) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        match &self.position {
            PageRequest::Offset { page } => {
                if *page > 1 {
                    pairs.push(("page", page.to_string()));
                }
            }
            PageRequest::Cursor { cursor } => {
                if let Some((token, direction)) = cursor {
                    pairs.push(("cursor", token.clone()));
                    pairs.push(("curdir", direction.as_str().to_string()));
                }
            }
        }
        if self.size != default_size {
            pairs.push(("size", self.size.to_string()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.column.clone()));
            if sort.direction != Direction::Asc {
                pairs.push(("dir", sort.direction.as_str().to_string()));
            }
        }
        if let Some(filters) = self.filters.encode() {
            pairs.push(("filters", filters));
        }
        pairs
    }

    /// `base` with the table's parameters replaced by these ones.
    ///
    /// Unrelated query parameters on `base` are kept.
    pub fn apply_to(&self, base: &Url, default_size: u32) -> Url {
        let mut url = base.clone();
        let kept: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(k, _)| !PARAM_NAMES.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let ours = self.query_pairs(default_size);

        if kept.is_empty() && ours.is_empty() {
            url.set_query(None);
            return url;
        }
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (k, v) in &kept {
                query.append_pair(k, v);
            }
            for (k, v) in &ours {
                query.append_pair(k, v);
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationMode;
    use crate::config::RemoteEndpoints;
    use crate::config::TableConfig;
    use crate::model::CursorTokens;
    use crate::query::FilterCondition;
    use crate::query::Operator;

    fn offset_view() -> TableView {
        TableView::new(
            &TableConfig::remote("t", RemoteEndpoints::new("/t")),
            25,
        )
    }

    fn cursor_view() -> TableView {
        let config = TableConfig::remote("t", RemoteEndpoints::new("/t"))
            .with_pagination(PaginationMode::Cursor);
        let mut view = TableView::new(&config, 25);
        view.pagination = Pagination::Cursor {
            tokens: CursorTokens {
                next: Some("n1".to_string()),
                prev: None,
            },
            has_next: true,
            has_prev: false,
        };
        view
    }

    fn pairs(params: &RequestParams) -> Vec<(&'static str, String)> {
        params.query_pairs(25)
    }

    #[test]
    fn test_defaults_omitted() {
        let params = RequestParams::from_view(&offset_view());
        assert!(pairs(&params).is_empty());
    }

    #[test]
    fn test_offset_delta() {
        let mut view = offset_view();
        view.search = "ada".to_string();
        let params = RequestParams::for_delta(&view, &ViewDelta::GoToPage(3)).unwrap();
        assert_eq!(
            pairs(&params),
            vec![("page", "3".to_string()), ("search", "ada".to_string())]
        );
        // The view itself is untouched.
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_sort_and_filters() {
        let view = offset_view();
        let params =
            RequestParams::for_delta(&view, &ViewDelta::Sort(Sort::desc("email"))).unwrap();
        assert_eq!(
            pairs(&params),
            vec![("sort", "email".to_string()), ("dir", "desc".to_string())]
        );

        let mut filters = FilterList::new();
        filters.push(FilterCondition::new("role", Operator::Equals, "admin"));
        let params = RequestParams::for_delta(&view, &ViewDelta::Filters(filters.clone())).unwrap();
        assert_eq!(pairs(&params), vec![("filters", filters.encode().unwrap())]);

        let mut view = offset_view();
        view.filters = filters;
        let params = RequestParams::for_delta(&view, &ViewDelta::ClearFilters).unwrap();
        assert!(pairs(&params).iter().all(|(key, _)| *key != "filters"));
    }

    #[test]
    fn test_offset_clamped_to_known_total() {
        let mut view = offset_view();
        view.total_rows = 60;
        let params = RequestParams::for_delta(&view, &ViewDelta::GoToPage(9)).unwrap();
        assert_eq!(params.position, PageRequest::Offset { page: 3 });
    }

    #[test]
    fn test_cursor_next() {
        let view = cursor_view();
        let params = RequestParams::for_delta(&view, &ViewDelta::NextPage).unwrap();
        assert_eq!(
            pairs(&params),
            vec![("cursor", "n1".to_string()), ("curdir", "next".to_string())]
        );
        assert!(pairs(&params).iter().all(|(k, _)| *k != "page"));
        assert!(RequestParams::for_delta(&view, &ViewDelta::PrevPage).is_none());
        assert!(RequestParams::for_delta(&view, &ViewDelta::GoToPage(2)).is_none());
    }

    #[test]
    fn test_cursor_shape_change_restarts() {
        let view = cursor_view();
        let params =
            RequestParams::for_delta(&view, &ViewDelta::Search("x".to_string())).unwrap();
        assert_eq!(params.position, PageRequest::Cursor { cursor: None });
    }

    #[test]
    fn test_apply_to_keeps_unrelated_params() {
        let base = Url::parse("https://app.test/users?tab=active&page=4&size=50").unwrap();
        let mut view = offset_view();
        view.page_size = 50;
        let url = RequestParams::from_view(&view).apply_to(&base, 25);
        assert_eq!(url.as_str(), "https://app.test/users?tab=active&size=50");

        let clean = RequestParams::from_view(&offset_view()).apply_to(
            &Url::parse("https://app.test/users?page=2").unwrap(),
            25,
        );
        assert_eq!(clean.as_str(), "https://app.test/users");
    }
}
