//! Mirroring remote table state into the page address.

use url::Url;

use crate::model::Direction;
use crate::model::Sort;
use crate::query::FilterList;
use crate::remote::PARAM_NAMES;
use crate::remote::RequestParams;

/// The host's address bar.
///
/// Only replacement is needed; table navigation never adds history entries.
pub trait AddressBar: Send {
    fn location(&self) -> Url;

    fn replace(&mut self, url: Url);
}

/// In-memory [`AddressBar`] that counts replacements.
#[derive(Debug, Clone)]
pub struct MemoryAddressBar {
    current: Url,
    replacements: usize,
}

impl MemoryAddressBar {
    pub fn new(url: Url) -> Self {
        Self {
            current: url,
            replacements: 0,
        }
    }

    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Url::parse(url).map(Self::new)
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl AddressBar for MemoryAddressBar {
    fn location(&self) -> Url {
        self.current.clone()
    }

    fn replace(&mut self, url: Url) {
        self.current = url;
        self.replacements += 1;
    }
}

/// The address mirroring `params`: the current path plus non-default values.
pub fn address_for(location: &Url, params: &RequestParams, default_size: u32) -> Url {
    params.apply_to(location, default_size)
}

/// Table state recovered from an address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressState {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<Sort>,
    pub filters: FilterList,
}

impl AddressState {
    pub fn is_empty(&self) -> bool {
        self.page.is_none()
            && self.size.is_none()
            && self.search.is_none()
            && self.sort.is_none()
            && self.filters.is_empty()
    }
}

/// Read table parameters from an address. Invalid values are ignored.
pub fn restore(location: &Url) -> AddressState {
    let mut state = AddressState::default();
    let mut direction = Direction::Asc;
    for (key, value) in location.query_pairs() {
        if !PARAM_NAMES.contains(&key.as_ref()) {
            continue;
        }
        match key.as_ref() {
            "page" => state.page = value.parse().ok().filter(|&p| p > 0),
            "size" => state.size = value.parse().ok().filter(|&s| s > 0),
            "search" if !value.trim().is_empty() => state.search = Some(value.into_owned()),
            "sort" if !value.is_empty() => state.sort = Some(Sort::asc(value.into_owned())),
            "dir" => direction = Direction::parse(&value).unwrap_or_default(),
            "filters" => state.filters = FilterList::decode(&value),
            _ => {}
        }
    }
    if let Some(sort) = &mut state.sort {
        sort.direction = direction;
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteEndpoints;
    use crate::config::TableConfig;
    use crate::model::TableView;
    use crate::model::ViewDelta;
    use crate::query::FilterCondition;
    use crate::query::Operator;

    fn view() -> TableView {
        TableView::new(&TableConfig::remote("t", RemoteEndpoints::new("/t")), 25)
    }

    #[test]
    fn test_defaults_leave_clean_address() {
        let location = Url::parse("https://app.test/users#top").unwrap();
        let url = address_for(&location, &RequestParams::from_view(&view()), 25);
        assert_eq!(url.as_str(), "https://app.test/users#top");
    }

    #[test]
    fn test_non_defaults_mirrored() {
        let location = Url::parse("https://app.test/users").unwrap();
        let mut view = view();
        view.apply(&ViewDelta::Sort(Sort::desc("name")));
        view.apply(&ViewDelta::GoToPage(2));
        let url = address_for(&location, &RequestParams::from_view(&view), 25);
        assert_eq!(url.as_str(), "https://app.test/users?page=2&sort=name&dir=desc");
    }

    #[test]
    fn test_restore_round_trip() {
        let mut filters = FilterList::new();
        filters.push(FilterCondition::new("role", Operator::Equals, "admin"));
        let mut view = view();
        view.apply(&ViewDelta::Filters(filters.clone()));
        view.apply(&ViewDelta::Search("ada".to_string()));
        view.apply(&ViewDelta::SetPageSize(50));
        view.apply(&ViewDelta::GoToPage(3));

        let location = Url::parse("https://app.test/users").unwrap();
        let url = address_for(&location, &RequestParams::from_view(&view), 25);
        let state = restore(&url);
        assert_eq!(state.page, Some(3));
        assert_eq!(state.size, Some(50));
        assert_eq!(state.search.as_deref(), Some("ada"));
        assert_eq!(state.filters, filters);
        assert_eq!(state.sort, None);
    }

    #[test]
    fn test_restore_ignores_garbage() {
        let url = Url::parse("https://app.test/?page=zero&size=-1&filters=%25%25&dir=sideways&sort=name")
            .unwrap();
        let state = restore(&url);
        assert_eq!(state.page, None);
        assert_eq!(state.size, None);
        assert!(state.filters.is_empty());
        assert_eq!(state.sort, Some(Sort::asc("name")));
    }

    #[test]
    fn test_memory_address_bar() {
        let mut bar = MemoryAddressBar::parse("https://app.test/users").unwrap();
        bar.replace(Url::parse("https://app.test/users?page=2").unwrap());
        assert_eq!(bar.replacements(), 1);
        assert_eq!(bar.location().query(), Some("page=2"));
    }
}
