use std::time::Duration;

use tabledom::Document;
use tabledom::Event;
use tableview_lib::SyncOutcome;
use tableview_lib::TableEngine;
use tableview_lib::config::PaginationMode;
use tableview_lib::config::RemoteEndpoints;
use tableview_lib::config::TableConfig;
use tableview_lib::history::MemoryAddressBar;
use tableview_lib::model::Direction;
use tableview_lib::model::Pagination;
use tableview_lib::model::Sort;
use tableview_lib::model::ViewDelta;
use tableview_lib::remote::RecordedRequest;
use tableview_lib::remote::StaticRenderService;
use tokio::time::Instant;

// =============================================================================
// Helpers
// =============================================================================

const ADDRESS: &str = "https://app.test/admin/users";

const CARD: &str = r#"
<div id="page">
  <div id="users-card">
    <input id="users-search" type="text"/>
    <table id="users">
      <thead><tr><th id="users-th-name" data-sort="name">Name</th></tr></thead>
      <tbody id="users-body"><tr data-id="1"><td>User 1</td></tr></tbody>
    </table>
    <div id="users-footer">
      <span id="users-start">1</span>
      <button id="users-prev">Prev</button>
      <button id="users-next">Next</button>
    </div>
    <div id="users-meta" data-current-page="1" data-total-rows="60" data-page-size="25"></div>
  </div>
</div>"#;

/// Body and footer for page 2, with the server's view of the page.
const PATCH_PAGE_2: &str = r#"
<div>
  <tbody id="users-body"><tr data-id="26"><td>User 26</td></tr></tbody>
  <div id="users-footer">
    <span id="users-start">26</span>
    <button id="users-prev">Prev</button>
    <button id="users-next">Next</button>
  </div>
  <div id="users-meta" data-current-page="2" data-total-rows="60"></div>
</div>"#;

const PATCH_PAGE_3: &str = r#"
<div>
  <tbody id="users-body"><tr data-id="51"><td>User 51</td></tr></tbody>
  <div id="users-footer">
    <span id="users-start">51</span>
    <button id="users-prev">Prev</button>
    <button id="users-next" disabled="disabled">Next</button>
  </div>
  <div id="users-meta" data-current-page="3" data-total-rows="60"></div>
</div>"#;

/// A patch that leaves the page to the request.
const PATCH_ANY_PAGE: &str = r#"
<div>
  <tbody id="users-body"><tr data-id="x"><td>Somebody</td></tr></tbody>
  <div id="users-footer"><button id="users-next">Next</button></div>
  <div id="users-meta" data-total-rows="60"></div>
</div>"#;

const CARD_PAGE_2: &str = r#"
<div id="users-card">
  <input id="users-search" type="text"/>
  <table id="users">
    <thead><tr><th id="users-th-name" data-sort="name">Name</th></tr></thead>
    <tbody id="users-body"><tr data-id="26"><td>User 26</td></tr></tbody>
  </table>
  <div id="users-footer">
    <span id="users-start">26</span>
    <button id="users-prev">Prev</button>
    <button id="users-next">Next</button>
  </div>
  <div id="users-meta" data-current-page="2" data-total-rows="60" data-page-size="25"></div>
</div>"#;

fn config() -> TableConfig {
    TableConfig::remote(
        "users",
        RemoteEndpoints::new("/users/card").with_body_url("/users/body"),
    )
}

fn engine_at(markup: &str, address: &str, service: &StaticRenderService) -> TableEngine {
    let mut engine = TableEngine::builder()
        .document(Document::parse(markup).unwrap())
        .service(service.clone())
        .address_bar(MemoryAddressBar::parse(address).unwrap())
        .build();
    assert!(engine.initialize(config()));
    engine
}

fn gets(service: &StaticRenderService) -> Vec<String> {
    service
        .requests()
        .into_iter()
        .filter_map(|r| match r {
            RecordedRequest::Get(url) => Some(url),
            RecordedRequest::Post(..) => None,
        })
        .collect()
}

fn address(engine: &TableEngine) -> String {
    engine.location().unwrap().to_string()
}

// =============================================================================
// Targeted updates
// =============================================================================

#[tokio::test]
async fn test_next_page_patches_body_and_footer() {
    let service = StaticRenderService::new().route("/users/body", PATCH_PAGE_2);
    let mut engine = engine_at(CARD, ADDRESS, &service);
    assert_eq!(engine.view("users").unwrap().total_rows, 60);
    let listeners = engine.listener_count();

    engine.dispatch(Event::click("users-next")).await;

    assert_eq!(gets(&service), vec!["https://app.test/users/body?page=2"]);
    assert_eq!(engine.view("users").unwrap().page(), 2);
    assert_eq!(address(&engine), "https://app.test/admin/users?page=2");
    let rows = engine.document().get("users-body").unwrap().child_elements();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].data_value("id"), Some("26"));
    assert_eq!(
        engine.document().get("users-start").unwrap().text_content(),
        "26"
    );
    assert_eq!(engine.listener_count(), listeners);

    // The swapped-in footer is live.
    service.set_route("/users/body", Ok(PATCH_PAGE_3.to_string()));
    engine.dispatch(Event::click("users-next")).await;
    assert_eq!(engine.view("users").unwrap().page(), 3);
    assert_eq!(
        gets(&service).last().map(String::as_str),
        Some("https://app.test/users/body?page=3")
    );

    // Disabled by the server's footer.
    engine.dispatch(Event::click("users-next")).await;
    assert_eq!(gets(&service).len(), 2);
}

#[tokio::test]
async fn test_failed_patch_falls_back_to_card() {
    let service = StaticRenderService::new()
        .fail("/users/body", 500)
        .route("/users/card", CARD_PAGE_2);
    let mut engine = engine_at(CARD, ADDRESS, &service);

    assert!(engine.navigate("users", ViewDelta::NextPage).await);
    assert_eq!(
        gets(&service),
        vec![
            "https://app.test/users/body?page=2",
            "https://app.test/users/card?page=2",
        ]
    );
    assert_eq!(engine.view("users").unwrap().page(), 2);
    assert_eq!(
        engine.document().get("users-start").unwrap().text_content(),
        "26"
    );

    // Listeners follow the new card.
    service.set_route("/users/body", Ok(PATCH_PAGE_3.to_string()));
    engine.dispatch(Event::click("users-next")).await;
    assert_eq!(engine.view("users").unwrap().page(), 3);
}

#[tokio::test]
async fn test_patch_without_matching_regions_fetches_card() {
    let markup = r#"
<div id="page">
  <div id="users-card">
    <table id="users"><tbody id="users-body"></tbody></table>
    <div id="users-meta" data-total-rows="60"></div>
  </div>
</div>"#;
    let service = StaticRenderService::new()
        .route("/users/body", PATCH_PAGE_2)
        .route("/users/card", CARD_PAGE_2);
    let mut engine = engine_at(markup, ADDRESS, &service);

    assert!(engine.navigate("users", ViewDelta::NextPage).await);
    assert_eq!(gets(&service).len(), 2);
    assert!(engine.document().contains("users-footer"));
    assert!(engine.document().contains("users-search"));
}

#[tokio::test]
async fn test_failure_keeps_view() {
    let service = StaticRenderService::new()
        .fail("/users/body", 500)
        .fail("/users/card", 503);
    let mut engine = engine_at(CARD, ADDRESS, &service);

    assert!(!engine.navigate("users", ViewDelta::NextPage).await);
    assert_eq!(engine.view("users").unwrap().page(), 1);
    assert_eq!(engine.entry("users").unwrap().sync.last_applied(), 0);
}

#[tokio::test]
async fn test_no_service_skips_sync() {
    let mut engine = TableEngine::builder()
        .document(Document::parse(CARD).unwrap())
        .build();
    engine.initialize(config());
    assert!(!engine.navigate("users", ViewDelta::NextPage).await);
    assert_eq!(engine.view("users").unwrap().page(), 1);
}

#[tokio::test]
async fn test_reinitialization_keeps_patched_page() {
    let service = StaticRenderService::new().route("/users/body", PATCH_PAGE_2);
    let mut engine = engine_at(CARD, ADDRESS, &service);

    engine.dispatch(Event::click("users-next")).await;
    assert_eq!(engine.view("users").unwrap().page(), 2);
    let meta = engine.document().get("users-meta").unwrap();
    assert_eq!(meta.data_value("current-page"), Some("2"));

    assert!(engine.initialize(config()));
    assert_eq!(engine.view("users").unwrap().page(), 2);
    assert_eq!(engine.view("users").unwrap().total_rows, 60);

    // A patch without a page keeps the requested one.
    service.set_route("/users/body", Ok(PATCH_ANY_PAGE.to_string()));
    assert!(engine.navigate("users", ViewDelta::GoToPage(3)).await);
    assert!(engine.initialize(config()));
    assert_eq!(engine.view("users").unwrap().page(), 3);
}

// =============================================================================
// Sequencing
// =============================================================================

#[tokio::test]
async fn test_out_of_order_response_is_discarded() {
    let service = StaticRenderService::new().route("/users/body", PATCH_ANY_PAGE);
    let mut engine = engine_at(CARD, ADDRESS, &service);

    let first = engine
        .begin_sync("users", &ViewDelta::NextPage)
        .unwrap()
        .unwrap();
    let second = engine
        .begin_sync("users", &ViewDelta::GoToPage(3))
        .unwrap()
        .unwrap();
    assert!(first.seq < second.seq);

    let second = second.fetch(&service).await;
    let first = first.fetch(&service).await;

    assert_eq!(engine.complete_sync(second), SyncOutcome::Applied);
    assert_eq!(engine.view("users").unwrap().page(), 3);
    assert_eq!(engine.complete_sync(first), SyncOutcome::Stale);
    assert_eq!(engine.view("users").unwrap().page(), 3);
}

#[tokio::test]
async fn test_page_past_known_total_is_clamped() {
    let service = StaticRenderService::new().route("/users/body", PATCH_ANY_PAGE);
    let mut engine = engine_at(CARD, ADDRESS, &service);

    assert!(engine.navigate("users", ViewDelta::GoToPage(9)).await);
    assert_eq!(gets(&service), vec!["https://app.test/users/body?page=3"]);
}

// =============================================================================
// Address
// =============================================================================

#[tokio::test]
async fn test_initial_view_restored_from_address() {
    let service = StaticRenderService::new().route("/users/body", PATCH_ANY_PAGE);
    let markup = r#"
<div id="users-card">
  <table id="users"><tbody id="users-body"></tbody></table>
  <div id="users-footer"><button id="users-next">Next</button></div>
</div>"#;
    let mut engine = TableEngine::builder()
        .document(Document::parse(markup).unwrap())
        .service(service.clone())
        .address_bar(
            MemoryAddressBar::parse(
                "https://app.test/admin/users?tab=all&page=2&size=50&sort=name&dir=desc&search=ada",
            )
            .unwrap(),
        )
        .build();
    engine.initialize(config().with_default_sort(Sort::asc("email")));

    let view = engine.view("users").unwrap();
    assert_eq!(view.page(), 2);
    assert_eq!(view.page_size, 50);
    assert_eq!(view.search, "ada");
    assert_eq!(view.sort, Some(Sort::desc("name")));

    engine.dispatch(Event::click("users-next")).await;
    assert_eq!(
        address(&engine),
        "https://app.test/admin/users?tab=all&page=3&size=50&search=ada&sort=name&dir=desc"
    );

    engine.navigate("users", ViewDelta::GoToPage(1)).await;
    assert_eq!(
        address(&engine),
        "https://app.test/admin/users?tab=all&size=50&search=ada&sort=name&dir=desc"
    );
}

#[tokio::test]
async fn test_server_metadata_wins_over_address() {
    let service = StaticRenderService::new();
    let engine = engine_at(CARD, "https://app.test/admin/users?page=2", &service);
    // The rendered card says page 1.
    assert_eq!(engine.view("users").unwrap().page(), 1);
}

#[tokio::test]
async fn test_header_sort_and_search_are_mirrored() {
    let service = StaticRenderService::new().route("/users/body", PATCH_ANY_PAGE);
    let mut engine = engine_at(CARD, ADDRESS, &service);

    engine.dispatch(Event::click("users-th-name")).await;
    assert_eq!(address(&engine), "https://app.test/admin/users?sort=name");
    assert!(engine
        .document()
        .get("users-th-name")
        .unwrap()
        .has_class("sort-asc"));

    engine.dispatch(Event::click("users-th-name")).await;
    assert_eq!(
        engine.view("users").unwrap().sort.as_ref().map(|s| s.direction),
        Some(Direction::Desc)
    );

    engine.dispatch(Event::input("users-search", "ada")).await;
    assert_eq!(engine.poll_timers(Instant::now()).await, 0);
    let due = Instant::now() + Duration::from_secs(1);
    assert_eq!(engine.poll_timers(due).await, 1);
    assert_eq!(
        address(&engine),
        "https://app.test/admin/users?search=ada&sort=name&dir=desc"
    );
    assert_eq!(
        gets(&service).last().map(String::as_str),
        Some("https://app.test/users/body?search=ada&sort=name&dir=desc")
    );
}

// =============================================================================
// Refresh and cursors
// =============================================================================

#[tokio::test]
async fn test_refresh_uses_refresh_endpoint() {
    let service = StaticRenderService::new().route("/users/refresh", CARD_PAGE_2);
    let mut engine = TableEngine::builder()
        .document(Document::parse(CARD).unwrap())
        .service(service.clone())
        .address_bar(MemoryAddressBar::parse(ADDRESS).unwrap())
        .build();
    engine.initialize(TableConfig::remote(
        "users",
        RemoteEndpoints::new("/users/card")
            .with_body_url("/users/body")
            .with_refresh_url("/users/refresh"),
    ));

    assert!(engine.refresh("users").await);
    assert_eq!(gets(&service), vec!["https://app.test/users/refresh"]);
    assert_eq!(engine.view("users").unwrap().page(), 2);
}

#[tokio::test]
async fn test_cursor_pages_follow_server_tokens() {
    let markup = r#"
<div id="users-card">
  <table id="users"><tbody id="users-body"></tbody></table>
  <div id="users-footer"><button id="users-next">Next</button></div>
  <div id="users-meta" data-next-cursor="c2" data-has-next="true"></div>
</div>"#;
    let last_page = r#"
<div>
  <tbody id="users-body"><tr data-id="9"><td>Last</td></tr></tbody>
  <div id="users-footer"><button id="users-next">Next</button></div>
  <div id="users-meta" data-prev-cursor="c1" data-has-next="false"></div>
</div>"#;
    let service = StaticRenderService::new().route("/users/body", last_page);
    let mut engine = TableEngine::builder()
        .document(Document::parse(markup).unwrap())
        .service(service.clone())
        .address_bar(MemoryAddressBar::parse(ADDRESS).unwrap())
        .build();
    engine.initialize(config().with_pagination(PaginationMode::Cursor));

    engine.dispatch(Event::click("users-next")).await;
    assert_eq!(
        gets(&service),
        vec!["https://app.test/users/body?cursor=c2&curdir=next"]
    );
    match &engine.view("users").unwrap().pagination {
        Pagination::Cursor {
            tokens, has_next, ..
        } => {
            assert!(!has_next);
            assert_eq!(tokens.prev.as_deref(), Some("c1"));
        }
        other => panic!("expected cursor pagination, got {other:?}"),
    }

    // Nothing past the last page.
    assert!(!engine.navigate("users", ViewDelta::NextPage).await);
    assert_eq!(gets(&service).len(), 1);
}
