use tabledom::Document;
use tabledom::Event;
use tableview_lib::Notice;
use tableview_lib::TableEngine;
use tableview_lib::collab::CallLog;
use tableview_lib::collab::CollaboratorCall;
use tableview_lib::collab::ConfirmOutcome;
use tableview_lib::collab::ConfirmRequest;
use tableview_lib::collab::RecordingDialog;
use tableview_lib::collab::RecordingDrawer;
use tableview_lib::collab::SubmitResult;
use tableview_lib::config::BulkActionConfig;
use tableview_lib::config::ColumnConfig;
use tableview_lib::config::TableConfig;
use tableview_lib::config::Variant;
use tableview_lib::history::MemoryAddressBar;
use tableview_lib::model::Row;
use tableview_lib::model::TableId;
use tableview_lib::remote::RecordedRequest;
use tableview_lib::remote::StaticRenderService;

// =============================================================================
// Helpers
// =============================================================================

const USERS: &str = r#"
<div id="users-card">
  <div id="users-bulk" data-bulk-mode="false">
    <span id="users-bulk-count">0</span>
    <button id="users-bulk-select-all">Select all</button>
    <button id="users-bulk-cancel">Cancel</button>
    <button id="users-bulk-delete" data-bulk-action="delete">Delete</button>
    <button id="users-bulk-export" data-bulk-action="export">Export</button>
  </div>
  <table id="users">
    <thead><tr><th><input type="checkbox" id="users-select-all"/></th><th>Name</th></tr></thead>
    <tbody id="users-body"></tbody>
  </table>
</div>"#;

const PEOPLE: &str = r#"
<div id="people-card">
  <table id="people">
    <tbody id="people-body">
      <tr data-id="7" data-name="Ada">
        <td>Ada</td>
        <td>
          <button id="edit-7" class="action-btn" data-action="edit" data-id="7"
                  data-edit-url="/people/edit" data-drawer-title="Edit Ada">Edit</button>
          <button id="delete-7" class="action-btn" data-action="delete" data-id="7"
                  data-delete-url="/people/delete" data-item-name="Ada">Delete</button>
          <button id="activate-7" class="action-btn" data-action="activate" data-id="7"
                  data-activate-url="/people/activate" data-item-name="Ada">Activate</button>
        </td>
      </tr>
    </tbody>
  </table>
</div>"#;

struct Harness {
    engine: TableEngine,
    service: StaticRenderService,
    log: CallLog,
}

fn users_config() -> TableConfig {
    TableConfig::local("users")
        .with_column(ColumnConfig::new("name", "Name"))
        .with_bulk_action(
            BulkActionConfig::new("delete", "Delete")
                .with_endpoint("/users/bulk-delete")
                .with_requires_attr("deletable"),
        )
        .with_bulk_action(BulkActionConfig::new("export", "Export"))
}

fn harness(markup: &str, address: &str) -> Harness {
    let service = StaticRenderService::new()
        .route("/users/bulk-delete", "ok")
        .fail("/users/bulk-fail", 500);
    let log = CallLog::new();
    let engine = TableEngine::builder()
        .document(Document::parse(markup).unwrap())
        .service(service.clone())
        .address_bar(MemoryAddressBar::parse(address).unwrap())
        .dialog(RecordingDialog::new(log.clone()))
        .drawer(RecordingDrawer::new(log.clone()))
        .build();
    Harness { engine, service, log }
}

fn users_harness() -> Harness {
    let mut h = harness(USERS, "https://app.test/users");
    assert!(h.engine.initialize(users_config()));
    let rows = vec![
        Row::new("1").set("name", "Ada").set("deletable", true),
        Row::new("2").set("name", "Bob").set("deletable", false),
        Row::new("3").set("name", "Cy").set("deletable", true),
    ];
    assert!(h.engine.set_rows("users", rows));
    h
}

fn people_harness() -> Harness {
    let mut h = harness(PEOPLE, "https://app.test/people");
    assert!(h.engine.initialize(TableConfig::local("people")));
    h
}

fn button(engine: &TableEngine, id: &str) -> (bool, bool) {
    let element = engine.document().get(id).unwrap();
    (element.disabled, element.hidden)
}

// =============================================================================
// Bulk actions
// =============================================================================

#[tokio::test]
async fn test_bulk_button_follows_required_attribute() {
    let mut h = users_harness();
    assert_eq!(button(&h.engine, "users-bulk-delete"), (true, true));

    h.engine.dispatch(Event::check("users-check-1", true)).await;
    assert_eq!(button(&h.engine, "users-bulk-delete"), (false, false));

    h.engine.dispatch(Event::check("users-check-2", true)).await;
    assert_eq!(button(&h.engine, "users-bulk-delete"), (true, true));
    // Export has no requirement.
    assert_eq!(button(&h.engine, "users-bulk-export"), (false, false));

    // Disabled buttons do nothing.
    h.engine.dispatch(Event::click("users-bulk-delete")).await;
    assert!(h.log.calls().is_empty());
    assert!(!h.engine.awaiting_confirmation());

    h.engine.dispatch(Event::check("users-check-2", false)).await;
    assert_eq!(button(&h.engine, "users-bulk-delete"), (false, false));
}

#[tokio::test]
async fn test_confirmed_bulk_action_posts_and_clears() {
    let mut h = users_harness();
    h.engine.dispatch(Event::check("users-check-3", true)).await;
    h.engine.dispatch(Event::check("users-check-1", true)).await;
    h.engine.take_notices();

    h.engine.dispatch(Event::click("users-bulk-delete")).await;
    assert!(h.engine.awaiting_confirmation());
    assert_eq!(
        h.log.calls(),
        vec![CollaboratorCall::Confirm(ConfirmRequest {
            title: "Confirm Action".to_string(),
            message: "Are you sure you want to delete 2 item(s)?".to_string(),
            confirm_label: "Delete".to_string(),
            cancel_label: "Cancel".to_string(),
            variant: Variant::Default,
        })]
    );

    h.engine.confirm_outcome(ConfirmOutcome::confirmed()).await;
    assert_eq!(
        h.service.requests(),
        vec![RecordedRequest::Post(
            "https://app.test/users/bulk-delete".to_string(),
            vec![
                ("id".to_string(), "1".to_string()),
                ("id".to_string(), "3".to_string()),
            ],
        )]
    );
    assert_eq!(h.log.calls().last(), Some(&CollaboratorCall::Close));
    assert!(h.engine.selected("users").is_empty());
    assert!(!h.engine.awaiting_confirmation());
    assert_eq!(
        h.engine.take_notices(),
        vec![Notice::SelectionChanged {
            table: TableId::new("users"),
            count: 0
        }]
    );
    assert_eq!(
        h.engine.document().get("users-bulk").unwrap().data_value("bulk-mode"),
        Some("false")
    );
}

#[tokio::test]
async fn test_failed_bulk_post_keeps_selection() {
    let mut h = harness(USERS, "https://app.test/users");
    h.engine.initialize(
        TableConfig::local("users")
            .with_bulk_action(BulkActionConfig::new("delete", "Delete").with_endpoint("/users/bulk-fail")),
    );
    h.engine.set_rows("users", vec![Row::new("1").set("name", "Ada")]);
    h.engine.dispatch(Event::check("users-check-1", true)).await;

    h.engine.dispatch(Event::click("users-bulk-delete")).await;
    h.engine.confirm_outcome(ConfirmOutcome::confirmed()).await;

    assert_eq!(h.service.requests().len(), 1);
    assert_eq!(h.engine.selected("users"), vec!["1".to_string()]);
    assert_eq!(h.log.calls().last(), Some(&CollaboratorCall::Close));
}

#[tokio::test]
async fn test_cancelled_bulk_action_posts_nothing() {
    let mut h = users_harness();
    h.engine.dispatch(Event::check("users-check-1", true)).await;
    h.engine.dispatch(Event::click("users-bulk-delete")).await;
    h.engine.confirm_outcome(ConfirmOutcome::cancelled()).await;

    assert!(h.service.requests().is_empty());
    assert_eq!(h.engine.selected("users"), vec!["1".to_string()]);
    assert_eq!(h.log.calls().len(), 2);
}

#[tokio::test]
async fn test_bulk_action_without_endpoint_is_handed_to_host() {
    let mut h = users_harness();
    h.engine.dispatch(Event::click("users-bulk-select-all")).await;
    assert_eq!(h.engine.selected("users").len(), 3);
    h.engine.take_notices();

    h.engine.dispatch(Event::click("users-bulk-export")).await;
    assert_eq!(
        h.engine.take_notices(),
        vec![Notice::BulkAction {
            table: TableId::new("users"),
            action: "export".to_string(),
            ids: vec!["1".to_string(), "2".to_string(), "3".to_string()],
        }]
    );
    assert!(h.log.calls().is_empty());
    assert!(h.service.requests().is_empty());
}

// =============================================================================
// Row actions
// =============================================================================

#[tokio::test]
async fn test_delete_confirmed_by_dialog_request() {
    let mut h = people_harness();
    h.engine.dispatch(Event::click("delete-7")).await;
    assert_eq!(
        h.log.calls(),
        vec![CollaboratorCall::Confirm(ConfirmRequest {
            title: "Confirm Delete".to_string(),
            message: "Are you sure you want to delete Ada?".to_string(),
            confirm_label: "Delete".to_string(),
            cancel_label: "Cancel".to_string(),
            variant: Variant::Danger,
        })]
    );

    h.engine
        .confirm_outcome(ConfirmOutcome::completed("/people/delete?id=7"))
        .await;
    assert_eq!(h.log.calls().len(), 2);
    assert_eq!(h.log.calls()[1], CollaboratorCall::Close);
    // The dialog sent the request itself.
    assert!(h.service.requests().is_empty());
    assert!(!h.engine.awaiting_confirmation());
}

#[tokio::test]
async fn test_row_action_posts_when_confirmed() {
    let mut h = people_harness();
    h.service.set_route("/people/activate", Ok("ok".to_string()));
    h.engine.dispatch(Event::click("activate-7")).await;
    match h.log.calls().first() {
        Some(CollaboratorCall::Confirm(request)) => {
            assert_eq!(request.title, "Confirm Activation");
            assert_eq!(request.variant, Variant::Primary);
        }
        other => panic!("expected confirmation, got {other:?}"),
    }

    h.engine.confirm_outcome(ConfirmOutcome::confirmed()).await;
    assert_eq!(
        h.service.requests(),
        vec![RecordedRequest::Post(
            "https://app.test/people/activate?id=7".to_string(),
            Vec::new()
        )]
    );
}

#[tokio::test]
async fn test_failed_row_action_closes_dialog() {
    let mut h = people_harness();
    h.engine.dispatch(Event::click("delete-7")).await;
    h.engine
        .confirm_outcome(ConfirmOutcome::failed("/people/delete?id=7"))
        .await;
    assert_eq!(h.log.calls().last(), Some(&CollaboratorCall::Close));
    assert!(!h.engine.awaiting_confirmation());
}

#[tokio::test]
async fn test_edit_opens_drawer_and_refreshes_on_save() {
    let mut h = people_harness();
    h.engine.dispatch(Event::click("edit-7")).await;
    assert_eq!(
        h.log.calls(),
        vec![CollaboratorCall::OpenDrawer {
            title: "Edit Ada".to_string(),
            url: "https://app.test/people/edit?id=7".to_string(),
        }]
    );

    h.engine
        .drawer_submitted(SubmitResult::error("Name is required"))
        .await;
    assert_eq!(
        h.log.calls().last(),
        Some(&CollaboratorCall::ShowError("Name is required".to_string()))
    );

    h.engine.drawer_submitted(SubmitResult::ok()).await;
    assert_eq!(h.log.calls().last(), Some(&CollaboratorCall::Close));
    assert_eq!(h.log.calls().len(), 3);
    // The row survives the local re-render.
    assert!(h.engine.document().contains("people-row-7"));
}

#[tokio::test]
async fn test_row_action_without_dialog_is_skipped() {
    let mut engine = TableEngine::builder()
        .document(Document::parse(PEOPLE).unwrap())
        .build();
    engine.initialize(TableConfig::local("people"));
    engine.dispatch(Event::click("delete-7")).await;
    assert!(!engine.awaiting_confirmation());
}
