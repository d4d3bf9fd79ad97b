//! Evaluating a view over rows and reading the visible page back out.

use serde_json::json;
use tabledom::Document;
use tabledom::Element;
use tableview_lib::TableEngine;
use tableview_lib::anchors::Anchors;
use tableview_lib::config::ColumnConfig;
use tableview_lib::config::EngineConfig;
use tableview_lib::config::TableConfig;
use tableview_lib::history::AddressState;
use tableview_lib::model::Row;
use tableview_lib::model::ViewDelta;
use url::Url;

const TABLE: &str = "rows";

/// One rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub start: String,
    pub end: String,
    pub total: String,
    /// Page strip, with the current page bracketed.
    pub pages: Vec<String>,
}

impl Page {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "columns": self.columns,
            "rows": self.rows,
            "start": self.start,
            "end": self.end,
            "total": self.total,
            "pages": self.pages,
        })
    }

    pub fn to_text(&self) -> String {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(&self.columns)];
        out.extend(self.rows.iter().map(|row| line(row)));
        out.push(String::new());
        out.push(format!("Showing {} to {} of {} entries", self.start, self.end, self.total));
        if !self.pages.is_empty() {
            out.push(self.pages.join(" "));
        }
        out.join("\n")
    }
}

/// Table parameters from an address query string such as `page=2&sort=name`.
pub fn parse_query(query: &str) -> anyhow::Result<AddressState> {
    let query = query.trim_start_matches('?');
    let mut url = Url::parse("tableview:/")?;
    url.set_query(Some(query).filter(|q| !q.is_empty()));
    Ok(tableview_lib::history::restore(&url))
}

/// Run `rows` through a local table engine with `state` applied.
pub async fn render(
    rows: Vec<Row>,
    columns: &[String],
    state: AddressState,
    config: EngineConfig,
) -> anyhow::Result<Page> {
    let anchors = Anchors::new(TABLE);
    let document = Document::new(card(&anchors, &config));
    let mut engine = TableEngine::builder().document(document).config(config).build();

    let table = columns.iter().fold(TableConfig::local(TABLE), |table, key| {
        table.with_column(ColumnConfig::new(key.clone(), key.clone()))
    });
    if !engine.initialize(table) {
        anyhow::bail!("table {TABLE} did not initialize");
    }
    engine.set_rows(TABLE, rows);

    // Shape changes first; each resets the page.
    if let Some(size) = state.size {
        engine.navigate(TABLE, ViewDelta::SetPageSize(size)).await;
    }
    if let Some(sort) = state.sort {
        engine.navigate(TABLE, ViewDelta::Sort(sort)).await;
    }
    if let Some(search) = state.search {
        engine.navigate(TABLE, ViewDelta::Search(search)).await;
    }
    if !state.filters.is_empty() {
        engine.navigate(TABLE, ViewDelta::Filters(state.filters)).await;
    }
    if let Some(page) = state.page {
        engine.navigate(TABLE, ViewDelta::GoToPage(page)).await;
    }

    Ok(read_page(engine.document(), &anchors, columns))
}

/// A bare local-table card: body, counts, page strip and size selector.
fn card(anchors: &Anchors, config: &EngineConfig) -> Element {
    let sizes = config
        .page_size_options
        .iter()
        .map(|size| Element::new("option").attr("value", size.to_string()).content(size.to_string()))
        .collect();
    let footer = Element::div()
        .id(anchors.footer())
        .child(Element::new("span").id(anchors.start()))
        .child(Element::new("span").id(anchors.end()))
        .child(Element::new("span").id(anchors.total()))
        .child(Element::button().id(anchors.prev()))
        .child(Element::div().id(anchors.pages()))
        .child(Element::button().id(anchors.next()))
        .child(
            Element::new("select")
                .id(anchors.page_size())
                .attr("value", config.default_page_size.to_string())
                .children(sizes),
        );
    let table = Element::new("table")
        .id(anchors.table())
        .child(Element::new("tbody").id(anchors.body()));
    Element::div().id(anchors.card()).child(table).child(footer)
}

fn read_page(document: &Document, anchors: &Anchors, columns: &[String]) -> Page {
    let text = |id: String| document.get(&id).map(Element::text_content).unwrap_or_default();
    let rows = document
        .get(&anchors.body())
        .map(Element::child_elements)
        .unwrap_or_default()
        .iter()
        .filter(|row| !row.hidden)
        .map(|row| row.child_elements().iter().map(Element::text_content).collect())
        .collect();
    let pages = document
        .get(&anchors.pages())
        .map(Element::child_elements)
        .unwrap_or_default()
        .iter()
        .map(|button| {
            let label = button.text_content();
            if button.has_class("active") {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect();

    Page {
        columns: columns.to_vec(),
        rows,
        start: text(anchors.start()),
        end: text(anchors.end()),
        total: text(anchors.total()),
        pages,
    }
}
