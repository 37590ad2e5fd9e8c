//! Tabular formatter.

use crate::dom::{Element, Node};

/// Header row plus data rows. Callers keep every row as long as
/// `columns`; nothing here checks it, and ragged rows render as given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Node>>,
}

pub struct TableView;

impl TableView {
    pub fn render(data: &TableData) -> Node {
        let header = Element::new("tr").children(
            data.columns
                .iter()
                .map(|c| Element::new("th").text(c).into()),
        );

        let body = Element::new("tbody").children(data.rows.iter().map(|row| {
            Element::new("tr")
                .children(row.iter().map(|cell| Element::new("td").child(cell.clone()).into()))
                .into()
        }));

        Element::new("table")
            .class("striped")
            .child(Element::new("thead").child(header))
            .child(body)
            .into()
    }
}
