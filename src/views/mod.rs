//! Stateless formatters shared by the dashboard screens.

mod metric;
mod table;

pub use metric::{MetricRecord, MetricStyle, MetricView};
pub use table::{TableData, TableView};
