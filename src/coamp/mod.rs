mod error;
mod export;
mod fetch;
mod graph;
mod parse;
mod select;
mod session;
mod significance;
mod sizing;

pub use error::CoampResult;
pub use export::{ExportRow, export_rows, write_export};
pub use fetch::{GraphSource, HttpGraphSource, JsonFileSource};
pub use graph::{CoampGraph, Node, TestName};
pub use session::{GraphSession, QueryContext, QueryControls, RequestSequence};
pub use significance::{TestSelector, recompute_classification};
pub use sizing::LayoutParams;
