pub mod html_snapshot;
pub mod js_executor;
pub mod page_source;

pub use html_snapshot::HtmlSnapshot;
pub use js_executor::JsExecutor;
pub use page_source::PageSource;
