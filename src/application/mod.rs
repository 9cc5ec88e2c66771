//! Application layer - the extraction pipeline.
//!
//! Resolution, backward pagination, window filtering, record projection,
//! and the orchestrator that sequences them per request.

pub mod orchestrator;
pub mod pager;
pub mod projector;
pub mod resolver;
pub mod window;

pub use orchestrator::Exporter;
pub use pager::{collect_history, PagedHistory};
pub use projector::project;
pub use resolver::{normalize_chat_id, resolve_scope, ResolvedScope};
pub use window::filter_and_sort;
