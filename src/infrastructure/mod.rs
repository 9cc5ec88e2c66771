//! Infrastructure layer - external adapters (transport, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod gate;
pub mod replay;
pub mod sink;
pub mod transport;

pub use config::{ensure_config_exists, load_config, AppConfig};
pub use gate::{SessionGate, SessionState};
pub use replay::ReplayTransport;
pub use sink::{output_file_name, ExportSink, EMPTY_BODY_PLACEHOLDER, MEDIA_PLACEHOLDER};
pub use transport::{FetchOptions, MessageTransport, SessionEvent};
