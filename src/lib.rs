//! Small local HTTP file server: browse a directory tree, download files and
//! upload new ones, with the served root and advertised port adjustable from
//! the index page.

pub mod config;
pub mod error;
pub mod listing;
pub mod net;
pub mod resolve;
pub mod sanitize;
pub mod server;
pub mod upload;
pub mod view;

pub use config::{Args, ControlUpdate, ServerConfig, SharedConfig};
pub use error::AppError;
pub use listing::{list_dir, FileEntry};
pub use resolve::{normalize_request_path, resolve_target, ResolvedTarget};
pub use sanitize::sanitize_filename;
pub use server::{build_router, AppState, SharedState};
pub use upload::{store_upload, StoredUpload};
