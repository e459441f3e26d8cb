#![forbid(unsafe_code)]

pub mod html;
pub mod leaflet;
pub mod mount;
pub mod recording;
pub mod widget;

pub use html::{render_map_html, sanitize_container_id};
pub use leaflet::LeafletScript;
pub use mount::mount;
pub use recording::{RecordingWidget, WidgetCall};
pub use widget::{GroupHandle, MapWidget, MarkerHandle};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown widget handle: {handle}")]
    UnknownHandle { handle: usize },
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
