//! PII Lens Common Library
//!
//! CLIとWeb(WASM)で共有される型・描画・状態管理

pub mod types;
pub mod error;
pub mod service;
pub mod surface;
pub mod render;
pub mod highlight;
pub mod masked;
pub mod store;
pub mod controller;

pub use types::{BoundingBox, ConfidenceLevel, Detection, EndpointMode};
pub use error::{Error, Result};
pub use service::{DetectPayload, ProcessPayload, ServiceConfig, ServiceResponse, DEFAULT_API_BASE, UPLOAD_FIELD};
pub use surface::{DrawOp, ImageDims, RecordingSurface, Rgba, SourceImage, Stroke, Surface, TextStyle};
pub use render::{
    clear_overlay, detection_label, render_overlay, stroke_width_for, RedrawAction, RedrawGate, RenderOutcome,
};
pub use highlight::{
    draw_highlight, HighlightCoordinator, HighlightToken, OverlayFrame, PendingRevert, RevertOutcome,
    HIGHLIGHT_REVERT_MS,
};
pub use masked::{decode_data_url, ImageHandle, MaskedOutput, MASKED_FILE_NAME};
pub use store::{OverlayRevision, ResultStore};
pub use controller::{ResultController, RunOutcome, RunTicket, StaleMaskPolicy};
