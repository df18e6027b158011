pub mod detection_sidebar;
pub mod header;
pub mod options_panel;
pub mod overlay_canvas;
pub mod preview_panels;
pub mod upload_area;
