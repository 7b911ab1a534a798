/// Constants shared between the ingest pipeline and the viewing session
pub mod coordinate_system;
pub mod las_layout;
pub mod render_settings;
