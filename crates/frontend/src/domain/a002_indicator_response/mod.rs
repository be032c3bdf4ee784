pub mod api;
pub mod evidence_api;
pub mod ui;
