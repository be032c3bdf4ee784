pub mod page_header;
pub mod progress_bar;
pub mod score_card;
pub mod ui;
