mod evaluation_page;
mod evidence_panel;
mod indicator_row;

pub use evaluation_page::EvaluationPage;
pub use evidence_panel::EvidencePanel;
pub use indicator_row::IndicatorRow;
