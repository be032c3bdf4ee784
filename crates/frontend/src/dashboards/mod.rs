pub mod d400_program_results;

pub use d400_program_results::ui::ProgramResultsDashboard;
