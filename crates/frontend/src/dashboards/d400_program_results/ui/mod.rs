mod dashboard;

pub use dashboard::ProgramResultsDashboard;
