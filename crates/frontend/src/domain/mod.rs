pub mod a001_quality_domain;
pub mod a002_indicator_response;
pub mod a003_program;
