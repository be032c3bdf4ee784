pub mod lang;
pub mod validation;
