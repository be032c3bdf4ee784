pub mod aggregate;

pub use aggregate::{Indicator, QualityDomain};
