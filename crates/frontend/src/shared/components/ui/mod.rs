pub mod badge;
pub mod button;

pub use badge::{Badge, EntryStateBadge, GradeBadge};
pub use button::Button;
