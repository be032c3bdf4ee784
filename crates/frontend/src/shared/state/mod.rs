pub mod loadable;
pub mod response_store;
