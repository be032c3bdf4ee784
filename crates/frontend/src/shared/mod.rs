pub mod api_client;
pub mod api_utils;
pub mod components;
pub mod config;
pub mod dialogs;
pub mod export;
pub mod state;
