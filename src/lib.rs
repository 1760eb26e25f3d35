pub mod app;
pub mod batch;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod format;
pub mod html;
pub mod localize;
pub mod merge;
pub mod output;
pub mod page;
pub mod render;
pub mod roblox;
pub mod tui;
