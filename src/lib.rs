// sanitizer-demos: catalog, banners and the pattern self-check shared by the demo binaries

pub mod catalog;
pub mod config;
pub mod driver;
pub mod json_output;
pub mod logging;
pub mod patterns;
pub mod types;
pub mod verify;
