pub mod export;
pub mod gui;
pub mod logging;
pub mod media;
pub mod remote;
pub mod render;
pub mod roi;
pub mod settings;
pub mod toast_log;
pub mod workflow;
