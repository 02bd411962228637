// Heritage Brander library
// Webhook-driven corner-logo branding for images in object storage

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod jpeg;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod watermark;
