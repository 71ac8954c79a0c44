pub mod audio;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod link;
mod logging;
pub mod speech;
pub mod telemetry;
pub mod terminal_restore;
pub mod voice;

pub use logging::{
    init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
