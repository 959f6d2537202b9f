//! Interactive front end for reviewbot

mod chat;
mod config;
mod history;
pub mod logging;
mod ui;


pub use chat::ReviewChat;
pub use config::AppConfig;
pub use history::FileHistoryStore;
pub use ui::{
    BannerInfo, InputSource, LineInput, LoopState, LoopSummary, PROMPT, QUIT, TerminalInput,
    display_banner, run_loop,
};

// Re-export core types
pub use reviewbot_core::{Error, Result};
