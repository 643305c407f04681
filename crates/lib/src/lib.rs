//! Askline core library — configuration, signature verification, the LINE
//! webhook pipeline, and the answer-generation client used by the CLI.

pub mod answer;
pub mod config;
pub mod dispatch;
pub mod events;
pub mod flex;
pub mod line;
pub mod markdown;
pub mod postprocess;
pub mod server;
pub mod signature;
pub mod webhook;
