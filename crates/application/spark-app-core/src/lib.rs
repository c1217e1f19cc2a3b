mod async_runtime;
pub mod app_core;
pub mod chat;
pub mod domain;
pub mod kernel;
pub mod persistence;
pub mod ports;
pub mod progress;
pub mod viewmodel;

pub use app_core::*;
pub use chat::{ChatHistory, ChatMessage, MessageMeta};
pub use domain::{AppSettings, AppState, BootState, ConnectionState, StudentProfile};
pub use kernel::AppKernel;
pub use persistence::FilePersistence;
pub use ports::*;
pub use progress::{progress_percent, reduce_run, RunEvent, RunId, RunPhase, RunState};
pub use viewmodel::*;
