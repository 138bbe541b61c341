pub mod config;
pub mod error;
pub mod infrastructure;
pub mod services;
pub mod utils;

pub use crate::config::TransferConfig;
pub use crate::error::TransferError;
pub use crate::services::remote_store::{RemoteFile, RemoteStore};
pub use crate::services::transfer::TransferService;
