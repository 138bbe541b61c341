pub mod archive;
pub mod remote_store;
pub mod scratch;
pub mod transfer;
