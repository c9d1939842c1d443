pub mod error;
pub mod jsonrpc;
pub mod song;
