pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod totp;
pub mod vault;
