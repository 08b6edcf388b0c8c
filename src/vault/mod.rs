//! Vault module — the encrypted bot configuration file.
//!
//! This module provides:
//! - The binary envelope layout (`format`)
//! - Sealing and opening payloads (`cipher`)
//! - Crash-safe file writes (`atomic`)
//! - Whole-file seal+write / read+open helpers (`files`)
//! - The decrypted `Configuration` and `BotProfile` types (`profile`)
//! - The open-vault session `ProfileStore` (`store`)

pub mod atomic;
pub mod cipher;
pub mod files;
pub mod format;
pub mod profile;
pub mod store;

// Re-export the most commonly used items.
pub use cipher::{open, seal, VaultCipher};
pub use files::{create_file, load_file, replace_file};
pub use format::Envelope;
pub use profile::{parse_configuration, BotDraft, BotProfile, Configuration};
pub use store::ProfileStore;
