//! Key pair registry for a kite authority.
//!
//! The core is [`KeyPairStorage`](core::traits::key_pair_storage::KeyPairStorage):
//! key pairs reachable both by id and by public key, with
//! [`MemKeyPairStorage`](adapters::key_stores::mem_key_pair_storage::MemKeyPairStorage)
//! as the in-memory engine and
//! [`FileKeyPairStorage`](adapters::key_stores::file_key_pair_storage::FileKeyPairStorage)
//! persisting the same indexes to disk.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
