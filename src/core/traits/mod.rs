pub mod key_issuer;
pub mod key_pair_storage;
pub mod registrar;
