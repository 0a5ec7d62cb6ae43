pub mod key_pair;
pub mod registration;
