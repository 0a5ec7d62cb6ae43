pub mod key_pair_service;
pub mod registration_service;
