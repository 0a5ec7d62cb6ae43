pub mod issuers;
pub mod key_stores;
pub mod private_file;
pub mod registration;
