pub mod init;
pub mod keys;
pub mod register;
pub mod registry;
