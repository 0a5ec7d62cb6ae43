pub mod http_registrar;
pub mod kite_key_file;
