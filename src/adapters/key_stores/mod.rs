pub mod dual_index;
pub mod file_key_pair_storage;
pub mod mem_key_pair_storage;
