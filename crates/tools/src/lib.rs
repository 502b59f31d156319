pub mod config_file;
pub mod random_map;
