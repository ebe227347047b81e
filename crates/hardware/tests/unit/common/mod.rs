pub mod bits;
pub mod error;
pub mod register_file;
