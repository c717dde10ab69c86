pub mod cache;
pub mod record_file;
pub mod serial;
