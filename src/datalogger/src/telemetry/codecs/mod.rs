pub mod record_codec;
pub mod timestamp;
