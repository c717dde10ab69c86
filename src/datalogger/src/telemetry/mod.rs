pub mod codecs;
pub mod sinks;
