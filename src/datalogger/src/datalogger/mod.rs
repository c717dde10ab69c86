pub mod payloads;
pub mod settings;
