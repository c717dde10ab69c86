use bitfield_struct::bitfield;
use serde_json::{json, Value};
use telelog_board::DEFAULT_STREAM_BAUDRATE;

use crate::datalogger::payloads::{LoggerSetPayload, LoggerSettingsValues};
use crate::error::LoggerError;

pub const LOGGER_SETTINGS_SIZE: usize = 16;
const LOGGER_SETTINGS_UNUSED_BYTES: usize = 9;

pub const DEFAULT_CACHE_SIZE: u16 = 256;
pub const MIN_CACHE_SIZE: u16 = 32;
pub const MAX_CACHE_SIZE: u16 = 8192;

/// Which sinks the logger drives.
#[bitfield(u8)]
pub struct SinkToggles {
    /// persistent CSV file on removable storage
    #[bits(1)]
    pub data_log: bool,

    /// in-memory cache drained by the transmitter
    #[bits(1)]
    pub data_cache: bool,

    /// live serial stream
    #[bits(1)]
    pub data_out: bool,

    #[bits(5)]
    unused: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct LoggerSettings {
    pub toggles: SinkToggles,
    pub cache_size: u16,
    pub stream_baudrate: u32,
    reserved: [u8; LOGGER_SETTINGS_UNUSED_BYTES],
}

impl LoggerSettings {
    pub fn new() -> Self {
        LoggerSettings {
            toggles: SinkToggles::new()
                .with_data_log(true)
                .with_data_cache(true)
                .with_data_out(false),
            cache_size: DEFAULT_CACHE_SIZE,
            stream_baudrate: DEFAULT_STREAM_BAUDRATE,
            reserved: [b'\0'; LOGGER_SETTINGS_UNUSED_BYTES],
        }
    }

    pub fn from_bytes(bytes: [u8; LOGGER_SETTINGS_SIZE]) -> LoggerSettings {
        let mut reserved = [b'\0'; LOGGER_SETTINGS_UNUSED_BYTES];
        reserved.clone_from_slice(&bytes[7..LOGGER_SETTINGS_SIZE]);
        LoggerSettings {
            toggles: SinkToggles::from_bits(bytes[0]),
            cache_size: u16::from_le_bytes([bytes[1], bytes[2]]),
            stream_baudrate: u32::from_le_bytes([bytes[3], bytes[4], bytes[5], bytes[6]]),
            reserved,
        }
    }

    pub fn to_bytes(&self) -> [u8; LOGGER_SETTINGS_SIZE] {
        let mut bytes: [u8; LOGGER_SETTINGS_SIZE] = [0; LOGGER_SETTINGS_SIZE];
        bytes[0] = self.toggles.into_bits();
        bytes[1..3].clone_from_slice(&self.cache_size.to_le_bytes());
        bytes[3..7].clone_from_slice(&self.stream_baudrate.to_le_bytes());
        bytes[7..].clone_from_slice(&self.reserved);
        bytes
    }

    pub fn from_json(bytes: &[u8]) -> Result<LoggerSettings, LoggerError> {
        let payload: LoggerSetPayload =
            serde_json::from_slice(bytes).map_err(LoggerError::InvalidSettings)?;
        Ok(LoggerSettings::new().with_values(payload.values()).configure_defaults())
    }

    pub fn configure_defaults(self) -> LoggerSettings {
        let mut settings = self.clone();

        if self.cache_size < MIN_CACHE_SIZE || self.cache_size > MAX_CACHE_SIZE {
            settings.cache_size = DEFAULT_CACHE_SIZE;
        }

        if self.stream_baudrate == 0 {
            settings.stream_baudrate = DEFAULT_STREAM_BAUDRATE;
        }

        settings
    }

    pub fn with_values(self, values: LoggerSettingsValues) -> LoggerSettings {
        let mut settings = self.clone();
        settings
            .toggles
            .set_data_log(values.data_log.unwrap_or(self.toggles.data_log()));
        settings
            .toggles
            .set_data_cache(values.data_cache.unwrap_or(self.toggles.data_cache()));
        settings
            .toggles
            .set_data_out(values.data_out.unwrap_or(self.toggles.data_out()));
        settings.cache_size = values.cache_size.unwrap_or(self.cache_size);
        settings.stream_baudrate = values.stream_baudrate.unwrap_or(self.stream_baudrate);
        settings
    }

    pub fn describe(&self) -> Value {
        json!({
            "data_log": self.toggles.data_log(),
            "data_cache": self.toggles.data_cache(),
            "data_out": self.toggles.data_out(),
            "cache_size": self.cache_size,
            "stream_baudrate": self.stream_baudrate,
        })
    }
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = LoggerSettings::new();
        assert!(settings.toggles.data_log());
        assert!(settings.toggles.data_cache());
        assert!(!settings.toggles.data_out());
        assert_eq!(settings.cache_size, 256);
        assert_eq!(settings.stream_baudrate, 115200);
    }

    #[test]
    fn test_bytes_survive_storage() {
        let mut settings = LoggerSettings::new();
        settings.toggles.set_data_out(true);
        settings.cache_size = 1024;
        settings.stream_baudrate = 38400;
        let bytes = settings.to_bytes();
        assert_eq!(bytes.len(), LOGGER_SETTINGS_SIZE);
        assert_eq!(&bytes[1..3], &1024u16.to_le_bytes());
        let restored = LoggerSettings::from_bytes(bytes);
        assert_eq!(restored.toggles.into_bits(), settings.toggles.into_bits());
        assert_eq!(restored.cache_size, 1024);
        assert_eq!(restored.stream_baudrate, 38400);
    }

    #[test]
    fn test_configure_defaults_repairs_blank_eeprom() {
        let settings =
            LoggerSettings::from_bytes([0xFF; LOGGER_SETTINGS_SIZE]).configure_defaults();
        assert_eq!(settings.cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(settings.stream_baudrate, u32::MAX);

        let settings =
            LoggerSettings::from_bytes([0; LOGGER_SETTINGS_SIZE]).configure_defaults();
        assert_eq!(settings.cache_size, DEFAULT_CACHE_SIZE);
        assert_eq!(settings.stream_baudrate, DEFAULT_STREAM_BAUDRATE);
        assert_eq!(settings.toggles.into_bits(), 0);
    }

    #[test]
    fn test_from_json() {
        let settings =
            LoggerSettings::from_json(br#"{"data_out":true,"data_log":false,"cache_size":512}"#)
                .unwrap();
        assert!(!settings.toggles.data_log());
        assert!(settings.toggles.data_cache());
        assert!(settings.toggles.data_out());
        assert_eq!(settings.cache_size, 512);
        assert_eq!(settings.stream_baudrate, DEFAULT_STREAM_BAUDRATE);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            LoggerSettings::from_json(b"{\"cache_size\":\"big\"}"),
            Err(LoggerError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_describe() {
        let described = LoggerSettings::new().describe();
        assert_eq!(described["cache_size"], 256);
        assert_eq!(described["data_out"], false);
    }
}
