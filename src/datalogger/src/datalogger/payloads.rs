use serde::{Deserialize, Serialize};

#[derive(Default, Debug)]
pub struct LoggerSettingsValues {
    pub data_log: Option<bool>,
    pub data_cache: Option<bool>,
    pub data_out: Option<bool>,
    pub cache_size: Option<u16>,
    pub stream_baudrate: Option<u32>,
}

/// Settings command as it arrives over the control channel, e.g.
/// `{"data_cache":false,"stream_baudrate":38400}`. Every field is optional.
#[derive(Serialize, Deserialize, Default)]
pub struct LoggerSetPayload {
    pub data_log: Option<bool>,
    pub data_cache: Option<bool>,
    pub data_out: Option<bool>,
    pub cache_size: Option<u16>,
    pub stream_baudrate: Option<u32>,
}

impl LoggerSetPayload {
    pub fn values(self) -> LoggerSettingsValues {
        LoggerSettingsValues {
            data_log: self.data_log,
            data_cache: self.data_cache,
            data_out: self.data_out,
            cache_size: self.cache_size,
            stream_baudrate: self.stream_baudrate,
        }
    }
}
