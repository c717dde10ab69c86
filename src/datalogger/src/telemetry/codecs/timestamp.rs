use core::fmt;

use util::FixedBuf;

/// Elapsed time after which a record gets a fresh absolute stamp.
pub const ABSOLUTE_REFRESH_MS: u32 = 60000;

/// `#4294967295,`
pub const TIMESTAMP_CAPACITY: usize = 12;

pub type TimestampBuf = FixedBuf<TIMESTAMP_CAPACITY>;

/// Time prefix of a record: either the full clock value or the delta from the
/// previously recorded entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timestamp {
    Absolute(u32),
    Relative(u16),
}

impl Timestamp {
    pub fn select(data_time: u32, last_data_time: u32, absolute: bool) -> Timestamp {
        if absolute {
            return Timestamp::Absolute(data_time);
        }
        // a clock that went backwards re-anchors instead of wrapping
        match data_time.checked_sub(last_data_time) {
            Some(elapsed) if elapsed < ABSOLUTE_REFRESH_MS => Timestamp::Relative(elapsed as u16),
            _ => Timestamp::Absolute(data_time),
        }
    }

    /// Renders the stamp with its trailing separator.
    pub fn encode(&self) -> TimestampBuf {
        let mut buf = TimestampBuf::new();
        // the widest stamp is exactly TIMESTAMP_CAPACITY bytes
        let _ = fmt::Write::write_fmt(&mut buf, format_args!("{}", self));
        buf
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Absolute(time) => write!(f, "#{},", time),
            Timestamp::Relative(elapsed) => write!(f, "{},", elapsed),
        }
    }
}
