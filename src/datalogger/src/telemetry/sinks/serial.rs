use alloc::boxed::Box;
use rtt_target::rprintln;
use telelog_board::SerialStream;

/// Live output of raw records, one per line, no stamp.
pub struct SerialSink {
    port: Box<dyn SerialStream>,
    baudrate: u32,
}

impl SerialSink {
    pub fn new(port: Box<dyn SerialStream>, baudrate: u32) -> Self {
        SerialSink { port, baudrate }
    }

    pub fn begin(&mut self) {
        rprintln!("serial out at {} bps", self.baudrate);
        self.port.begin(self.baudrate);
    }

    /// Best effort: failures are reported on RTT and otherwise ignored.
    pub fn send(&mut self, record: &[u8]) {
        if let Err(err) = self.port.write(record) {
            rprintln!("serial write failed: {:?}", err);
            return;
        }
        if let Err(err) = self.port.write_line_terminator() {
            rprintln!("serial write failed: {:?}", err);
        }
    }
}
