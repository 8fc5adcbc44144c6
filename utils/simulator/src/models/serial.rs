use crate::error::{Result, SimError};
use crate::model::SimulatedModel;
use crate::signal::{ByteBuffer, SignalDesc, SignalValue, SignalWidth};

/// Capacity of the `data_buffer` input.
pub const DATA_BUFFER_BYTES: usize = 32;

/// Start bit, eight data bits, stop bit.
const FRAME_BITS: u8 = 10;

const SIGNALS: &[SignalDesc] = &[
    SignalDesc::output("tx", SignalWidth::Bit),
    SignalDesc::input("clock", SignalWidth::Bit),
    SignalDesc::input("data_buffer", SignalWidth::Bytes(DATA_BUFFER_BYTES)),
    SignalDesc::input("proceed", SignalWidth::Bit),
    SignalDesc::output("buffer_pos", SignalWidth::Word(8)),
    SignalDesc::output("frame_pos", SignalWidth::Word(4)),
];

/// UART transmitter.
///
/// While `proceed` is high, every rising edge shifts one bit of the current
/// byte onto `tx`, 8N1 and LSB first. Transmission stops at the first NUL or
/// at the end of the loaded payload, after which the line idles high.
#[derive(Debug, Clone)]
pub struct SerialModel {
    clock: bool,
    prev_clock: bool,
    data_buffer: ByteBuffer,
    proceed: bool,
    tx: bool,
    buffer_pos: usize,
    frame_pos: u8,
}

impl SerialModel {
    pub fn new() -> Self {
        Self {
            clock: false,
            prev_clock: false,
            data_buffer: ByteBuffer::with_capacity(DATA_BUFFER_BYTES),
            proceed: false,
            tx: true,
            buffer_pos: 0,
            frame_pos: 0,
        }
    }

    fn posedge(&mut self) {
        let byte = match self.data_buffer.byte_at(self.buffer_pos) {
            Some(byte) if self.proceed && byte != 0 => byte,
            _ => {
                self.tx = true;
                return;
            }
        };

        self.tx = match self.frame_pos {
            0 => false,
            bit @ 1..=8 => (byte >> (bit - 1)) & 1 == 1,
            _ => true,
        };

        self.frame_pos += 1;
        if self.frame_pos == FRAME_BITS {
            self.frame_pos = 0;
            self.buffer_pos += 1;
        }
    }
}

impl Default for SerialModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedModel for SerialModel {
    fn name(&self) -> &str {
        "serial"
    }

    fn signals(&self) -> &[SignalDesc] {
        SIGNALS
    }

    fn get_signal(&self, name: &str) -> Option<SignalValue> {
        let value = match name {
            "tx" => SignalValue::Bit(self.tx),
            "clock" => SignalValue::Bit(self.clock),
            "data_buffer" => SignalValue::Bytes(self.data_buffer.clone()),
            "proceed" => SignalValue::Bit(self.proceed),
            "buffer_pos" => SignalValue::Word(self.buffer_pos as u64),
            "frame_pos" => SignalValue::Word(self.frame_pos.into()),
            _ => return None,
        };
        Some(value)
    }

    fn set_signal(&mut self, name: &str, value: SignalValue) -> Result<()> {
        match name {
            "clock" => self.clock = value.to_bit(name)?,
            "proceed" => self.proceed = value.to_bit(name)?,
            "data_buffer" => {
                let bytes = value.to_bytes(name)?.as_bytes();
                if !self.data_buffer.fill(bytes) {
                    return Err(SimError::BufferOverflow {
                        name: name.to_owned(),
                        capacity: DATA_BUFFER_BYTES,
                        len: bytes.len(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn evaluate(&mut self) {
        if self.clock && !self.prev_clock {
            self.posedge();
        }
        self.prev_clock = self.clock;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(model: &mut SerialModel) -> bool {
        model.set_signal("clock", SignalValue::Bit(true)).unwrap();
        model.evaluate();
        let tx = model.tx;
        model.set_signal("clock", SignalValue::Bit(false)).unwrap();
        model.evaluate();
        tx
    }

    #[test]
    fn shifts_one_frame_lsb_first() {
        let mut model = SerialModel::new();
        model
            .set_signal("data_buffer", SignalValue::from("A"))
            .unwrap();
        model.set_signal("proceed", SignalValue::Bit(true)).unwrap();

        let bits: Vec<bool> = (0..12).map(|_| edge(&mut model)).collect();
        // 'A' = 0x41 -> 1000_0010 on the wire, framed by 0 ... 1, then idle.
        let expected = [
            false, true, false, false, false, false, false, true, false, true, true, true,
        ];
        assert_eq!(bits, expected);
        assert_eq!(model.buffer_pos, 1);
        assert_eq!(model.frame_pos, 0);
    }

    #[test]
    fn idles_high_without_proceed() {
        let mut model = SerialModel::new();
        model
            .set_signal("data_buffer", SignalValue::from("A"))
            .unwrap();
        assert!((0..4).all(|_| edge(&mut model)));
        assert_eq!(model.buffer_pos, 0);
    }

    #[test]
    fn data_buffer_reads_as_c_string() {
        let mut model = SerialModel::new();
        model
            .set_signal("data_buffer", SignalValue::from("hail\0toad"))
            .unwrap();
        let value = model.get_signal("data_buffer").unwrap();
        assert_eq!(value.to_string(), "hail");
    }
}
