use crate::sampler::SampledBitStream;

/// UART frame decoder over an already sampled bit-stream
///
/// Protocol: 1 start bit (0), 8 data bits (LSB first), 1 stop bit (1)
/// Idle state: line is high (1)
///
/// Unlike the sampler this is frame-aware, so it only ever runs on a finished
/// stream and never feeds back into the run.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    state: FrameState,
    data: u8,
    bit_index: u8,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum FrameState {
    #[default]
    Idle,
    Data,
    Stop,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    Byte(u8),
    /// Stop bit was low; the frame is dropped.
    FramingError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedFrames {
    pub bytes: Vec<u8>,
    pub framing_errors: usize,
}

impl DecodedFrames {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one sampled bit
    /// Returns an event once a frame has been closed by its stop bit
    pub fn process(&mut self, bit: bool) -> Option<FrameEvent> {
        match self.state {
            FrameState::Idle => {
                // Start bit: first low sample after idle
                if !bit {
                    self.state = FrameState::Data;
                    self.data = 0;
                    self.bit_index = 0;
                }
                None
            }
            FrameState::Data => {
                if bit {
                    self.data |= 1 << self.bit_index;
                }
                self.bit_index += 1;
                if self.bit_index == 8 {
                    self.state = FrameState::Stop;
                }
                None
            }
            FrameState::Stop => {
                self.state = FrameState::Idle;
                if bit {
                    Some(FrameEvent::Byte(self.data))
                } else {
                    Some(FrameEvent::FramingError)
                }
            }
        }
    }

    pub fn decode(stream: &SampledBitStream) -> DecodedFrames {
        let mut decoder = Self::new();
        let mut frames = DecodedFrames::default();
        for &bit in stream.bits() {
            match decoder.process(bit) {
                Some(FrameEvent::Byte(byte)) => frames.bytes.push(byte),
                Some(FrameEvent::FramingError) => frames.framing_errors += 1,
                None => {}
            }
        }
        frames
    }
}
