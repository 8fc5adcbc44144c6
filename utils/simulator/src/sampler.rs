use std::fmt;

/// Bits sampled from a serial line, oldest first. Append-only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SampledBitStream {
    bits: Vec<bool>,
}

impl SampledBitStream {
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }
}

impl fmt::Display for SampledBitStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Rebuilds the bit-stream carried on a transmit line.
///
/// The shared clock doubles as the bit clock at half rate, so there is one
/// valid sample per two toggles: the line is read on odd cycles, after the
/// rising edge that shifted the bit out has settled. No framing is
/// interpreted here.
#[derive(Debug)]
pub struct SerialSampler {
    line: String,
    stream: SampledBitStream,
}

impl SerialSampler {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            stream: SampledBitStream::default(),
        }
    }

    /// Name of the sampled signal.
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn maybe_sample(&mut self, cycle_index: u64, tx_bit: bool) -> Option<bool> {
        if cycle_index % 2 == 1 {
            self.stream.push(tx_bit);
            Some(tx_bit)
        } else {
            None
        }
    }

    pub fn stream(&self) -> &SampledBitStream {
        &self.stream
    }

    pub fn into_stream(self) -> SampledBitStream {
        self.stream
    }
}
