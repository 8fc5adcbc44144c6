use std::io::Write;

use crate::clock::Edge;
use crate::error::Result;
use crate::recorder::SignalSnapshot;
use crate::sampler::SampledBitStream;

/// Receives what the orchestrator observes, cycle by cycle.
///
/// Sinks are purely observational; whatever they do with the data has no
/// effect on the run.
pub trait TraceSink {
    /// Called right after the clock toggle, before the model is evaluated.
    fn begin_cycle(&mut self, cycle: u64, edge: Edge) -> Result<()>;

    fn record(&mut self, cycle: u64, snapshot: &SignalSnapshot) -> Result<()>;

    /// Running bit-stream of a sampled scenario, once per cycle.
    fn bitstream(&mut self, _cycle: u64, _stream: &SampledBitStream) -> Result<()> {
        Ok(())
    }

    /// Called exactly once when the run stops, including on errors.
    fn end(&mut self, cycles: u64) -> Result<()>;
}

impl<T: TraceSink + ?Sized> TraceSink for Box<T> {
    fn begin_cycle(&mut self, cycle: u64, edge: Edge) -> Result<()> {
        (**self).begin_cycle(cycle, edge)
    }

    fn record(&mut self, cycle: u64, snapshot: &SignalSnapshot) -> Result<()> {
        (**self).record(cycle, snapshot)
    }

    fn bitstream(&mut self, cycle: u64, stream: &SampledBitStream) -> Result<()> {
        (**self).bitstream(cycle, stream)
    }

    fn end(&mut self, cycles: u64) -> Result<()> {
        (**self).end(cycles)
    }
}

/// Line-oriented text trace:
///
/// ```text
/// --NEXT EVAL--
/// --POSEDGE--
/// tx	1
/// received_data	0100
/// ...
/// --END--
/// ```
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    out: W,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for TraceWriter<W> {
    fn begin_cycle(&mut self, _cycle: u64, edge: Edge) -> Result<()> {
        writeln!(self.out, "--NEXT EVAL--")?;
        writeln!(self.out, "{}", edge.marker())?;
        Ok(())
    }

    fn record(&mut self, _cycle: u64, snapshot: &SignalSnapshot) -> Result<()> {
        for (name, value) in snapshot.iter() {
            writeln!(self.out, "{name}\t{value}")?;
        }
        Ok(())
    }

    fn bitstream(&mut self, _cycle: u64, stream: &SampledBitStream) -> Result<()> {
        writeln!(self.out, "received_data\t{stream}")?;
        Ok(())
    }

    fn end(&mut self, _cycles: u64) -> Result<()> {
        writeln!(self.out, "--END--")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn begin_cycle(&mut self, _cycle: u64, _edge: Edge) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, _cycle: u64, _snapshot: &SignalSnapshot) -> Result<()> {
        Ok(())
    }

    fn end(&mut self, _cycles: u64) -> Result<()> {
        Ok(())
    }
}

/// Forwards every event to two sinks, first to `a`.
#[derive(Debug)]
pub struct Tee<A, B> {
    pub a: A,
    pub b: B,
}

impl<A: TraceSink, B: TraceSink> Tee<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn begin_cycle(&mut self, cycle: u64, edge: Edge) -> Result<()> {
        self.a.begin_cycle(cycle, edge)?;
        self.b.begin_cycle(cycle, edge)
    }

    fn record(&mut self, cycle: u64, snapshot: &SignalSnapshot) -> Result<()> {
        self.a.record(cycle, snapshot)?;
        self.b.record(cycle, snapshot)
    }

    fn bitstream(&mut self, cycle: u64, stream: &SampledBitStream) -> Result<()> {
        self.a.bitstream(cycle, stream)?;
        self.b.bitstream(cycle, stream)
    }

    fn end(&mut self, cycles: u64) -> Result<()> {
        // Both sinks get closed even if the first one fails.
        let first = self.a.end(cycles);
        let second = self.b.end(cycles);
        first.and(second)
    }
}
