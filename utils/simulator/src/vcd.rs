use std::io::Write;

use tracing::debug;

use crate::clock::Edge;
use crate::error::Result;
use crate::recorder::SignalSnapshot;
use crate::signal::{SignalDesc, SignalValue, SignalWidth};
use crate::trace::TraceSink;

struct VcdVar {
    name: String,
    id: String,
    last: Option<String>,
}

/// Value change dump of the clock and the recorded signals.
///
/// Time advances by one unit per cycle. The clock is always the first
/// variable, so a recorded clock is not declared again. Byte-buffer signals
/// have no sensible waveform and are left out of the dump.
pub struct VcdWriter<W: Write> {
    out: W,
    scope: String,
    clock: VcdVar,
    vars: Vec<VcdVar>,
    header: Vec<(String, usize)>,
    header_written: bool,
}

/// Short printable identifier, `!` through `~` in base 94.
fn identifier(mut index: usize) -> String {
    let mut id = String::new();
    loop {
        id.push((b'!' + (index % 94) as u8) as char);
        index /= 94;
        if index == 0 {
            break id;
        }
        index -= 1;
    }
}

fn encode(value: &SignalValue) -> Option<String> {
    match value {
        SignalValue::Bit(bit) => Some(u8::from(*bit).to_string()),
        SignalValue::Word(word) => Some(format!("b{word:b} ")),
        SignalValue::Bytes(_) => None,
    }
}

impl<W: Write> VcdWriter<W> {
    pub fn new(out: W, scope: &str, clock: &str, signals: &[SignalDesc]) -> Self {
        let mut header = vec![(clock.to_owned(), 1)];
        let mut vars = Vec::new();
        for signal in signals {
            if signal.name == clock {
                continue;
            }
            if matches!(signal.width, SignalWidth::Bytes(_)) {
                debug!(signal = signal.name, "skipping byte buffer in VCD dump");
                continue;
            }
            vars.push(VcdVar {
                name: signal.name.to_owned(),
                id: identifier(vars.len() + 1),
                last: None,
            });
            header.push((signal.name.to_owned(), signal.width.bits()));
        }

        Self {
            out,
            scope: scope.to_owned(),
            clock: VcdVar {
                name: clock.to_owned(),
                id: identifier(0),
                last: None,
            },
            vars,
            header,
            header_written: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_header(&mut self) -> Result<()> {
        writeln!(self.out, "$timescale 1ns $end")?;
        writeln!(self.out, "$scope module {} $end", self.scope)?;
        let ids = std::iter::once(&self.clock.id).chain(self.vars.iter().map(|var| &var.id));
        for ((name, width), id) in self.header.iter().zip(ids) {
            writeln!(self.out, "$var wire {width} {id} {name} $end")?;
        }
        writeln!(self.out, "$upscope $end")?;
        writeln!(self.out, "$enddefinitions $end")?;
        self.header_written = true;
        Ok(())
    }
}

impl<W: Write> TraceSink for VcdWriter<W> {
    fn begin_cycle(&mut self, cycle: u64, edge: Edge) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }
        writeln!(self.out, "#{cycle}")?;
        let level = if edge == Edge::Rising { "1" } else { "0" };
        writeln!(self.out, "{level}{}", self.clock.id)?;
        self.clock.last = Some(level.to_owned());
        Ok(())
    }

    fn record(&mut self, _cycle: u64, snapshot: &SignalSnapshot) -> Result<()> {
        for var in &mut self.vars {
            let Some(encoded) = snapshot.get(&var.name).and_then(encode) else {
                continue;
            };
            if var.last.as_deref() != Some(encoded.as_str()) {
                writeln!(self.out, "{encoded}{}", var.id)?;
                var.last = Some(encoded);
            }
        }
        Ok(())
    }

    fn end(&mut self, cycles: u64) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }
        writeln!(self.out, "#{cycles}")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for VcdWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VcdWriter")
            .field("scope", &self.scope)
            .field("clock", &self.clock.name)
            .field("signals", &self.vars.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_unique_and_printable() {
        let ids: Vec<String> = (0..300).map(identifier).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert!(ids.iter().flat_map(|id| id.chars()).all(|c| c.is_ascii_graphic()));
    }

    #[test]
    fn header_lists_clock_and_word_signals() {
        let signals = [
            SignalDesc::output("count", SignalWidth::Word(4)),
            SignalDesc::input("data", SignalWidth::Bytes(8)),
        ];
        let mut vcd = VcdWriter::new(Vec::new(), "fifo", "clk", &signals);
        vcd.begin_cycle(0, Edge::Rising).unwrap();
        vcd.end(1).unwrap();

        let text = String::from_utf8(vcd.into_inner()).unwrap();
        assert!(text.contains("$var wire 1 ! clk $end"));
        assert!(text.contains("$var wire 4 \" count $end"));
        assert!(!text.contains("data"));
        assert!(text.contains("#0\n1!"));
        assert!(text.ends_with("#1\n"));
    }

    #[test]
    fn recorded_clock_is_declared_once() {
        let signals = [
            SignalDesc::output("tx", SignalWidth::Bit),
            SignalDesc::input("clock", SignalWidth::Bit),
        ];
        let mut vcd = VcdWriter::new(Vec::new(), "serial", "clock", &signals);
        vcd.begin_cycle(0, Edge::Rising).unwrap();
        vcd.end(1).unwrap();

        let text = String::from_utf8(vcd.into_inner()).unwrap();
        assert_eq!(text.matches(" clock $end").count(), 1);
        assert!(text.contains("$var wire 1 \" tx $end"));
    }
}
