use crate::error::Result;
use crate::model::SimulatedModel;
use crate::signal::{SignalDesc, SignalValue, SignalWidth};

const DEPTH: usize = 8;

/// Edges between two pops; pushes happen on every edge.
const POP_INTERVAL: u64 = 3;

const SIGNALS: &[SignalDesc] = &[
    SignalDesc::input("clk", SignalWidth::Bit),
    SignalDesc::output("count", SignalWidth::Word(4)),
    SignalDesc::output("full", SignalWidth::Bit),
    SignalDesc::output("empty", SignalWidth::Bit),
    SignalDesc::output("data_out", SignalWidth::Word(8)),
    SignalDesc::register("wr_ptr", SignalWidth::Word(3)),
    SignalDesc::register("rd_ptr", SignalWidth::Word(3)),
];

/// Eight-entry byte FIFO with a built-in producer and a slower consumer, so
/// the queue fills up and then runs at the consumer's pace.
#[derive(Debug, Clone)]
pub struct FifoModel {
    clk: bool,
    prev_clk: bool,
    slots: [u8; DEPTH],
    wr_ptr: usize,
    rd_ptr: usize,
    count: usize,
    next_value: u8,
    data_out: u8,
    edges: u64,
}

impl FifoModel {
    pub fn new() -> Self {
        Self {
            clk: false,
            prev_clk: false,
            slots: [0; DEPTH],
            wr_ptr: 0,
            rd_ptr: 0,
            count: 0,
            next_value: 0,
            data_out: 0,
            edges: 0,
        }
    }

    fn posedge(&mut self) {
        // Pop before push so a full queue still accepts on a pop edge.
        if self.edges % POP_INTERVAL == POP_INTERVAL - 1 && self.count > 0 {
            self.data_out = self.slots[self.rd_ptr];
            self.rd_ptr = (self.rd_ptr + 1) % DEPTH;
            self.count -= 1;
        }
        if self.count < DEPTH {
            self.slots[self.wr_ptr] = self.next_value;
            self.wr_ptr = (self.wr_ptr + 1) % DEPTH;
            self.next_value = self.next_value.wrapping_add(1);
            self.count += 1;
        }
        self.edges += 1;
    }
}

impl Default for FifoModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedModel for FifoModel {
    fn name(&self) -> &str {
        "fifo"
    }

    fn signals(&self) -> &[SignalDesc] {
        SIGNALS
    }

    fn get_signal(&self, name: &str) -> Option<SignalValue> {
        let value = match name {
            "clk" => SignalValue::Bit(self.clk),
            "count" => SignalValue::Word(self.count as u64),
            "full" => SignalValue::Bit(self.count == DEPTH),
            "empty" => SignalValue::Bit(self.count == 0),
            "data_out" => SignalValue::Word(self.data_out.into()),
            "wr_ptr" => SignalValue::Word(self.wr_ptr as u64),
            "rd_ptr" => SignalValue::Word(self.rd_ptr as u64),
            _ => return None,
        };
        Some(value)
    }

    fn set_signal(&mut self, name: &str, value: SignalValue) -> Result<()> {
        if name == "clk" {
            self.clk = value.to_bit(name)?;
        }
        Ok(())
    }

    fn evaluate(&mut self) {
        if self.clk && !self.prev_clk {
            self.posedge();
        }
        self.prev_clk = self.clk;
    }
}
