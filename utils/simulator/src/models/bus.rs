use crate::error::Result;
use crate::model::SimulatedModel;
use crate::signal::{SignalDesc, SignalValue, SignalWidth};

const MASTERS: usize = 4;

/// Per-master request schedule over an 8-edge period, bit `n` = phase `n`.
const REQUEST_PATTERNS: [u8; MASTERS] = [0b1011_0110, 0b0101_1100, 0b1110_0001, 0b0011_1010];

const SIGNALS: &[SignalDesc] = &[
    SignalDesc::input("clk", SignalWidth::Bit),
    SignalDesc::output("req", SignalWidth::Word(MASTERS as u32)),
    SignalDesc::output("grant", SignalWidth::Word(MASTERS as u32)),
    SignalDesc::output("owner", SignalWidth::Word(2)),
    SignalDesc::output("busy", SignalWidth::Bit),
    SignalDesc::register("transfers", SignalWidth::Word(32)),
];

/// Bus test rig: four masters contending for one bus behind a round-robin
/// arbiter. `grant` is one-hot, `owner` holds the index of the last grantee.
#[derive(Debug, Clone)]
pub struct BusModel {
    clk: bool,
    prev_clk: bool,
    phase: u8,
    req: u8,
    grant: u8,
    owner: u8,
    busy: bool,
    transfers: u32,
}

impl BusModel {
    pub fn new() -> Self {
        Self {
            clk: false,
            prev_clk: false,
            phase: 0,
            req: 0,
            grant: 0,
            // Priority starts at master 0 on the first arbitration.
            owner: (MASTERS - 1) as u8,
            busy: false,
            transfers: 0,
        }
    }

    fn arbitrate(&mut self) {
        self.req = REQUEST_PATTERNS
            .iter()
            .enumerate()
            .filter(|&(_, &pattern)| (pattern >> self.phase) & 1 == 1)
            .fold(0u8, |req, (master, _)| req | (1 << master));
        self.phase = (self.phase + 1) % 8;

        let start = self.owner as usize + 1;
        let winner = (start..start + MASTERS)
            .map(|master| master % MASTERS)
            .find(|&master| (self.req >> master) & 1 == 1);

        match winner {
            Some(master) => {
                self.grant = 1u8 << master;
                self.owner = master as u8;
                self.busy = true;
                self.transfers = self.transfers.wrapping_add(1);
            }
            None => {
                self.grant = 0;
                self.busy = false;
            }
        }
    }
}

impl Default for BusModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedModel for BusModel {
    fn name(&self) -> &str {
        "bus"
    }

    fn signals(&self) -> &[SignalDesc] {
        SIGNALS
    }

    fn get_signal(&self, name: &str) -> Option<SignalValue> {
        let value = match name {
            "clk" => SignalValue::Bit(self.clk),
            "req" => SignalValue::Word(self.req.into()),
            "grant" => SignalValue::Word(self.grant.into()),
            "owner" => SignalValue::Word(self.owner.into()),
            "busy" => SignalValue::Bit(self.busy),
            "transfers" => SignalValue::Word(self.transfers.into()),
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
            self.arbitrate();
        }
        self.prev_clk = self.clk;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(model: &mut BusModel) {
        for level in [true, false] {
            model.set_signal("clk", SignalValue::Bit(level)).unwrap();
            model.evaluate();
        }
    }

    #[test]
    fn grant_is_one_hot_and_requested() {
        let mut model = BusModel::new();
        for _ in 0..32 {
            tick(&mut model);
            assert!(model.grant.count_ones() <= 1);
            assert_eq!(model.grant & !model.req, 0);
            assert_eq!(model.busy, model.grant != 0);
        }
        assert!(model.transfers > 0);
    }

    #[test]
    fn round_robin_rotates_between_contenders() {
        let mut model = BusModel::new();
        // Phase 2 has masters 0 and 1 requesting.
        for _ in 0..3 {
            tick(&mut model);
        }
        let first = model.owner;
        tick(&mut model);
        tick(&mut model);
        assert_ne!(model.owner, first);
    }

    #[test]
    fn falling_edge_holds_state() {
        let mut model = BusModel::new();
        model.set_signal("clk", SignalValue::Bit(true)).unwrap();
        model.evaluate();
        let grant = model.grant;
        model.set_signal("clk", SignalValue::Bit(false)).unwrap();
        model.evaluate();
        assert_eq!(model.grant, grant);
    }
}
