/// Direction of a clock transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    pub fn of(level: bool) -> Self {
        if level { Edge::Rising } else { Edge::Falling }
    }

    /// Trace marker for this edge.
    pub fn marker(self) -> &'static str {
        match self {
            Edge::Rising => "--POSEDGE--",
            Edge::Falling => "--NEGEDGE--",
        }
    }
}

/// Flips the clock and reports which edge that produced.
pub fn toggle(current: bool) -> (bool, Edge) {
    let next = !current;
    (next, Edge::of(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_alternates() {
        assert_eq!(toggle(false), (true, Edge::Rising));
        assert_eq!(toggle(true), (false, Edge::Falling));
    }

    #[test]
    fn markers() {
        assert_eq!(Edge::Rising.marker(), "--POSEDGE--");
        assert_eq!(Edge::Falling.marker(), "--NEGEDGE--");
    }
}
