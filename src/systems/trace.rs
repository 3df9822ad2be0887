//! Optional move log used to verify that no particle moves twice per pass.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TracedMove {
    pub pass: u32,
    pub from: u32,
    pub to: u32,
}

#[derive(Default, Debug)]
pub struct MoveTrace {
    pass: u32,
    moves: Vec<TracedMove>,
}

impl MoveTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_pass(&mut self) {
        self.pass += 1;
    }

    #[inline]
    pub fn record(&mut self, from: usize, to: usize) {
        self.moves.push(TracedMove { pass: self.pass, from: from as u32, to: to as u32 });
    }

    pub fn moves(&self) -> &[TracedMove] {
        &self.moves
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Moves that started from a cell an earlier move of the same pass
    /// delivered a particle to.
    pub fn repeated_moves(&self) -> Vec<TracedMove> {
        let mut out = Vec::new();
        let mut landed = std::collections::HashSet::new();
        let mut pass = None;
        for m in &self.moves {
            if pass != Some(m.pass) {
                landed.clear();
                pass = Some(m.pass);
            }
            if landed.contains(&m.from) {
                out.push(*m);
            }
            landed.insert(m.to);
        }
        out
    }
}
