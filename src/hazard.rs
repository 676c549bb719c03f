use crate::maze::{Grid, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hazard {
    pub pos: Pos,
    pub dx: isize,
    pub dy: isize,
}

impl Hazard {
    pub fn new(pos: Pos, dx: isize, dy: isize) -> Self {
        Self { pos, dx, dy }
    }

    /// Each axis is checked on its own first. If the diagonal target is still
    /// blocked afterwards (a lone wall on the corner) the hazard bounces
    /// straight back and holds its cell for this tick.
    pub fn step(&mut self, grid: &Grid) {
        if grid.open_neighbor(self.pos, self.dx, 0).is_none() {
            self.dx = -self.dx;
        }
        if grid.open_neighbor(self.pos, 0, self.dy).is_none() {
            self.dy = -self.dy;
        }
        match grid.open_neighbor(self.pos, self.dx, self.dy) {
            Some(next) => self.pos = next,
            None => {
                self.dx = -self.dx;
                self.dy = -self.dy;
            }
        }
    }
}
