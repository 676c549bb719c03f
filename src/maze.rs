use rand::seq::SliceRandom;
use rand::Rng;

use crate::hazard::Hazard;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Wall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: isize, dy: isize) -> Option<Pos> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Pos { x, y })
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn tile(&self, pos: Pos) -> Tile {
        self.tiles[pos.y * self.width + pos.x]
    }

    pub fn set(&mut self, pos: Pos, tile: Tile) {
        let idx = pos.y * self.width + pos.x;
        self.tiles[idx] = tile;
    }

    // Out-of-bounds cells count as walls.
    pub fn is_wall(&self, pos: Pos) -> bool {
        !self.in_bounds(pos) || self.tile(pos) == Tile::Wall
    }

    pub fn is_open(&self, pos: Pos) -> bool {
        !self.is_wall(pos)
    }

    pub fn open_neighbor(&self, pos: Pos, dx: isize, dy: isize) -> Option<Pos> {
        pos.offset(dx, dy).filter(|p| self.is_open(*p))
    }

    pub fn open_cells(&self) -> Vec<Pos> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos { x, y };
                if self.tile(pos) == Tile::Empty {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    pub fn wall_count(&self) -> usize {
        self.tiles.iter().filter(|t| **t == Tile::Wall).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazeParams {
    pub width: usize,
    pub height: usize,
    pub wall_chance: f64,
    pub key_count: usize,
    pub hazard_count: usize,
}

#[derive(Clone, Debug)]
pub struct Level {
    pub grid: Grid,
    pub keys: Vec<Pos>,
    pub hazards: Vec<Hazard>,
    pub start: Pos,
    pub exit: Pos,
}

/// Sparse random walls with a cleared border ring.
///
/// Walls are placed independently per cell, so there is no guarantee that
/// every key can be reached. The border ring is always open, which at least
/// connects the start to the exit.
pub fn generate(rng: &mut impl Rng, params: &MazeParams) -> Level {
    let width = params.width.max(1);
    let height = params.height.max(1);
    let start = Pos::new(0, 0);
    let exit = Pos::new(width - 1, height - 1);

    let mut grid = Grid::new(width, height);
    let wall_chance = if params.wall_chance.is_nan() {
        0.0
    } else {
        params.wall_chance.clamp(0.0, 1.0)
    };
    for y in 0..height {
        for x in 0..width {
            let pos = Pos { x, y };
            if pos != start && pos != exit && rng.gen_bool(wall_chance) {
                grid.set(pos, Tile::Wall);
            }
        }
    }
    clear_border(&mut grid);

    let mut spawnable: Vec<Pos> = grid
        .open_cells()
        .into_iter()
        .filter(|p| *p != start && *p != exit)
        .collect();
    spawnable.shuffle(rng);

    let keys: Vec<Pos> = spawnable.iter().copied().take(params.key_count).collect();

    // Hazards may share a cell with a key or with each other.
    let mut hazards = Vec::with_capacity(params.hazard_count);
    if !spawnable.is_empty() {
        for _ in 0..params.hazard_count {
            let pos = spawnable[rng.gen_range(0..spawnable.len())];
            let dx = if rng.gen_bool(0.5) { 1 } else { -1 };
            let dy = if rng.gen_bool(0.5) { 1 } else { -1 };
            hazards.push(Hazard::new(pos, dx, dy));
        }
    }

    log::debug!(
        "generated {}x{} maze: {} walls, {} keys, {} hazards",
        width,
        height,
        grid.wall_count(),
        keys.len(),
        hazards.len()
    );

    Level {
        grid,
        keys,
        hazards,
        start,
        exit,
    }
}

fn clear_border(grid: &mut Grid) {
    let (w, h) = (grid.width(), grid.height());
    for y in 0..h {
        grid.set(Pos::new(0, y), Tile::Empty);
        grid.set(Pos::new(w - 1, y), Tile::Empty);
    }
    for x in 0..w {
        grid.set(Pos::new(x, 0), Tile::Empty);
        grid.set(Pos::new(x, h - 1), Tile::Empty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn params(width: usize, height: usize) -> MazeParams {
        MazeParams {
            width,
            height,
            wall_chance: 0.1,
            key_count: 5,
            hazard_count: 3,
        }
    }

    #[test]
    fn border_ring_is_always_clear() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = MazeParams {
            wall_chance: 1.0,
            ..params(15, 15)
        };
        let level = generate(&mut rng, &p);
        for x in 0..15 {
            assert!(level.grid.is_open(Pos::new(x, 0)));
            assert!(level.grid.is_open(Pos::new(x, 14)));
        }
        for y in 0..15 {
            assert!(level.grid.is_open(Pos::new(0, y)));
            assert!(level.grid.is_open(Pos::new(14, y)));
        }
        // Every interior cell is a wall at full density.
        assert_eq!(level.grid.wall_count(), 13 * 13);
    }

    #[test]
    fn keys_are_distinct_and_avoid_start_and_exit() {
        let mut rng = StdRng::seed_from_u64(42);
        let p = params(15, 15);
        let level = generate(&mut rng, &p);
        assert_eq!(level.keys.len(), 5);
        let unique: HashSet<Pos> = level.keys.iter().copied().collect();
        assert_eq!(unique.len(), 5);
        assert!(!unique.contains(&Pos::new(0, 0)));
        assert!(!unique.contains(&Pos::new(14, 14)));
        assert_eq!(level.start, Pos::new(0, 0));
        assert_eq!(level.exit, Pos::new(14, 14));
    }

    #[test]
    fn hazard_directions_are_diagonal_units() {
        let mut rng = StdRng::seed_from_u64(3);
        let level = generate(&mut rng, &params(15, 15));
        assert_eq!(level.hazards.len(), 3);
        for h in &level.hazards {
            assert!(h.dx == 1 || h.dx == -1);
            assert!(h.dy == 1 || h.dy == -1);
            assert_ne!(h.pos, level.start);
            assert_ne!(h.pos, level.exit);
        }
    }

    #[test]
    fn tiny_grid_places_what_fits() {
        let mut rng = StdRng::seed_from_u64(1);
        // 2x1: only the start and exit cells exist.
        let level = generate(&mut rng, &params(2, 1));
        assert!(level.keys.is_empty());
        assert!(level.hazards.is_empty());

        let level = generate(&mut rng, &params(3, 1));
        assert_eq!(level.keys, vec![Pos::new(1, 0)]);
        assert_eq!(level.hazards.len(), 3);
    }

    #[test]
    fn same_seed_same_maze() {
        let p = params(15, 15);
        let a = generate(&mut StdRng::seed_from_u64(99), &p);
        let b = generate(&mut StdRng::seed_from_u64(99), &p);
        assert_eq!(a.grid.open_cells(), b.grid.open_cells());
        assert_eq!(a.keys, b.keys);
    }

    #[test]
    fn offset_rejects_negative_coordinates() {
        assert_eq!(Pos::new(0, 3).offset(-1, 0), None);
        assert_eq!(Pos::new(2, 3).offset(-1, 1), Some(Pos::new(1, 4)));
    }

    proptest! {
        #[test]
        fn entities_spawn_on_open_cells(
            seed in any::<u64>(),
            width in 1usize..25,
            height in 1usize..25,
            wall_chance in 0.0f64..1.0,
        ) {
            let p = MazeParams { width, height, wall_chance, key_count: 5, hazard_count: 3 };
            let level = generate(&mut StdRng::seed_from_u64(seed), &p);
            prop_assert!(level.grid.is_open(level.start));
            prop_assert!(level.grid.is_open(level.exit));
            for key in &level.keys {
                prop_assert!(level.grid.is_open(*key));
            }
            for h in &level.hazards {
                prop_assert!(level.grid.is_open(h.pos));
            }
        }
    }
}
