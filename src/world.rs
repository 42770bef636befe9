/// Side length of the simulated grid.
pub const GRID_LEN: usize = 28;

/// Oldest age a daisy can reach; one more tick and it dies.
pub const AGE_LIMIT: u32 = 25;

/// Relative offsets of the eight surrounding cells, in sampling order.
pub const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
    Empty,
    White,
    Black,
}

impl PatchKind {
    pub fn is_daisy(self) -> bool {
        !matches!(self, PatchKind::Empty)
    }
}

/// Age of an occupied patch.
///
/// `Newborn` marks a daisy placed by reproduction during the current tick. It
/// is exempt from ageing, death and reproduction until the life-cycle step
/// settles it to `Years(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Age {
    Newborn,
    Years(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    pub kind: PatchKind,
    pub temperature: f64,
    pub age: Option<Age>,
}

impl Patch {
    pub fn empty(temperature: f64) -> Self {
        Self {
            kind: PatchKind::Empty,
            temperature,
            age: None,
        }
    }

    /// Builds an occupied patch. Passing `PatchKind::Empty` yields an empty
    /// patch with no age.
    pub fn daisy(kind: PatchKind, temperature: f64, age: Age) -> Self {
        if !kind.is_daisy() {
            return Self::empty(temperature);
        }
        Self {
            kind,
            temperature,
            age: Some(age),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == PatchKind::Empty
    }

    pub fn is_newborn(&self) -> bool {
        self.age == Some(Age::Newborn)
    }

    /// Clears the occupant, keeping the local temperature.
    pub fn clear(&mut self) {
        self.kind = PatchKind::Empty;
        self.age = None;
    }
}

/// Square grid of patches addressed by `(row, col)`, stored row-major.
/// Edges do not wrap.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    side: usize,
    patches: Vec<Patch>,
}

impl World {
    pub fn new(side: usize) -> Self {
        Self {
            side,
            patches: vec![Patch::empty(0.0); side * side],
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn cell_count(&self) -> usize {
        self.patches.len()
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.side && col < self.side,
            "cell ({row}, {col}) outside {side}x{side} grid",
            side = self.side
        );
        row * self.side + col
    }

    pub fn patch(&self, row: usize, col: usize) -> &Patch {
        &self.patches[self.index(row, col)]
    }

    pub fn patch_mut(&mut self, row: usize, col: usize) -> &mut Patch {
        let idx = self.index(row, col);
        &mut self.patches[idx]
    }

    pub fn set(&mut self, row: usize, col: usize, patch: Patch) {
        *self.patch_mut(row, col) = patch;
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patches_mut(&mut self) -> &mut [Patch] {
        &mut self.patches
    }

    /// Applies `offset` to `(row, col)`, returning `None` when the result
    /// falls off the grid.
    pub fn offset(&self, row: usize, col: usize, offset: (isize, isize)) -> Option<(usize, usize)> {
        let r = row.checked_add_signed(offset.0)?;
        let c = col.checked_add_signed(offset.1)?;
        (r < self.side && c < self.side).then_some((r, c))
    }

    /// In-bounds neighbours of `(row, col)`: 3 at corners, 5 on edges, 8 inside.
    pub fn neighbours(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(move |&offset| self.offset(row, col, offset))
    }

    pub fn neighbour_count(&self, row: usize, col: usize) -> usize {
        self.neighbours(row, col).count()
    }

    pub fn has_empty_neighbour(&self, row: usize, col: usize) -> bool {
        self.neighbours(row, col)
            .any(|(r, c)| self.patch(r, c).is_empty())
    }

    pub fn count(&self, kind: PatchKind) -> usize {
        self.patches.iter().filter(|p| p.kind == kind).count()
    }

    /// `(white, black)` daisy counts.
    pub fn population(&self) -> (usize, usize) {
        self.patches
            .iter()
            .fold((0, 0), |(white, black), patch| match patch.kind {
                PatchKind::White => (white + 1, black),
                PatchKind::Black => (white, black + 1),
                PatchKind::Empty => (white, black),
            })
    }

    pub fn total_temperature(&self) -> f64 {
        self.patches.iter().map(|p| p.temperature).sum()
    }

    pub fn global_temperature(&self) -> f64 {
        self.total_temperature() / self.cell_count() as f64
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(GRID_LEN)
    }
}
