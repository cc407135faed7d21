use crate::engine::Move;

// Twelve kings with four moves each is the most one side can have.
const MAX_MOVES: usize = 64;

/// Stack-allocated move buffer used for node expansion.
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    count: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        Self {
            moves: [Move::default(); MAX_MOVES],
            count: 0,
        }
    }
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mv: Move) {
        if let Some(slot) = self.moves.get_mut(self.count) {
            *slot = mv;
            self.count += 1;
        } else {
            debug_assert!(false, "MoveList overflow! Max moves: {MAX_MOVES}");
        }
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn first(&self) -> Option<&Move> {
        self.iter().next()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.get(0..self.count).unwrap_or(&[]).iter()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::iter::Take<std::array::IntoIter<Move, MAX_MOVES>>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.into_iter().take(self.count)
    }
}
