use crate::logic::board::{BoardCoordinate, Piece, SQUARE_COUNT};
use std::sync::OnceLock;

/// Diagonals as (row delta, col delta): down-left, down-right, up-left, up-right.
/// Generators walk them in this order.
pub const DIRECTIONS: [(isize, isize); 4] = [(1, -1), (1, 1), (-1, -1), (-1, 1)];

/// Per-square neighbour tables for the four diagonals.
pub struct DiagonalTables {
    steps: [[Option<BoardCoordinate>; 4]; SQUARE_COUNT],
    // (jumped square, landing square)
    jumps: [[Option<(BoardCoordinate, BoardCoordinate)>; 4]; SQUARE_COUNT],
}

impl DiagonalTables {
    fn new() -> Self {
        let mut steps = [[None; 4]; SQUARE_COUNT];
        let mut jumps = [[None; 4]; SQUARE_COUNT];

        for (sq, (step_row, jump_row)) in steps.iter_mut().zip(jumps.iter_mut()).enumerate() {
            let Some(from) = BoardCoordinate::from_index(sq) else {
                continue;
            };
            for (dir, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
                let over = from.try_offset(dr, dc);
                step_row[dir] = over;
                jump_row[dir] = over.zip(from.try_offset(2 * dr, 2 * dc));
            }
        }

        Self { steps, jumps }
    }

    pub fn get() -> &'static Self {
        static INSTANCE: OnceLock<DiagonalTables> = OnceLock::new();
        INSTANCE.get_or_init(DiagonalTables::new)
    }

    pub fn step(&self, from: BoardCoordinate, dir: usize) -> Option<BoardCoordinate> {
        self.steps[from.index()][dir]
    }

    pub fn jump(
        &self,
        from: BoardCoordinate,
        dir: usize,
    ) -> Option<(BoardCoordinate, BoardCoordinate)> {
        self.jumps[from.index()][dir]
    }
}

/// Indices into [`DIRECTIONS`] that `piece` may travel along: all four for a
/// king, the two forward diagonals for a man.
pub fn directions_for(piece: &Piece) -> impl Iterator<Item = usize> {
    let is_king = piece.is_king();
    let forward = piece.color().forward();
    (0..DIRECTIONS.len()).filter(move |&dir| is_king || DIRECTIONS[dir].0 == forward)
}
