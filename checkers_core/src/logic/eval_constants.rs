// Material values. A king is worth three men.
pub const VAL_MAN: i32 = 1;
pub const VAL_KING: i32 = 3;

/// Search depth in plies below the root move.
pub const DEFAULT_DEPTH: u8 = 5;

/// Score for a side left with pieces but no legal move.
/// Larger than any material balance (12 kings = 36).
pub const LOSS_SCORE: i32 = 1000;
