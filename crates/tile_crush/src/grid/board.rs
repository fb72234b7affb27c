use bevy::prelude::Resource;
use strum::{EnumCount, FromRepr};
use thiserror::Error;

pub const ROWS: usize = 8;
pub const COLS: usize = 8;

/// One of the fixed tile colors. Matching requires exact kind equality; a
/// tile's kind never changes after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumCount, FromRepr)]
pub enum TileKind {
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
}

impl TileKind {
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self::from_repr(rng.usize(..Self::COUNT)).unwrap_or(Self::Red)
    }
}

/// Stable arena index for a tile. Cells store ids rather than tile data so
/// that "is this cell still holding the tile I matched?" is an id comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(u32);

#[derive(Debug, Clone)]
pub struct Tile {
    pub kind: TileKind,
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("cell ({row}, {col}) is empty")]
    EmptyCell { row: usize, col: usize },
}

/// A tile sliding down a column during the gravity pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileFall {
    pub id: TileId,
    pub to_row: usize,
    pub col: usize,
}

/// A freshly created tile from the refill pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpawn {
    pub id: TileId,
    pub row: usize,
    pub col: usize,
    pub kind: TileKind,
}

/// The 8x8 grid plus the tile arena behind it.
///
/// Invariant: every occupied cell's tile record carries that cell's
/// coordinates. All mutating operations preserve it.
#[derive(Resource)]
pub struct Board {
    cells: [[Option<TileId>; COLS]; ROWS],
    tiles: Vec<Option<Tile>>,
}

impl Board {
    fn empty() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
            tiles: Vec::with_capacity(ROWS * COLS),
        }
    }

    /// Fills every cell with a random kind, redrawing any kind that would
    /// complete a run of three with the two cells to the left or the two
    /// above. The local check is enough to guarantee a match-free board
    /// because cells are filled top-to-bottom, left-to-right.
    pub fn filled(rng: &mut fastrand::Rng) -> Self {
        let mut board = Self::empty();
        for row in 0..ROWS {
            for col in 0..COLS {
                let mut kind = TileKind::random(rng);
                while board.completes_run(row, col, kind) {
                    kind = TileKind::random(rng);
                }
                board.insert(row, col, kind);
            }
        }
        board
    }

    fn completes_run(&self, row: usize, col: usize, kind: TileKind) -> bool {
        if col >= 2
            && self.kind_at(row, col - 1) == Some(kind)
            && self.kind_at(row, col - 2) == Some(kind)
        {
            return true;
        }
        if row >= 2
            && self.kind_at(row - 1, col) == Some(kind)
            && self.kind_at(row - 2, col) == Some(kind)
        {
            return true;
        }
        false
    }

    fn insert(&mut self, row: usize, col: usize, kind: TileKind) -> TileId {
        let id = TileId(self.tiles.len() as u32);
        self.tiles.push(Some(Tile { kind, row, col }));
        self.cells[row][col] = Some(id);
        id
    }

    pub fn tile_id(&self, row: usize, col: usize) -> Option<TileId> {
        *self.cells.get(row)?.get(col)?
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        self.get(self.tile_id(row, col)?)
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0 as usize)?.as_ref()
    }

    fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn kind_at(&self, row: usize, col: usize) -> Option<TileKind> {
        self.tile(row, col).map(|tile| tile.kind)
    }

    /// Occupied cells in no particular order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| Some((TileId(index as u32), slot.as_ref()?)))
    }

    fn occupied(&self, (row, col): (usize, usize)) -> Result<TileId, BoardError> {
        if row >= ROWS || col >= COLS {
            return Err(BoardError::OutOfBounds { row, col });
        }
        self.cells[row][col].ok_or(BoardError::EmptyCell { row, col })
    }

    /// Exchanges two occupied cells, updating both tile records. Calling it a
    /// second time with the same arguments is the revert.
    pub fn swap(&mut self, a: (usize, usize), b: (usize, usize)) -> Result<(), BoardError> {
        let id_a = self.occupied(a)?;
        let id_b = self.occupied(b)?;

        self.cells[a.0][a.1] = Some(id_b);
        self.cells[b.0][b.1] = Some(id_a);
        if let Some(tile) = self.get_mut(id_a) {
            tile.row = b.0;
            tile.col = b.1;
        }
        if let Some(tile) = self.get_mut(id_b) {
            tile.row = a.0;
            tile.col = a.1;
        }
        Ok(())
    }

    /// Every id participating in a horizontal or vertical run of three.
    /// A tile in overlapping runs appears multiple times; callers
    /// de-duplicate by id before acting. Full rescan, no early exit.
    pub fn find_matches(&self) -> Vec<TileId> {
        let mut matches = Vec::new();

        for row in 0..ROWS {
            for col in 0..=COLS - 3 {
                self.push_if_run(
                    [
                        self.cells[row][col],
                        self.cells[row][col + 1],
                        self.cells[row][col + 2],
                    ],
                    &mut matches,
                );
            }
        }

        for col in 0..COLS {
            for row in 0..=ROWS - 3 {
                self.push_if_run(
                    [
                        self.cells[row][col],
                        self.cells[row + 1][col],
                        self.cells[row + 2][col],
                    ],
                    &mut matches,
                );
            }
        }

        matches
    }

    fn push_if_run(&self, trio: [Option<TileId>; 3], matches: &mut Vec<TileId>) {
        let [Some(a), Some(b), Some(c)] = trio else {
            return;
        };
        let (Some(ta), Some(tb), Some(tc)) = (self.get(a), self.get(b), self.get(c)) else {
            return;
        };
        if ta.kind == tb.kind && tb.kind == tc.kind {
            matches.extend([a, b, c]);
        }
    }

    /// Frees the matched tiles. A cell is only cleared while it still holds
    /// the matched id, so a cell refilled by an earlier step is left alone;
    /// the record is freed either way.
    pub fn clear_matched(&mut self, matched: &[TileId]) {
        for &id in matched {
            let Some(tile) = self.get(id) else {
                continue;
            };
            let (row, col) = (tile.row, tile.col);
            if self.cells[row][col] == Some(id) {
                self.cells[row][col] = None;
            }
            self.tiles[id.0 as usize] = None;
        }
    }

    /// Single compaction pass: per column, bottom-up, each empty cell pulls
    /// down the nearest tile above it. Cells with nothing above them stay
    /// empty for the spawn pass.
    pub fn apply_gravity(&mut self) -> Vec<TileFall> {
        let mut falls = Vec::new();
        for col in 0..COLS {
            for row in (0..ROWS).rev() {
                if self.cells[row][col].is_some() {
                    continue;
                }
                for above in (0..row).rev() {
                    if let Some(id) = self.cells[above][col].take() {
                        self.cells[row][col] = Some(id);
                        if let Some(tile) = self.get_mut(id) {
                            tile.row = row;
                        }
                        falls.push(TileFall { id, to_row: row, col });
                        break;
                    }
                }
            }
        }
        falls
    }

    /// Fills every remaining empty cell with a uniformly random kind. Unlike
    /// initialization there is no redraw against immediate matches, so a
    /// refill may hand the next detection pass a fresh cascade.
    pub fn spawn_missing(&mut self, rng: &mut fastrand::Rng) -> Vec<TileSpawn> {
        let mut spawns = Vec::new();
        for col in 0..COLS {
            for row in 0..ROWS {
                if self.cells[row][col].is_none() {
                    let kind = TileKind::random(rng);
                    let id = self.insert(row, col, kind);
                    spawns.push(TileSpawn { id, row, col, kind });
                }
            }
        }
        spawns
    }

    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(Option::is_some))
    }

    #[cfg(test)]
    fn from_kinds(kinds: [[TileKind; COLS]; ROWS]) -> Self {
        let mut board = Self::empty();
        for (row, row_kinds) in kinds.iter().enumerate() {
            for (col, &kind) in row_kinds.iter().enumerate() {
                board.insert(row, col, kind);
            }
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TileKind::{Blue, Cyan, Green, Magenta, Red, Yellow};

    fn dedup(ids: Vec<TileId>) -> Vec<TileId> {
        let mut unique = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        unique
    }

    /// A board with no runs anywhere: kind depends on (row + 2 * col) % 5,
    /// which never repeats three times in a row along either axis.
    fn match_free_board() -> Board {
        let mut kinds = [[Red; COLS]; ROWS];
        let palette = [Red, Green, Blue, Yellow, Cyan];
        for (row, row_kinds) in kinds.iter_mut().enumerate() {
            for (col, kind) in row_kinds.iter_mut().enumerate() {
                *kind = palette[(row + 2 * col) % palette.len()];
            }
        }
        Board::from_kinds(kinds)
    }

    #[test]
    fn filled_boards_start_match_free() {
        for seed in 0..200 {
            let mut rng = fastrand::Rng::with_seed(seed);
            let board = Board::filled(&mut rng);
            assert!(board.is_full(), "seed {seed} left holes");
            assert!(
                board.find_matches().is_empty(),
                "seed {seed} produced an initial match"
            );
        }
    }

    #[test]
    fn filled_board_coordinates_are_consistent() {
        let mut rng = fastrand::Rng::with_seed(7);
        let board = Board::filled(&mut rng);
        for (id, tile) in board.tiles() {
            assert_eq!(
                board.tile_id(tile.row, tile.col),
                Some(id),
                "tile record points at a cell holding someone else"
            );
        }
    }

    #[test]
    fn out_of_range_lookups_return_none() {
        let board = match_free_board();
        assert!(board.tile(ROWS, 0).is_none());
        assert!(board.tile(0, COLS).is_none());
        assert!(board.tile_id(usize::MAX, usize::MAX).is_none());
    }

    #[test]
    fn detector_finds_a_single_horizontal_run() {
        let mut board = match_free_board();
        // Overwrite row 4, cols 2..=4 with one kind via direct inserts.
        for col in 2..=4 {
            board.insert(4, col, Magenta);
        }
        let matched = dedup(board.find_matches());
        assert_eq!(matched.len(), 3, "exactly the three run members");
        for id in matched {
            let tile = board.get(id).expect("matched id must be live");
            assert_eq!(tile.row, 4);
            assert!((2..=4).contains(&tile.col));
            assert_eq!(tile.kind, Magenta);
        }
    }

    #[test]
    fn detector_finds_vertical_runs() {
        let mut board = match_free_board();
        for row in 1..=3 {
            board.insert(row, 6, Magenta);
        }
        let matched = dedup(board.find_matches());
        assert_eq!(matched.len(), 3);
        for id in matched {
            let tile = board.get(id).expect("matched id must be live");
            assert_eq!(tile.col, 6);
        }
    }

    #[test]
    fn longer_runs_report_every_member() {
        let mut board = match_free_board();
        for col in 0..4 {
            board.insert(0, col, Magenta);
        }
        // Two overlapping windows, raw output has duplicates.
        let raw = board.find_matches();
        assert_eq!(raw.len(), 6);
        assert_eq!(dedup(raw).len(), 4, "a run of four is four tiles");
    }

    #[test]
    fn partial_runs_do_not_match() {
        // Row 0 reads B, B, C, ... - two of a kind is not a run.
        let mut kinds = [[Red; COLS]; ROWS];
        let palette = [Red, Green, Blue, Yellow, Cyan];
        for (row, row_kinds) in kinds.iter_mut().enumerate() {
            for (col, kind) in row_kinds.iter_mut().enumerate() {
                *kind = palette[(row + 2 * col) % palette.len()];
            }
        }
        kinds[0][0] = Blue;
        kinds[0][1] = Blue;
        kinds[0][2] = Cyan;
        let board = Board::from_kinds(kinds);
        assert!(board.find_matches().is_empty());
    }

    #[test]
    fn swap_updates_cells_and_records() {
        let mut board = match_free_board();
        let id_a = board.tile_id(3, 3).expect("occupied");
        let id_b = board.tile_id(3, 4).expect("occupied");

        board.swap((3, 3), (3, 4)).expect("both cells occupied");

        assert_eq!(board.tile_id(3, 3), Some(id_b));
        assert_eq!(board.tile_id(3, 4), Some(id_a));
        let moved = board.get(id_a).expect("live");
        assert_eq!((moved.row, moved.col), (3, 4));
    }

    #[test]
    fn failed_swap_reverts_to_identical_kinds() {
        let mut board = match_free_board();
        let before: Vec<Option<TileKind>> = (0..ROWS)
            .flat_map(|row| (0..COLS).map(move |col| (row, col)))
            .map(|(row, col)| board.kind_at(row, col))
            .collect();

        board.swap((5, 5), (5, 6)).expect("swap");
        board.swap((5, 5), (5, 6)).expect("revert");

        let after: Vec<Option<TileKind>> = (0..ROWS)
            .flat_map(|row| (0..COLS).map(move |col| (row, col)))
            .map(|(row, col)| board.kind_at(row, col))
            .collect();
        assert_eq!(before, after, "revert must restore every cell");
    }

    #[test]
    fn swap_rejects_out_of_bounds_and_empty_cells() {
        let mut board = match_free_board();
        assert_eq!(
            board.swap((0, 0), (0, COLS)),
            Err(BoardError::OutOfBounds { row: 0, col: COLS })
        );

        let id = board.tile_id(2, 2).expect("occupied");
        board.clear_matched(&[id]);
        assert_eq!(
            board.swap((2, 2), (2, 3)),
            Err(BoardError::EmptyCell { row: 2, col: 2 })
        );
    }

    #[test]
    fn clear_matched_skips_stale_cells() {
        let mut board = match_free_board();
        let old = board.tile_id(0, 0).expect("occupied");
        // The cell gets a new occupant before the old id is cleared.
        let replacement = board.insert(0, 0, Magenta);

        board.clear_matched(&[old]);

        assert_eq!(board.tile_id(0, 0), Some(replacement), "cell kept its new tile");
        assert!(board.get(old).is_none(), "stale record still freed");
    }

    #[test]
    fn gravity_compacts_each_column() {
        let mut board = match_free_board();
        // Punch out three cells of column 2.
        let cleared: Vec<TileId> = [1, 3, 5]
            .iter()
            .map(|&row| board.tile_id(row, 2).expect("occupied"))
            .collect();
        board.clear_matched(&cleared);

        let falls = board.apply_gravity();

        assert!(!falls.is_empty());
        for fall in &falls {
            assert_eq!(fall.col, 2);
            let tile = board.get(fall.id).expect("live");
            assert_eq!(tile.row, fall.to_row);
        }
        // Gaps end up on top.
        for row in 0..3 {
            assert!(board.tile(row, 2).is_none(), "row {row} should be empty");
        }
        for row in 3..ROWS {
            assert!(board.tile(row, 2).is_some(), "row {row} should be filled");
        }
    }

    #[test]
    fn spawn_fills_every_remaining_hole() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut board = match_free_board();
        let cleared: Vec<TileId> = (0..COLS)
            .map(|col| board.tile_id(0, col).expect("occupied"))
            .collect();
        board.clear_matched(&cleared);
        board.apply_gravity();

        let spawns = board.spawn_missing(&mut rng);

        assert_eq!(spawns.len(), COLS, "one spawn per cleared column");
        assert!(spawns.iter().all(|spawn| spawn.row == 0));
        assert!(board.is_full());
    }

    #[test]
    fn spawn_on_a_full_board_is_a_no_op() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut board = match_free_board();
        assert!(board.spawn_missing(&mut rng).is_empty());
    }

    #[test]
    fn swap_scenario_resolves_through_refill() {
        // Cols 3 and 5 of row 3 hold Magenta; col 4 gets the third one by
        // swapping it down from row 2, completing the run.
        let mut kinds = [[Red; COLS]; ROWS];
        let palette = [Red, Green, Blue, Yellow, Cyan];
        for (row, row_kinds) in kinds.iter_mut().enumerate() {
            for (col, kind) in row_kinds.iter_mut().enumerate() {
                *kind = palette[(row + 2 * col) % palette.len()];
            }
        }
        kinds[3][3] = Magenta;
        kinds[3][5] = Magenta;
        kinds[3][4] = kinds[2][4];
        kinds[2][4] = Magenta;
        let mut board = Board::from_kinds(kinds);
        assert!(board.find_matches().is_empty(), "no premature match");

        board.swap((2, 4), (3, 4)).expect("swap");
        let matched = dedup(board.find_matches());
        assert_eq!(matched.len(), 3);

        board.clear_matched(&matched);
        let falls = board.apply_gravity();
        assert_eq!(falls.len(), 9, "the three tiles above each cleared cell all step down");

        let mut rng = fastrand::Rng::with_seed(99);
        let spawns = board.spawn_missing(&mut rng);
        assert_eq!(spawns.len(), 3, "one new tile per cleared column");
        assert!(spawns.iter().all(|spawn| spawn.row == 0));
        assert!(board.is_full());
        for (id, tile) in board.tiles() {
            assert_eq!(board.tile_id(tile.row, tile.col), Some(id));
        }
    }

    #[test]
    fn cascade_reaches_a_fixed_point() {
        let mut rng = fastrand::Rng::with_seed(1234);
        let mut board = Board::filled(&mut rng);
        board.swap((0, 0), (0, 1)).expect("swap");

        // Remove -> gravity -> spawn until detection comes up empty. Each
        // round refills the board completely, so only repeated unlucky spawns
        // keep it going; bound the loop far beyond plausible bad luck.
        let mut rounds = 0;
        loop {
            let matched = {
                let mut unique = Vec::new();
                for id in board.find_matches() {
                    if !unique.contains(&id) {
                        unique.push(id);
                    }
                }
                unique
            };
            if matched.is_empty() {
                break;
            }
            board.clear_matched(&matched);
            board.apply_gravity();
            board.spawn_missing(&mut rng);
            assert!(board.is_full(), "every round ends fully populated");
            rounds += 1;
            assert!(rounds < 1000, "cascade failed to stabilize");
        }
        assert!(board.find_matches().is_empty());
    }
}
