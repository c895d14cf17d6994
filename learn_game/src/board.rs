use itertools::Itertools;
use ndarray::prelude::*;
use std::{fmt, ops::Deref};

/// Number of cells on the board, which is also the number of actions.
pub const BOARD_SIZE: usize = 9;
/// Size of the raw base-3 state space, 3^9.
pub const NUM_STATES: usize = 19_683;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Marks {
    #[default]
    Empty = 0,
    Cross = 1,
    Nought = 2,
}

impl Marks {
    pub fn other(self) -> Self {
        match self {
            Self::Cross => Marks::Nought,
            Self::Nought => Marks::Cross,
            Self::Empty => Marks::Empty,
        }
    }
    pub fn as_char(self) -> char {
        match self {
            Self::Cross => 'X',
            Self::Nought => 'O',
            Self::Empty => '.',
        }
    }
    /// Base-3 digit of the mark inside a state index.
    pub fn digit(self) -> usize {
        self as usize
    }
    fn from_digit(digit: usize) -> Option<Self> {
        match digit {
            0 => Some(Marks::Empty),
            1 => Some(Marks::Cross),
            2 => Some(Marks::Nought),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum IsGameOver {
    InPlay,
    Drawn,
    Win,
}

/// A 3x3 tic-tac-toe grid. Position `p` in `0..9` addresses row `p / 3`,
/// column `p % 3`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Board {
    cells: Array2<Marks>,
}

fn coords(pos: usize) -> [usize; 2] {
    [pos / 3, pos % 3]
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: Array::from_elem((3, 3), Marks::Empty),
        }
    }

    /// Rebuilds the board encoded by `index`, or `None` if the index lies
    /// outside the base-3 state space.
    pub fn from_state_index(index: usize) -> Option<Self> {
        if index >= NUM_STATES {
            return None;
        }
        let mut board = Board::new();
        let mut rest = index;
        for pos in 0..BOARD_SIZE {
            board.cells[coords(pos)] = Marks::from_digit(rest % 3)?;
            rest /= 3;
        }
        Some(board)
    }

    /// Panics if `pos` is not in `0..9`; callers validate positions first.
    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[coords(pos)] == Marks::Empty
    }

    /// Places `mark` at `pos`. Returns `false` and leaves the board untouched
    /// when the position is out of range, already taken, or `mark` is empty.
    pub fn make_move(&mut self, pos: usize, mark: Marks) -> bool {
        if pos >= BOARD_SIZE || mark == Marks::Empty || !self.is_empty(pos) {
            return false;
        }
        self.cells[coords(pos)] = mark;
        true
    }

    pub fn undo_move(&mut self, pos: usize) {
        self.cells[coords(pos)] = Marks::Empty;
    }

    /// Plays `mark` at `pos` for as long as the returned guard lives.
    pub fn scoped_move(&mut self, pos: usize, mark: Marks) -> Option<MoveGuard<'_>> {
        if self.make_move(pos, mark) {
            Some(MoveGuard { board: self, pos })
        } else {
            None
        }
    }

    pub fn is_win(&self, mark: Marks) -> bool {
        if mark == Marks::Empty {
            return false;
        }
        let line = |lane: ArrayView1<Marks>| lane.iter().all(|&cell| cell == mark);
        self.cells.rows().into_iter().any(line)
            || self.cells.columns().into_iter().any(line)
            || line(self.cells.diag())
            || (0..3).all(|i| self.cells[[i, 2 - i]] == mark)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&cell| cell != Marks::Empty)
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == Marks::Empty).count()
    }

    /// Empty positions in ascending order.
    pub fn enumerate_empty(&self) -> Vec<usize> {
        self.cells
            .iter()
            .positions(|&cell| cell == Marks::Empty)
            .collect()
    }

    /// Base-3 encoding: cell `p` contributes `digit * 3^p`.
    pub fn state_index(&self) -> usize {
        self.cells()
            .into_iter()
            .rev()
            .fold(0, |index, cell| index * 3 + cell.digit())
    }

    pub fn cells(&self) -> [Marks; BOARD_SIZE] {
        let mut out = [Marks::Empty; BOARD_SIZE];
        for (slot, &cell) in out.iter_mut().zip(self.cells.iter()) {
            *slot = cell;
        }
        out
    }

    /// Outcome of the position from the point of view of the mark that
    /// just moved.
    pub fn status(&self, mark: Marks) -> IsGameOver {
        if self.is_win(mark) {
            IsGameOver::Win
        } else if self.is_full() {
            IsGameOver::Drawn
        } else {
            IsGameOver::InPlay
        }
    }

    /// One-ply look-ahead: can `mark` complete a line with its next move?
    /// The board is left exactly as it was.
    pub fn opponent_can_win(&mut self, mark: Marks) -> bool {
        self.enumerate_empty().into_iter().any(|pos| {
            self.scoped_move(pos, mark).is_some_and(|board| board.is_win(mark))
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (a, b, c) in self.cells.iter().map(|cell| cell.as_char()).tuples() {
            writeln!(f, "{a} {b} {c}")?;
        }
        Ok(())
    }
}

/// A hypothetical move that is undone when the guard is dropped.
pub struct MoveGuard<'a> {
    board: &'a mut Board,
    pos: usize,
}

impl Deref for MoveGuard<'_> {
    type Target = Board;
    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.board.undo_move(self.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const WIN_LINES: [[usize; 3]; 8] = [
        [0, 1, 2],
        [3, 4, 5],
        [6, 7, 8],
        [0, 3, 6],
        [1, 4, 7],
        [2, 5, 8],
        [0, 4, 8],
        [2, 4, 6],
    ];

    fn board_with(cross: &[usize], nought: &[usize]) -> Board {
        let mut board = Board::new();
        for &pos in cross {
            assert!(board.make_move(pos, Marks::Cross));
        }
        for &pos in nought {
            assert!(board.make_move(pos, Marks::Nought));
        }
        board
    }

    #[test]
    fn make_and_undo_move_track_empty_cells() {
        let mut board = Board::new();
        assert_eq!(board.count_empty(), 9);
        assert!(board.make_move(4, Marks::Cross));
        assert!(!board.is_empty(4));
        assert_eq!(board.count_empty(), 8);
        assert_eq!(board.enumerate_empty(), vec![0, 1, 2, 3, 5, 6, 7, 8]);
        board.undo_move(4);
        assert!(board.is_empty(4));
        assert_eq!(board.count_empty(), 9);
    }

    #[test]
    fn rejected_moves_leave_board_unchanged() {
        let mut board = board_with(&[0], &[]);
        let before = board.clone();
        assert!(!board.make_move(0, Marks::Nought));
        assert!(!board.make_move(9, Marks::Nought));
        assert!(!board.make_move(3, Marks::Empty));
        assert_eq!(board, before);
    }

    #[test]
    fn every_line_wins() {
        for line in WIN_LINES {
            let board = board_with(&line, &[]);
            assert!(board.is_win(Marks::Cross), "line {line:?}");
            assert!(!board.is_win(Marks::Nought));
            assert_eq!(board.status(Marks::Cross), IsGameOver::Win);
        }
    }

    #[test]
    fn no_false_wins() {
        // Every three-cell set that is not one of the lines.
        for a in 0..9 {
            for b in a + 1..9 {
                for c in b + 1..9 {
                    let board = board_with(&[a, b, c], &[]);
                    let expected = WIN_LINES.contains(&[a, b, c]);
                    assert_eq!(board.is_win(Marks::Cross), expected, "{a} {b} {c}");
                }
            }
        }
        assert!(!Board::new().is_win(Marks::Empty));
    }

    #[test]
    fn full_board_without_line_is_drawn() {
        let board = board_with(&[0, 2, 3, 7, 8], &[1, 4, 5, 6]);
        assert!(board.is_full());
        assert_eq!(board.status(Marks::Cross), IsGameOver::Drawn);
        assert_eq!(board.status(Marks::Nought), IsGameOver::Drawn);
    }

    #[test]
    fn state_index_is_base_three() {
        assert_eq!(Board::new().state_index(), 0);
        assert_eq!(board_with(&[0], &[]).state_index(), 1);
        assert_eq!(board_with(&[], &[0]).state_index(), 2);
        assert_eq!(board_with(&[1], &[]).state_index(), 3);
        assert_eq!(board_with(&[], &[8]).state_index(), 2 * 6561);
        let last = Board::from_state_index(NUM_STATES - 1).unwrap();
        assert_eq!(last.state_index(), NUM_STATES - 1);
        assert!(Board::from_state_index(NUM_STATES).is_none());
    }

    #[test]
    fn state_index_weights_cells_by_position() {
        // Cross in cell 2, nought in cell 3, cross in cell 7.
        let board = board_with(&[2, 7], &[3]);
        assert_eq!(board.state_index(), 9 + 2 * 27 + 2187);
        let mixed = board_with(&[0, 4, 8], &[1, 5]);
        let expected: usize = mixed
            .cells()
            .iter()
            .enumerate()
            .map(|(pos, cell)| cell.digit() * 3usize.pow(pos as u32))
            .sum();
        assert_eq!(mixed.state_index(), expected);
    }

    #[test]
    fn state_index_round_trips() {
        for index in 0..NUM_STATES {
            let board = Board::from_state_index(index).unwrap();
            assert_eq!(board.state_index(), index);
        }
    }

    fn walk(board: &mut Board, to_move: Marks, seen: &mut HashMap<usize, [Marks; BOARD_SIZE]>) {
        let cells = board.cells();
        if let Some(previous) = seen.insert(board.state_index(), cells) {
            assert_eq!(previous, cells);
            return;
        }
        if board.is_win(to_move.other()) || board.is_full() {
            return;
        }
        for pos in board.enumerate_empty() {
            board.make_move(pos, to_move);
            walk(board, to_move.other(), seen);
            board.undo_move(pos);
        }
    }

    #[test]
    fn reachable_states_never_collide() {
        let mut seen = HashMap::new();
        walk(&mut Board::new(), Marks::Cross, &mut seen);
        assert_eq!(seen.len(), 5478);
    }

    #[test]
    fn look_ahead_restores_board() {
        let mut board = board_with(&[0, 1], &[4]);
        let before = board.clone();
        assert!(board.opponent_can_win(Marks::Cross));
        assert!(!board.opponent_can_win(Marks::Nought));
        assert_eq!(board, before);
    }

    #[test]
    fn scoped_move_undoes_on_drop() {
        let mut board = Board::new();
        {
            let guard = board.scoped_move(3, Marks::Nought).unwrap();
            assert!(!guard.is_empty(3));
        }
        assert!(board.is_empty(3));
        assert!(board.make_move(3, Marks::Cross));
        assert!(board.scoped_move(3, Marks::Nought).is_none());
        assert!(!board.is_empty(3));
    }

    #[test]
    fn clone_is_independent() {
        let board = board_with(&[0], &[]);
        let mut copy = board.clone();
        copy.make_move(1, Marks::Nought);
        assert!(board.is_empty(1));
        assert!(!copy.is_empty(1));
    }

    #[test]
    fn renders_grid() {
        let board = board_with(&[0, 4], &[2]);
        assert_eq!(board.to_string(), "X . O\n. X .\n. . .\n");
    }
}
