use crate::board::Board;
use crate::q_table::QTable;
use rand::{prelude::SliceRandom, Rng};

/// Epsilon-greedy action selection over a [`QTable`].
#[derive(Debug)]
pub struct EpsilonGreedy<R> {
    epsilon: f64,
    rng: R,
}

impl<R: Rng> EpsilonGreedy<R> {
    pub fn new(epsilon: f64, rng: R) -> Self {
        EpsilonGreedy { epsilon, rng }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Explores with probability epsilon, otherwise exploits. Legal actions
    /// are read from `board` on every call. Returns `None` on a full board.
    pub fn choose_action(&mut self, state: usize, board: &Board, q: &QTable) -> Option<usize> {
        let available_moves = board.enumerate_empty();
        if available_moves.is_empty() {
            return None;
        }
        if self.rng.gen::<f64>() < self.epsilon {
            available_moves.choose(&mut self.rng).copied()
        } else {
            q.best_action(state, &available_moves)
        }
    }

    pub fn decay(&mut self, factor: f64, min_epsilon: f64) {
        self.epsilon = (self.epsilon * factor).max(min_epsilon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Marks;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn greedy_when_epsilon_is_zero() {
        let mut board = Board::new();
        board.make_move(4, Marks::Cross);
        let state = board.state_index();
        let mut q = QTable::new(0.1, 0.9);
        q.set(state, 4, 10.0);
        q.set(state, 6, 0.4);
        let mut policy = EpsilonGreedy::new(0.0, StdRng::seed_from_u64(1));
        for _ in 0..20 {
            assert_eq!(policy.choose_action(state, &board, &q), Some(6));
        }
    }

    #[test]
    fn exploration_stays_on_empty_cells() {
        let mut board = Board::new();
        for pos in [0, 1, 2, 4, 8] {
            board.make_move(pos, Marks::Nought);
        }
        let q = QTable::new(0.1, 0.9);
        let mut policy = EpsilonGreedy::new(1.0, StdRng::seed_from_u64(3));
        let mut seen = [false; 9];
        for _ in 0..200 {
            let action = policy.choose_action(board.state_index(), &board, &q).unwrap();
            assert!(board.is_empty(action));
            seen[action] = true;
        }
        assert!([3, 5, 6, 7].iter().all(|&pos| seen[pos]));
    }

    #[test]
    fn full_board_has_no_action() {
        let mut board = Board::new();
        for pos in 0..9 {
            board.make_move(pos, if pos % 2 == 0 { Marks::Cross } else { Marks::Nought });
        }
        let mut policy = EpsilonGreedy::new(0.5, StdRng::seed_from_u64(0));
        assert_eq!(policy.choose_action(board.state_index(), &board, &QTable::new(0.1, 0.9)), None);
    }

    #[test]
    fn decay_is_geometric_and_floored() {
        let mut policy = EpsilonGreedy::new(0.7, StdRng::seed_from_u64(0));
        for n in 1..=2_000 {
            policy.decay(0.99, 0.01);
            let expected = (0.7 * 0.99_f64.powi(n)).max(0.01);
            assert!((policy.epsilon() - expected).abs() < 1e-9, "after {n} decays");
            assert!(policy.epsilon() >= 0.01);
        }
        assert_eq!(policy.epsilon(), 0.01);
    }
}
