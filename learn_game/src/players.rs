use crate::board::{Board, Marks};
use crate::policy::EpsilonGreedy;
use crate::q_table::QTable;
use rand::{prelude::SliceRandom, rngs::StdRng, Rng, SeedableRng};

/// A seat at the board.
pub trait Player {
    fn set_mark(&mut self, mark: Marks);
    fn mark(&self) -> Marks;
    fn name(&self) -> &str;
    /// Picks a cell for the current position, `None` if nothing is left.
    fn choose_move(&mut self, board: &Board, q: &QTable) -> Option<usize>;
}

/// Seeded when `seed` is given, otherwise drawn from OS entropy. `stream`
/// separates the generators of different components sharing one seed.
pub fn seeded_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

/// Sparring partner that plays uniformly at random among empty cells.
#[derive(Debug)]
pub struct RandomPlayer<R> {
    pub name: String,
    pub mark: Marks,
    rng: R,
}

impl<R: Rng> RandomPlayer<R> {
    pub fn new(name: String, rng: R) -> Self {
        RandomPlayer {
            name,
            mark: Marks::Empty,
            rng,
        }
    }
}

impl<R: Rng> Player for RandomPlayer<R> {
    fn set_mark(&mut self, mark: Marks) {
        self.mark = mark;
    }
    fn mark(&self) -> Marks {
        self.mark
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board, _q: &QTable) -> Option<usize> {
        board.enumerate_empty().choose(&mut self.rng).copied()
    }
}

/// The learning agent's seat, acting through an epsilon-greedy policy.
#[derive(Debug)]
pub struct ComputerPlayerRL<R> {
    pub name: String,
    pub mark: Marks,
    policy: EpsilonGreedy<R>,
}

impl<R: Rng> ComputerPlayerRL<R> {
    pub fn new(name: String, policy: EpsilonGreedy<R>) -> Self {
        ComputerPlayerRL {
            name,
            mark: Marks::Empty,
            policy,
        }
    }
    pub fn policy(&self) -> &EpsilonGreedy<R> {
        &self.policy
    }
    pub fn policy_mut(&mut self) -> &mut EpsilonGreedy<R> {
        &mut self.policy
    }
}

impl<R: Rng> Player for ComputerPlayerRL<R> {
    fn set_mark(&mut self, mark: Marks) {
        self.mark = mark;
    }
    fn mark(&self) -> Marks {
        self.mark
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board, q: &QTable) -> Option<usize> {
        self.policy.choose_action(board.state_index(), board, q)
    }
}
