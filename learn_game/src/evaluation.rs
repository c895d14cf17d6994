use crate::board::{Board, IsGameOver, Marks};
use crate::config::Variant;
use crate::error::{Error, Result};
use crate::players::{seeded_rng, ComputerPlayerRL, Player, RandomPlayer};
use crate::policy::EpsilonGreedy;
use crate::q_table::QTable;
use log::info;
use rand::Rng;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EvaluationReport {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl EvaluationReport {
    pub fn games(&self) -> usize {
        self.wins + self.draws + self.losses
    }
    pub fn win_rate(&self) -> f64 {
        self.wins as f64 / self.games().max(1) as f64
    }
    pub fn non_loss_rate(&self) -> f64 {
        (self.wins + self.draws) as f64 / self.games().max(1) as f64
    }
}

/// Plays one game to the end without learning. `first` moves first.
/// Returns the winning mark, or `None` for a draw.
pub fn play_match<'a>(
    first: &'a mut dyn Player,
    second: &'a mut dyn Player,
    q: &QTable,
) -> Result<Option<Marks>> {
    let mut board = Board::new();
    let mut seats = [first, second];
    let mut turn = 0;
    loop {
        let player = &mut seats[turn];
        let mark = player.mark();
        let mv = player.choose_move(&board, q).ok_or(Error::NoLegalMoves)?;
        if !board.make_move(mv, mark) {
            return Err(Error::IllegalMove { pos: mv });
        }
        match board.status(mark) {
            IsGameOver::Win => return Ok(Some(mark)),
            IsGameOver::Drawn => return Ok(None),
            IsGameOver::InPlay => turn = 1 - turn,
        }
    }
}

/// Greedy agent against the random opponent over `games` held-out games,
/// seated the same way `variant` seats it during training.
pub fn evaluate(
    q: &QTable,
    games: usize,
    variant: Variant,
    seed: Option<u64>,
) -> Result<EvaluationReport> {
    let policy = EpsilonGreedy::new(0.0, seeded_rng(seed, 10));
    let mut agent = ComputerPlayerRL::new("RL".to_owned(), policy);
    let mut opponent = RandomPlayer::new("random".to_owned(), seeded_rng(seed, 11));
    let mut role_rng = seeded_rng(seed, 12);
    let mut report = EvaluationReport::default();
    for _ in 0..games {
        let agent_mark = match variant {
            Variant::FixedRole => Marks::Nought,
            Variant::RandomizedRole if role_rng.gen_bool(0.5) => Marks::Cross,
            Variant::RandomizedRole => Marks::Nought,
        };
        agent.set_mark(agent_mark);
        opponent.set_mark(agent_mark.other());
        let agent_first = variant == Variant::FixedRole || agent_mark == Marks::Cross;
        let winner = if agent_first {
            play_match(&mut agent, &mut opponent, q)?
        } else {
            play_match(&mut opponent, &mut agent, q)?
        };
        match winner {
            Some(mark) if mark == agent_mark => report.wins += 1,
            Some(_) => report.losses += 1,
            None => report.draws += 1,
        }
    }
    info!(
        "evaluation over {} games: {} wins, {} draws, {} losses ({:.1}% non-losses)",
        report.games(),
        report.wins,
        report.draws,
        report.losses,
        100.0 * report.non_loss_rate()
    );
    Ok(report)
}
