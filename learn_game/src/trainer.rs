use crate::board::{Board, IsGameOver, Marks};
use crate::config::{TrainingConfig, Variant};
use crate::error::{Error, Result};
use crate::players::{seeded_rng, ComputerPlayerRL, Player, RandomPlayer};
use crate::policy::EpsilonGreedy;
use crate::q_table::QTable;
use log::{debug, info};
use rand::{rngs::StdRng, Rng};

pub const WIN_REWARD: f64 = 1.0;
pub const DRAW_REWARD: f64 = 0.0;
pub const LOSS_REWARD: f64 = -1.0;
/// Charged when the agent's move lets the opponent win on its next move.
pub const WALKED_INTO_LOSS_PENALTY: f64 = -0.8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EpisodeOutcome {
    AgentWin,
    OpponentWin,
    Draw,
    AgentWalkedIntoLoss,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingReport {
    pub episodes: usize,
    pub agent_wins: usize,
    pub opponent_wins: usize,
    pub draws: usize,
    pub walked_into_loss: usize,
    pub final_epsilon: f64,
}

impl TrainingReport {
    fn record(&mut self, outcome: EpisodeOutcome) {
        self.episodes += 1;
        match outcome {
            EpisodeOutcome::AgentWin => self.agent_wins += 1,
            EpisodeOutcome::OpponentWin => self.opponent_wins += 1,
            EpisodeOutcome::Draw => self.draws += 1,
            EpisodeOutcome::AgentWalkedIntoLoss => self.walked_into_loss += 1,
        }
    }
}

/// Self-play engine: the agent against a uniform-random opponent.
pub struct Trainer<R = StdRng> {
    config: TrainingConfig,
    agent: ComputerPlayerRL<R>,
    opponent: RandomPlayer<R>,
    role_rng: R,
    episode: usize,
}

impl Trainer<StdRng> {
    /// Seeds every random stream from `config.seed`, or from entropy.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        let seed = config.seed;
        Trainer::with_rngs(config, seeded_rng(seed, 0), seeded_rng(seed, 1), seeded_rng(seed, 2))
    }
}

impl<R: Rng> Trainer<R> {
    pub fn with_rngs(
        config: TrainingConfig,
        agent_rng: R,
        opponent_rng: R,
        role_rng: R,
    ) -> Result<Self> {
        config.validate()?;
        let policy = EpsilonGreedy::new(config.epsilon, agent_rng);
        Ok(Trainer {
            agent: ComputerPlayerRL::new("RL".to_owned(), policy),
            opponent: RandomPlayer::new("random".to_owned(), opponent_rng),
            role_rng,
            config,
            episode: 0,
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f64 {
        self.agent.policy().epsilon()
    }

    pub fn episode(&self) -> usize {
        self.episode
    }

    /// Runs the configured number of episodes, decaying epsilon after each.
    pub fn train(&mut self, q: &mut QTable) -> Result<TrainingReport> {
        info!(
            "training for {} episodes ({} variant, epsilon {})",
            self.config.episodes, self.config.variant, self.epsilon()
        );
        let mut report = TrainingReport::default();
        let mut window = TrainingReport::default();
        for _ in 0..self.config.episodes {
            let outcome = self.learn_episode(q)?;
            report.record(outcome);
            window.record(outcome);
            self.agent
                .policy_mut()
                .decay(self.config.epsilon_decay, self.config.min_epsilon);
            if self.episode % self.config.report_every == 0 {
                info!(
                    "episode {}/{} epsilon={:.5} wins={} losses={} draws={} walked_into_loss={}",
                    self.episode,
                    self.config.episodes,
                    self.epsilon(),
                    window.agent_wins,
                    window.opponent_wins,
                    window.draws,
                    window.walked_into_loss
                );
                window = TrainingReport::default();
            }
        }
        report.final_epsilon = self.epsilon();
        info!("training finished: {report:?}");
        Ok(report)
    }

    /// Plays and learns from one episode. Epsilon is left untouched.
    pub fn learn_episode(&mut self, q: &mut QTable) -> Result<EpisodeOutcome> {
        let (agent_first, shaping) = match self.config.variant {
            Variant::FixedRole => {
                self.assign_marks(Marks::Nought);
                (true, false)
            }
            Variant::RandomizedRole => {
                let mark = if self.role_rng.gen_bool(0.5) { Marks::Cross } else { Marks::Nought };
                self.assign_marks(mark);
                (mark == Marks::Cross, true)
            }
        };
        let outcome = self.play_episode(q, agent_first, shaping)?;
        self.episode += 1;
        debug!("episode {} ended with {:?}", self.episode, outcome);
        Ok(outcome)
    }

    fn assign_marks(&mut self, agent_mark: Marks) {
        self.agent.set_mark(agent_mark);
        self.opponent.set_mark(agent_mark.other());
    }

    // Only transitions followed by a terminal event are ever credited. The
    // agent's last (state, action) waits for the opponent's reply: an
    // opponent win credits it with -1 against the post-move state, an
    // opponent draw with 0 and no next state.
    fn play_episode(
        &mut self,
        q: &mut QTable,
        agent_first: bool,
        shaping: bool,
    ) -> Result<EpisodeOutcome> {
        let mut board = Board::new();
        let agent_mark = self.agent.mark();
        let opponent_mark = self.opponent.mark();
        let mut pending: Option<(usize, usize)> = None;
        let mut agent_turn = agent_first;
        loop {
            if agent_turn {
                let state = board.state_index();
                let action = self.agent.choose_move(&board, q).ok_or(Error::NoLegalMoves)?;
                if !board.make_move(action, agent_mark) {
                    return Err(Error::IllegalMove { pos: action });
                }
                match board.status(agent_mark) {
                    IsGameOver::Win => {
                        q.update(state, action, WIN_REWARD, None);
                        return Ok(EpisodeOutcome::AgentWin);
                    }
                    IsGameOver::Drawn => {
                        q.update(state, action, DRAW_REWARD, None);
                        return Ok(EpisodeOutcome::Draw);
                    }
                    IsGameOver::InPlay => {}
                }
                if shaping && board.opponent_can_win(opponent_mark) {
                    q.update(state, action, WALKED_INTO_LOSS_PENALTY, None);
                    return Ok(EpisodeOutcome::AgentWalkedIntoLoss);
                }
                pending = Some((state, action));
            } else {
                let mv = self.opponent.choose_move(&board, q).ok_or(Error::NoLegalMoves)?;
                if !board.make_move(mv, opponent_mark) {
                    return Err(Error::IllegalMove { pos: mv });
                }
                match board.status(opponent_mark) {
                    IsGameOver::Win => {
                        if let Some((state, action)) = pending {
                            q.update(state, action, LOSS_REWARD, Some(board.state_index()));
                        }
                        return Ok(EpisodeOutcome::OpponentWin);
                    }
                    IsGameOver::Drawn => {
                        if let Some((state, action)) = pending {
                            q.update(state, action, DRAW_REWARD, None);
                        }
                        return Ok(EpisodeOutcome::Draw);
                    }
                    IsGameOver::InPlay => {}
                }
            }
            agent_turn = !agent_turn;
        }
    }
}
