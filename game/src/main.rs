mod human;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use human::HumanPlayer;
use learn_game::players::seeded_rng;
use learn_game::{
    evaluate, load_or_train, play_epsilon, train_agent, Board, ComputerPlayerRL, EpsilonGreedy,
    IsGameOver, Marks, Player, QTable, TrainingConfig, Variant,
};
use rand::prelude::SliceRandom;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "game", about = "Train a Q-learning tic-tac-toe agent and play against it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a fresh table and save it.
    Train {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        episodes: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        variant: Option<Variant>,
        #[arg(long, default_value = "qtable.pickle")]
        out: PathBuf,
        /// Also keep a dated copy of the table in this directory.
        #[arg(long)]
        archive_dir: Option<PathBuf>,
    },
    /// Play against the agent; trains first if the table cannot be loaded.
    Play {
        #[arg(long, default_value = "qtable.pickle")]
        table: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Measure the greedy agent against the random opponent.
    Evaluate {
        #[arg(long, default_value = "qtable.pickle")]
        table: PathBuf,
        #[arg(long, default_value_t = 1_000)]
        games: usize,
        #[arg(long, default_value_t = Variant::FixedRole)]
        variant: Variant,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write the non-zero entries of a saved table as JSON.
    Export {
        #[arg(long, default_value = "qtable.pickle")]
        table: PathBuf,
        #[arg(long, default_value = "qtable.json")]
        json: PathBuf,
    },
}

fn read_table(path: &Path) -> Result<QTable> {
    let config = TrainingConfig::default();
    QTable::from_disk(path, config.learning_rate, config.discount_rate)
        .with_context(|| format!("loading q-table {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<TrainingConfig> {
    match path {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("reading training config {}", path.display())),
        None => Ok(TrainingConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match Cli::parse().command {
        Command::Train {
            config,
            episodes,
            seed,
            variant,
            out,
            archive_dir,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(episodes) = episodes {
                config.episodes = episodes;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(variant) = variant {
                config.variant = variant;
            }
            let (q, report) = train_agent(&config).context("training the agent")?;
            println!("{report:?}");
            if let Err(err) = q.save(&out) {
                log::error!("could not save q-table to {}: {err}", out.display());
            }
            if let Some(dir) = archive_dir {
                match q.save_dated(&dir) {
                    Ok(path) => println!("archived q-table as {}", path.display()),
                    Err(err) => {
                        log::error!("could not archive q-table in {}: {err}", dir.display())
                    }
                }
            }
        }
        Command::Play { table, config } => {
            let config = load_config(config.as_deref())?;
            let (q, report) = load_or_train(&table, &config).context("preparing the agent")?;
            if report.is_some() && ask("Training finished. Save the q-table? (y/n) ")? {
                if let Err(err) = q.save(&table) {
                    log::error!("could not save q-table to {}: {err}", table.display());
                }
            }
            play_human_computer(&q, play_epsilon(&config, report.as_ref()))?;
        }
        Command::Evaluate {
            table,
            games,
            variant,
            seed,
        } => {
            let q = read_table(&table)?;
            let report = evaluate(&q, games, variant, seed)?;
            println!(
                "wins {} draws {} losses {} (non-loss rate {:.3})",
                report.wins,
                report.draws,
                report.losses,
                report.non_loss_rate()
            );
        }
        Command::Export { table, json } => {
            let q = read_table(&table)?;
            let written = q
                .export_json(&json)
                .with_context(|| format!("writing {}", json.display()))?;
            println!("exported {written} q-values to {}", json.display());
        }
    }
    Ok(())
}

fn ask(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_lowercase().starts_with('y'))
}

/// Human plays cross and moves first; the agent answers as nought, exploring
/// with the fixed rate `epsilon`.
fn play_human_computer(q: &QTable, epsilon: f64) -> Result<()> {
    println!("Cells are numbered\n0 1 2\n3 4 5\n6 7 8");
    let mut human = HumanPlayer::new("You".to_owned(), Marks::Cross);
    let policy = EpsilonGreedy::new(epsilon, seeded_rng(None, 0));
    let mut computer = ComputerPlayerRL::new("RL".to_owned(), policy);
    computer.set_mark(Marks::Nought);
    let mut fallback_rng = seeded_rng(None, 1);
    loop {
        let mut board = Board::new();
        let mut humans_turn = true;
        loop {
            let mark = if humans_turn { human.mark() } else { computer.mark() };
            let mv = if humans_turn {
                match human.choose_move(&board, q) {
                    Some(mv) => mv,
                    None => return Ok(()),
                }
            } else {
                let mut mv = computer.choose_move(&board, q).context("agent found no move")?;
                if !board.is_empty(mv) {
                    // Only reachable with a foreign table.
                    mv = *board
                        .enumerate_empty()
                        .choose(&mut fallback_rng)
                        .context("board is full")?;
                }
                println!("{} chose cell {mv}", computer.name());
                mv
            };
            board.make_move(mv, mark);
            match board.status(mark) {
                IsGameOver::InPlay => humans_turn = !humans_turn,
                IsGameOver::Drawn => {
                    println!("\n{board}The game ended in a draw.");
                    break;
                }
                IsGameOver::Win if humans_turn => {
                    println!("\n{board}{} won. Congratulations!", human.name());
                    break;
                }
                IsGameOver::Win => {
                    println!("\n{board}Really sorry, you have lost.");
                    break;
                }
            }
        }
        if !ask("Play again? (y/n) ")? {
            return Ok(());
        }
    }
}
