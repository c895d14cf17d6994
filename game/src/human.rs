use learn_game::{Board, Marks, Player, QTable};
use std::io::{self, BufRead, Write};

#[derive(Debug)]
pub struct HumanPlayer {
    pub name: String,
    pub mark: Marks,
}

impl HumanPlayer {
    pub fn new(name: String, mark: Marks) -> Self {
        HumanPlayer { name, mark }
    }
}

/// Reads a cell number until it names an empty cell. `None` on end of input.
fn move_from_human(board: &Board, name: &str) -> io::Result<Option<usize>> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{name}, your move (0-8): ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(pos) if pos < 9 && board.is_empty(pos) => return Ok(Some(pos)),
            Ok(_) => println!("That cell is not available, try again."),
            Err(_) => println!("Please type a digit from 0 to 8."),
        }
    }
}

impl Player for HumanPlayer {
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
        println!("\n{board}");
        match move_from_human(board, &self.name) {
            Ok(mv) => mv,
            Err(err) => {
                log::error!("failed to read move: {err}");
                None
            }
        }
    }
}
