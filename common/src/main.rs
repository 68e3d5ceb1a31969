use anyhow::Context;
use clap::Parser;
use minesweeper::*;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "minesweeper", about = "Minesweeper with a computer player", version)]
struct Args {
    /// Board width and height
    #[arg(long, default_value_t = config::DEFAULT_SIZE)]
    size: usize,
    /// Number of mines (10-20)
    #[arg(long, default_value_t = config::MIN_MINES)]
    mines: usize,
    /// Solver tier: easy, medium or hard
    #[arg(long, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,
    /// Turn mode: manual, interactive or automatic
    #[arg(long, default_value_t = TurnMode::Interactive)]
    mode: TurnMode,
    /// Seed for a reproducible round
    #[arg(long)]
    seed: Option<u64>,
    /// Pause between solver moves, in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_AI_DELAY_MS)]
    delay_ms: u64,
}

impl From<Args> for GameConfig {
    fn from(args: Args) -> Self {
        GameConfig {
            size: args.size,
            mines: args.mines,
            difficulty: args.difficulty,
            mode: args.mode,
            seed: args.seed,
            ai_delay_ms: args.delay_ms,
        }
    }
}

enum Command {
    Play(Move),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&verb) = parts.first() else {
        return Err("Empty command".to_string());
    };
    match verb.to_lowercase().as_str() {
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "h" | "help" => Ok(Command::Help),
        "r" | "reveal" | "f" | "flag" => {
            if parts.len() < 3 {
                return Err(format!("Usage: {} row col", verb));
            }
            let row = parts[1].parse::<usize>().map_err(|_| "Invalid row".to_string())?;
            let col = parts[2].parse::<usize>().map_err(|_| "Invalid col".to_string())?;
            let at = Point { row, col };
            Ok(Command::Play(if verb.starts_with('r') {
                Move::reveal(at)
            } else {
                Move::flag(at)
            }))
        }
        other => Err(format!("Unknown command '{}'. Type 'h' for help.", other)),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  r row col - reveal a cell (0-based)");
    println!("  f row col - toggle a flag");
    println!("  q         - quit");
    println!("  h         - show this help");
}

fn describe(mv: Move) -> String {
    match mv.action {
        Action::Reveal => format!("reveals {}", mv.at),
        Action::Flag => format!("flags {}", mv.at),
    }
}

fn main() -> anyhow::Result<()> {
    // --- 1. Initialization ---
    let config = GameConfig::from(Args::parse());
    let delay = Duration::from_millis(config.ai_delay_ms);
    let mut session = Session::new(&config).context("invalid game settings")?;

    println!("--- Minesweeper ---");
    println!(
        "{}x{} board, {} mines, {} mode, {} solver",
        config.size, config.size, config.mines, config.mode, config.difficulty
    );
    if config.mode != TurnMode::Automatic {
        print_help();
    }
    print!("{}", session.board());

    // --- 2. Game Loop ---
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !session.game().is_over() {
        match session.whose_turn() {
            Turn::Solver => {
                thread::sleep(delay);
                match session.solver_move() {
                    Some((mv, _)) => println!("Solver {}.", describe(mv)),
                    None => {
                        println!(
                            "Solver has no move left, continuing in {} mode.",
                            session.turns().mode()
                        );
                        continue;
                    }
                }
            }
            Turn::Player => {
                print!("flags left {} > ", session.board().remaining_flags());
                io::stdout().flush()?;
                let Some(line) = lines.next() else {
                    println!();
                    return Ok(());
                };
                match parse_command(line?.trim()) {
                    Ok(Command::Quit) => return Ok(()),
                    Ok(Command::Help) => {
                        print_help();
                        continue;
                    }
                    Ok(Command::Play(mv)) => {
                        if !session.player_move(mv).is_applied() {
                            println!("Nothing to do at {}.", mv.at);
                            continue;
                        }
                    }
                    Err(message) => {
                        println!("{}", message);
                        continue;
                    }
                }
            }
        }
        print!("{}", session.board());
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    print!("{}", session.board().render(true));
    println!("Time: {}", format_elapsed(session.timer().elapsed()));
    match session.game().state {
        RoundState::Won => println!("Result: board cleared!"),
        RoundState::Lost => println!("Result: hit a mine."),
        state => println!("Result: the round ended unexpectedly ({:?}).", state),
    }
    if let Some(points) = session.summary().and_then(|summary| summary.score()) {
        println!("Score: {}", points);
    }
    Ok(())
}
