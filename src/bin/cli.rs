use vantage::board::Board;
use vantage::book::PolyglotBook;
use vantage::engine::Engine;
use std::io::{self, BufRead};

/// No arguments: interactive UCI loop on stdin/stdout. `-g <ms> -t <ms>
/// [uci-move...]`: one-shot mode, applying the given moves to the startpos
/// and printing a single bestmove to stdout (§6).
fn main() {
    #[cfg(feature = "cli")]
    vantage::logger::init_logging("logs/vantage.log", "info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        run_uci_loop();
    } else {
        run_one_shot(&args);
    }
}

fn run_one_shot(args: &[String]) {
    let mut game_ms: u64 = 0;
    let mut our_ms: u64 = 0;
    let mut moves: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-g" => {
                game_ms = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "-t" => {
                our_ms = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            other => {
                moves.push(other);
                i += 1;
            }
        }
    }

    let mut engine = Engine::new();
    for uci in moves.iter().copied() {
        if let Err(e) = engine.apply_move(uci) {
            eprintln!("info string rejecting move {uci}: {e}");
            return;
        }
    }

    let (_score, best) = engine.search_time(game_ms, our_ms);
    match best {
        Some(mv) => println!("{}", mv.to_uci()),
        None => println!("0000"),
    }
}

fn run_uci_loop() {
    let mut engine = Engine::new();
    let book = PolyglotBook::load("book.bin").ok();
    if book.is_some() {
        println!("info string opening book loaded successfully");
    } else {
        println!("info string no opening book found (book.bin), searching only");
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "uci" => {
                println!("id name Vantage");
                println!("id author the Vantage contributors");
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => engine = Engine::new(),
            "position" => handle_position(&parts, &mut engine),
            "go" => handle_go(&parts, &mut engine, &book),
            "d" | "display" => println!("{}", engine.board),
            "quit" => break,
            _ => {}
        }
    }
}

fn handle_position(parts: &[&str], engine: &mut Engine) {
    let board = if parts.len() > 1 && parts[1] == "startpos" {
        Board::new()
    } else if parts.len() > 1 && parts[1] == "fen" {
        let fen_start = 2;
        let moves_idx = parts
            .iter()
            .position(|&p| p == "moves")
            .unwrap_or(parts.len());
        let fen_string = parts[fen_start..moves_idx].join(" ");
        match fen_string.parse::<Board>() {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, fen = %fen_string, "rejecting malformed position fen");
                return;
            }
        }
    } else {
        Board::new()
    };

    let mut staging = Engine { board };
    if let Some(moves_idx) = parts.iter().position(|&p| p == "moves") {
        for uci in parts[moves_idx + 1..].iter().copied() {
            if let Err(e) = staging.apply_move(uci) {
                tracing::warn!(error = %e, mv = %uci, "rejecting illegal move in position command");
                return;
            }
        }
    }

    engine.board = staging.board;
}

fn handle_go(parts: &[&str], engine: &mut Engine, book: &Option<PolyglotBook>) {
    if let Some(b) = book {
        if let Some(mv) = b.probe(&engine.board) {
            println!("info string book move found");
            println!("bestmove {}", mv.to_uci());
            return;
        }
    }

    let mut movetime: Option<u64> = None;
    let mut wtime: u64 = 0;
    let mut btime: u64 = 0;
    let mut depth: Option<i32> = None;

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "movetime" => {
                movetime = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "wtime" => {
                wtime = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "btime" => {
                btime = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "depth" => {
                depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            _ => i += 1,
        }
    }

    let (score, best) = if let Some(d) = depth {
        engine.search(d)
    } else {
        let our_ms = match engine.board.side_to_move {
            vantage::board::Color::White => wtime,
            vantage::board::Color::Black => btime,
        };
        let budget = movetime.unwrap_or(our_ms).max(1);
        engine.search_time(budget, budget)
    };

    tracing::info!(score, "search finished");
    match best {
        Some(mv) => println!("bestmove {}", mv.to_uci()),
        None => println!("bestmove 0000"),
    }
}
