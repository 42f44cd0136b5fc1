// dawgplay CLI
// Compiles word lists and finds the best move for a rack

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use dawgplay::dawg::{compile_file, Lexicon, WordListOptions};
use dawgplay::search::{find_best_move, Edition, SearchConfig};
use env_logger::Env;
use log::info;

/// Word list compiler and move finder
#[derive(Parser, Debug)]
#[command(name = "dawgplay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a word list (one word per line) into a dictionary file
    Compile {
        /// Word list to read
        list: PathBuf,
        /// Dictionary file to write; the alphabet goes to <OUT>.alphabet
        out: PathBuf,
        /// Skip words shorter than this
        #[arg(long, default_value = "2")]
        min_length: usize,
        /// Skip words longer than this
        #[arg(long)]
        max_length: Option<usize>,
        /// Keep words as written instead of upper-casing them
        #[arg(long)]
        keep_case: bool,
    },
    /// Check words against a dictionary
    Lookup {
        /// Dictionary file
        dict: PathBuf,
        /// Words to check
        #[arg(required = true)]
        words: Vec<String>,
        /// Check for a letter sequence inside any word instead of a whole word
        #[arg(short, long)]
        sequence: bool,
    },
    /// List the words a set of letters can spell ('?' is a blank)
    Anagrams {
        /// Dictionary file
        dict: PathBuf,
        /// Available letters
        letters: String,
    },
    /// Find the highest scoring move
    Play(PlayArgs),
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Dictionary file
    dict: PathBuf,
    /// Rack letters ('?' is a blank)
    #[arg(short, long)]
    rack: String,
    /// Board file: one row per line, '.' for empty, lower case for blanks
    #[arg(short, long)]
    board: Option<PathBuf>,
    /// Edition JSON file (defaults to the built-in English edition)
    #[arg(short, long)]
    edition: Option<PathBuf>,
    /// Give up after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Seed for the opening move's axis
    #[arg(long)]
    seed: Option<u64>,
    /// Print every improvement found on the way
    #[arg(short, long)]
    improvements: bool,
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// Rack notation from command line letters: '?' becomes a blank.
fn rack_notation(letters: &str) -> String {
    letters.replace('?', " ").to_uppercase()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Compile {
            list,
            out,
            min_length,
            max_length,
            keep_case,
        } => {
            let options = WordListOptions {
                min_length,
                max_length,
                uppercase: !keep_case,
            };
            let encoded = compile_file(&list, &options)?;
            encoded.save(&out)?;
            info!("wrote {} nodes to {}", encoded.node_count(), out.display());
        }
        Command::Lookup {
            dict,
            words,
            sequence,
        } => {
            let lexicon = Lexicon::open(&dict)?;
            for word in words {
                let found = if sequence {
                    lexicon.has_sequence(&word)
                } else {
                    lexicon.has_word(&word)
                };
                println!("{word}: {}", if found { "yes" } else { "no" });
            }
        }
        Command::Anagrams { dict, letters } => {
            let lexicon = Lexicon::open(&dict)?;
            for word in lexicon.find_anagrams(&rack_notation(&letters)) {
                println!("{word}");
            }
        }
        Command::Play(play_args) => play(play_args)?,
    }
    Ok(())
}

/// Searches for the best move and prints it. A search that runs out of time
/// is an error, so the exit status tells it apart from "no move".
fn play(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let lexicon = Lexicon::open(&args.dict)?;
    let edition = match &args.edition {
        Some(path) => Edition::from_file(path)?,
        None => Edition::english(),
    };
    let mut board = edition.new_board()?;
    if let Some(path) = &args.board {
        let rows: Vec<String> = fs::read_to_string(path)?
            .lines()
            .map(str::to_string)
            .collect();
        board.load_tiles(&rows, &edition)?;
    }
    let rack = edition.rack(&rack_notation(&args.rack))?;

    let mut config = SearchConfig::new().record_improvements(args.improvements);
    if let Some(ms) = args.time_limit_ms {
        config = config.with_time_limit(Duration::from_millis(ms));
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let outcome = find_best_move(&lexicon, &edition, &board, &rack, &config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    for (i, candidate) in outcome.improvements.iter().enumerate() {
        println!("{:>3}. {candidate}", i + 1);
    }
    match outcome.best {
        Some(best) => {
            for placement in &best.placements {
                board.place(placement.col, placement.row, placement.tile)?;
            }
            println!("{board}");
            println!("Best: {best}");
        }
        None => println!("No move found."),
    }
    Ok(())
}
