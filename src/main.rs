use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use log::debug;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use mdquiz::editor::{preview, NoteStore};
use mdquiz::quiz::{load_questions, Fetcher, Quiz, RetakePolicy};
use mdquiz::session::{open_draft, run_editor, run_quiz};
use mdquiz::Config;

#[derive(Parser, Debug)]
#[command(name = "mdquiz")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "error")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take the quiz
    Quiz {
        /// directory or URL the quiz files are resolved against
        #[arg(short, long)]
        base: Option<String>,
        /// quiz file, repeat for several (replaces the configured list)
        #[arg(short, long = "file", value_name = "FILE")]
        files: Vec<String>,
        #[arg(long)]
        retake: Option<RetakePolicy>,
        #[arg(long)]
        pass: Option<usize>,
        #[arg(long)]
        borderline: Option<usize>,
        /// print the final outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a draft with a live preview
    Edit {
        #[arg(short, long, value_name = "FILE")]
        store: Option<PathBuf>,
        /// markdown file to start from instead of the saved draft
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Render a markdown or HTML file
    Preview { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    let mut config = Config::from_env().context("invalid configuration")?;
    debug!("[Setup] {:?}", config);

    match args.command {
        Command::Quiz {
            base,
            files,
            retake,
            pass,
            borderline,
            json,
        } => {
            if let Some(base) = base {
                config.base = base;
            }
            if !files.is_empty() {
                config.quiz_files = files;
            }
            config.retake = retake.unwrap_or(config.retake);
            config.pass_score = pass.unwrap_or(config.pass_score);
            config.borderline_score = borderline.unwrap_or(config.borderline_score);
            take_quiz(&config, json)
        }
        Command::Edit { store, file, limit } => {
            config.notes_path = store.unwrap_or(config.notes_path);
            config.char_limit = limit.unwrap_or(config.char_limit);
            edit(&config, file)
        }
        Command::Preview { path } => {
            let text =
                fs::read_to_string(&path).context(format!("failed to read {}", path.display()))?;
            println!("{}", preview(&text));
            Ok(())
        }
    }
}

fn take_quiz(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut quiz = Quiz::new(config.score_bands(), config.retake);
    println!("{}", "Loading...".cyan());
    quiz.populate(load_questions(&Fetcher, &config.sources()))
        .context("could not load the quiz questions")?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let outcome = run_quiz(&mut quiz, stdin.lock(), &mut stdout)?;

    if let (true, Some(outcome)) = (json, outcome) {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&outcome)?)?;
    }
    Ok(())
}

fn edit(config: &Config, file: Option<PathBuf>) -> anyhow::Result<()> {
    let store = NoteStore::new(&config.notes_path);
    let mut draft = open_draft(&store, file.as_deref(), config.char_limit)
        .context("could not open the draft")?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_editor(&mut draft, &store, stdin.lock(), &mut stdout)
}
