//! Line-oriented terminal sessions for the quiz and the editor.
//!
//! Both drivers read commands from any `BufRead` and write to any `Write`,
//! so they can be scripted.

use anyhow::Context;
use colored::Colorize;
use log::debug;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::editor::{Draft, NoteStore, SAVED_TEXT_KEY};
use crate::quiz::{Outcome, Phase, Quiz, Selection, Verdict};
use crate::render::{render_markdown, strip_controls};

const PROGRESS_WIDTH: usize = 20;

fn read_command<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line).context("failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Runs an already populated quiz until it is finished or abandoned.
/// Returns the outcome the user acknowledged last, if any.
pub fn run_quiz<R: BufRead, W: Write>(
    quiz: &mut Quiz,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<Option<Outcome>> {
    let mut redraw = true;

    loop {
        match quiz.phase().clone() {
            Phase::Loading => {
                writeln!(out, "Loading...")?;
                return Ok(None);
            }
            Phase::NotFound => {
                writeln!(out, "{}", "No questions found.".yellow())?;
                return Ok(None);
            }
            Phase::Submitted(outcome) => {
                writeln!(
                    out,
                    "{}",
                    format!("==========> {} <==========", outcome.message()).cyan()
                )?;
                if !outcome.retake_offered {
                    return Ok(Some(outcome));
                }
                write!(out, "{} ", "Press r to retake the quiz, anything else to finish:".cyan())?;
                out.flush()?;
                match read_command(&mut input)?.as_deref().map(str::trim) {
                    Some("r") => {
                        quiz.retake()?;
                        redraw = true;
                    }
                    _ => return Ok(Some(outcome)),
                }
            }
            Phase::Active => {
                if redraw {
                    draw_question(quiz, out)?;
                    redraw = false;
                }
                write!(out, "{} ", prompt(quiz).cyan())?;
                out.flush()?;

                let Some(command) = read_command(&mut input)? else {
                    writeln!(out, "{}", "Quitting Early!".cyan())?;
                    return Ok(None);
                };
                debug!("[Quiz] command: {:?}", command);
                let command = command.trim();
                if command == "q" {
                    writeln!(out, "{}", "Quitting Early!".cyan())?;
                    return Ok(None);
                }
                redraw = handle_command(quiz, command, out)?;
            }
        }
    }
}

/// Applies one command; true when the whole question should be redrawn.
fn handle_command<W: Write>(quiz: &mut Quiz, command: &str, out: &mut W) -> anyhow::Result<bool> {
    match command {
        "c" => {
            match quiz.check()? {
                Verdict::Correct => writeln!(out, "{}", "Correct answer!".bright_green())?,
                _ => writeln!(out, "{}", "Incorrect answer. Please try again.".bright_red())?,
            }
            Ok(false)
        }
        "n" => match quiz.next() {
            Ok(()) => Ok(true),
            Err(e) => {
                writeln!(out, "{}", e.to_string().yellow())?;
                Ok(false)
            }
        },
        "s" => {
            if let Err(e) = quiz.submit() {
                writeln!(out, "{}", e.to_string().yellow())?;
            }
            Ok(false)
        }
        "" => Ok(true),
        other => {
            let Ok(number) = other.parse::<usize>() else {
                writeln!(out, "{}", format!("Unknown command '{}'.", other).bright_red())?;
                return Ok(false);
            };
            let options = quiz.current().map_or(0, |q| q.options.len());
            if number == 0 || number > options {
                writeln!(
                    out,
                    "{}",
                    format!("There are only {} options available!", options).bright_red()
                )?;
                return Ok(false);
            }
            let value = quiz
                .current()
                .map(|q| q.options[number - 1].clone())
                .unwrap_or_default();
            match quiz.select(&value) {
                Ok(()) => draw_options(quiz, out)?,
                Err(e) => writeln!(out, "{}", e.to_string().yellow())?,
            }
            Ok(false)
        }
    }
}

fn prompt(quiz: &Quiz) -> String {
    let mut actions = vec!["number to choose", "c to check"];
    if quiz.can_advance() {
        actions.push("n for the next question");
    }
    if quiz.is_last() {
        actions.push("s to submit");
    }
    actions.push("q to quit");
    format!("Answer ({}):", actions.join(", "))
}

fn draw_question<W: Write>(quiz: &Quiz, out: &mut W) -> anyhow::Result<()> {
    let Some(question) = quiz.current() else {
        return Ok(());
    };
    let percent = quiz.progress().unwrap_or(0.0);
    let filled = (percent / 100.0 * PROGRESS_WIDTH as f64).round() as usize;

    writeln!(out)?;
    writeln!(
        out,
        "{} {}{} {:.0}%",
        format!(
            "Question {}/{}",
            quiz.current_index() + 1,
            quiz.questions().len()
        )
        .bold(),
        "█".repeat(filled).green(),
        "░".repeat(PROGRESS_WIDTH - filled.min(PROGRESS_WIDTH)).dimmed(),
        percent
    )?;
    writeln!(out, "{}", render_markdown(&question.content))?;
    writeln!(out)?;
    draw_options(quiz, out)
}

fn draw_options<W: Write>(quiz: &Quiz, out: &mut W) -> anyhow::Result<()> {
    let Some(question) = quiz.current() else {
        return Ok(());
    };
    let selection = quiz.selection();
    for (i, option) in question.options.iter().enumerate() {
        let picked = selection.is_selected(option);
        let mark = match (selection, picked) {
            (Selection::Single(_), true) => "(•)",
            (Selection::Single(_), false) => "( )",
            (Selection::Multi(_), true) => "[x]",
            (Selection::Multi(_), false) => "[ ]",
        };
        writeln!(
            out,
            "  {}. {} {}",
            format!("{}", i + 1).bold(),
            mark,
            strip_controls(option)
        )?;
    }
    Ok(())
}

/// Starts a draft from an imported file, or else from the saved slot.
pub fn open_draft(store: &NoteStore, file: Option<&Path>, limit: usize) -> anyhow::Result<Draft> {
    let mut draft = Draft::new(limit);
    let text = match file {
        Some(path) => Some(
            fs::read_to_string(path).context(format!("failed to read {}", path.display()))?,
        ),
        None => store.get(SAVED_TEXT_KEY)?,
    };
    if let Some(text) = text {
        draft.replace(&text)?;
    }
    Ok(draft)
}

/// Runs the editor until `:q` or end of input.
pub fn run_editor<R: BufRead, W: Write>(
    draft: &mut Draft,
    store: &NoteStore,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(
        out,
        "{}",
        format!(
            "Editor ({}/{} characters). Type text, or :w save, :p preview, :c clear, :q quit.",
            draft.chars(),
            draft.limit()
        )
        .cyan()
    )?;

    while let Some(line) = read_command(&mut input)? {
        match line.trim() {
            ":q" => break,
            ":w" => {
                store.set(SAVED_TEXT_KEY, draft.text())?;
                writeln!(out, "{}", format!("Saved to {}.", store.path().display()).green())?;
            }
            ":p" => {
                writeln!(out, "{}", "Output Preview".bold())?;
                writeln!(out, "{}", draft.preview())?;
            }
            ":c" => {
                draft.clear();
                writeln!(out, "{}", "Cleared.".cyan())?;
            }
            _ => {
                if let Err(e) = draft.push_line(&line) {
                    writeln!(out, "{}", e.to_string().bright_red())?;
                }
            }
        }
    }
    Ok(())
}
