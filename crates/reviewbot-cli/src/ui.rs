//! Terminal UI and the interactive question loop

use colored::*;
use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, BufRead, IsTerminal, Write};

use reviewbot_core::{LLMProvider, Result, Retriever};

use crate::chat::ReviewChat;

/// Prompt shown before every question
pub const PROMPT: &str = "Ask your question (q to quit): ";

/// The exact input that ends the loop
pub const QUIT: &str = "q";

const SEPARATOR: &str = "\n\n-----------------------------";

/// Source of user questions
pub trait InputSource {
    /// Read the next line without its terminator; `None` once input is exhausted
    ///
    /// `prompt` has already been written when this is called; it is passed
    /// along for sources that need to redraw the line.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// States of the interactive loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInput,
    Processing(String),
    Terminal,
}

/// What happened during a run of the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub answered: usize,
    pub failed: usize,
}

/// Run the read / answer / print loop until `q` or end of input
///
/// Per-turn failures are printed and the loop keeps going; anything else
/// aborts it.
pub async fn run_loop<R, L, I, W>(
    chat: &ReviewChat<R, L>,
    input: &mut I,
    out: &mut W,
) -> Result<LoopSummary>
where
    R: Retriever,
    L: LLMProvider,
    I: InputSource,
    W: Write,
{
    let mut summary = LoopSummary::default();
    let mut state = LoopState::AwaitingInput;

    loop {
        state = match state {
            LoopState::AwaitingInput => {
                writeln!(out, "{}", SEPARATOR)?;
                write!(out, "{}", PROMPT)?;
                out.flush()?;

                match input.next_line(PROMPT)? {
                    None => LoopState::Terminal,
                    Some(line) => {
                        writeln!(out, "\n\n")?;
                        if line == QUIT {
                            LoopState::Terminal
                        } else {
                            LoopState::Processing(line)
                        }
                    }
                }
            }
            LoopState::Processing(question) => {
                match chat.ask(&question).await {
                    Ok(answer) => {
                        writeln!(out, "{}", answer)?;
                        summary.answered += 1;
                    }
                    Err(e) if e.is_per_turn() => {
                        writeln!(out, "{} {}", "❌".red(), e.to_string().red())?;
                        summary.failed += 1;
                    }
                    Err(e) => return Err(e),
                }
                LoopState::AwaitingInput
            }
            LoopState::Terminal => break,
        };
    }

    Ok(summary)
}

/// Lines from any buffered reader, e.g. piped stdin
pub struct LineInput<B: BufRead> {
    reader: B,
}

impl<B: BufRead> LineInput<B> {
    pub fn new(reader: B) -> Self {
        Self { reader }
    }
}

impl<B: BufRead> InputSource for LineInput<B> {
    fn next_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// Interactive terminal input with ↑/↓ navigation through earlier questions
///
/// Falls back to plain line reading when stdin is not a terminal.
pub struct TerminalInput {
    history: Vec<String>,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }

    fn redraw(prompt: &str, input: &str) -> io::Result<()> {
        execute!(
            io::stdout(),
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(prompt),
            Print(input)
        )
    }

    fn read_raw(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut editor = LineEditor::default();

        loop {
            let Event::Key(key_event) = event::read()? else {
                continue;
            };
            if key_event.kind != KeyEventKind::Press {
                continue;
            }

            match editor.handle_key(key_event, &self.history) {
                KeyAction::Submit => return Ok(Some(editor.input)),
                KeyAction::Abort => return Ok(None),
                KeyAction::Redraw => Self::redraw(prompt, &editor.input)?,
                KeyAction::Ignore => {}
            }
        }
    }
}

/// What the terminal should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Submit,
    Abort,
    Redraw,
    Ignore,
}

/// Line being edited in raw mode, plus the position in the question history
#[derive(Debug, Default)]
struct LineEditor {
    input: String,
    history_index: Option<usize>,
}

impl LineEditor {
    fn handle_key(&mut self, key_event: KeyEvent, history: &[String]) -> KeyAction {
        let control = key_event.modifiers.contains(KeyModifiers::CONTROL);

        match key_event.code {
            KeyCode::Enter => KeyAction::Submit,
            KeyCode::Char('c') | KeyCode::Char('d') if control => KeyAction::Abort,
            // Other control chords are not text.
            KeyCode::Char(_) if control => KeyAction::Ignore,
            KeyCode::Char(c) => {
                self.input.push(c);
                KeyAction::Redraw
            }
            KeyCode::Backspace => {
                if self.input.pop().is_some() {
                    KeyAction::Redraw
                } else {
                    KeyAction::Ignore
                }
            }
            KeyCode::Esc => {
                self.input.clear();
                self.history_index = None;
                KeyAction::Redraw
            }
            KeyCode::Up => {
                if history.is_empty() {
                    return KeyAction::Ignore;
                }
                let new_index = match self.history_index {
                    None => history.len() - 1,
                    Some(idx) if idx > 0 => idx - 1,
                    Some(idx) => idx,
                };
                self.history_index = Some(new_index);
                self.input = history[new_index].clone();
                KeyAction::Redraw
            }
            KeyCode::Down => {
                let Some(idx) = self.history_index else {
                    return KeyAction::Ignore;
                };
                if idx + 1 < history.len() {
                    self.history_index = Some(idx + 1);
                    self.input = history[idx + 1].clone();
                } else {
                    self.history_index = None;
                    self.input.clear();
                }
                KeyAction::Redraw
            }
            _ => KeyAction::Ignore,
        }
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for TerminalInput {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if !io::stdin().is_terminal() {
            return LineInput::new(io::stdin().lock()).next_line(prompt);
        }

        enable_raw_mode()?;
        let line = self.read_raw(prompt);
        disable_raw_mode()?;
        println!();

        let line = line?;
        if let Some(text) = &line {
            if !text.is_empty() && self.history.last() != Some(text) {
                self.history.push(text.clone());
            }
        }
        Ok(line)
    }
}

/// What the banner reports about the session
#[derive(Debug, Clone)]
pub struct BannerInfo {
    pub reviews: usize,
    pub chat_model: String,
    pub embed_model: String,
    pub session: Option<String>,
}

/// Display the startup banner
pub fn display_banner(info: &BannerInfo) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(60, terminal_width.saturating_sub(4)).max(20);
    let border = "─".repeat(banner_width);

    println!();
    println!("{}", border.blue());
    println!("  {}", "Naruto Review Chat".blue().bold());
    println!("  📚 {} reviews indexed", info.reviews);
    println!("  🤖 {} (embeddings: {})", info.chat_model, info.embed_model);
    match &info.session {
        Some(session) => println!("  💾 history on, session '{}'", session),
        None => println!("  💾 history off"),
    }
    println!("{}", border.blue());
    println!(
        "{}",
        "💡 Ask anything about the reviews, or 'q' to quit".dimmed()
    );
}
