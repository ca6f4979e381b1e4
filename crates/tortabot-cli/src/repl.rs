//! Line-editor loop that feeds each entry to the conversation service.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tortabot_application::ConversationService;
use tortabot_core::conversation::{BotResponse, Channel};
use tortabot_core::order::order_summary;

const COMMANDS: [&str; 3] = ["/reset", "/draft", "/quit"];

/// Completes and highlights the slash commands.
struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

enum Command {
    Reset,
    Draft,
    Quit,
    Unknown,
}

fn parse_command(input: &str) -> Option<Command> {
    if !input.starts_with('/') {
        return (input == "quit" || input == "exit").then_some(Command::Quit);
    }
    Some(match input {
        "/reset" => Command::Reset,
        "/draft" => Command::Draft,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown,
    })
}

/// Runs the REPL until `/quit`, Ctrl-D or a terminal error.
pub async fn run(service: &ConversationService, conversation_id: &str) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    let business = &service.engine().settings().business_name;
    println!("{}", format!("=== {business} ===").bright_magenta().bold());
    println!(
        "{}",
        "Escribe como cliente. /draft muestra el pedido, /reset lo reinicia, /quit sale."
            .bright_black()
    );
    println!();

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(input);

        match parse_command(input) {
            Some(Command::Quit) => break,
            Some(Command::Reset) => {
                service.reset(conversation_id).await?;
                println!("{}", "Pedido reiniciado.".bright_green());
            }
            Some(Command::Draft) => print_draft(service, conversation_id).await?,
            Some(Command::Unknown) => println!("{}", "Unknown command".bright_black()),
            None => match service
                .handle_message(conversation_id, Channel::Web, input)
                .await
            {
                Ok(response) => print_response(&response),
                Err(e) => eprintln!("{}", format!("Error: {e}").red()),
            },
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

fn print_response(response: &BotResponse) {
    for line in response.reply.lines() {
        println!("{}", line.bright_blue());
    }
    for media in &response.media {
        println!("{}", format!("[imagen] {} ({})", media.caption, media.url).bright_black());
    }
    if response.needs_human {
        println!("{}", "(derivado a una persona del equipo)".yellow());
    }
    println!();
}

async fn print_draft(service: &ConversationService, conversation_id: &str) -> Result<()> {
    let draft = service
        .conversation(conversation_id)
        .await?
        .map(|record| record.metadata.order_draft)
        .unwrap_or_default();
    if draft.is_empty() {
        println!("{}", "(sin pedido en curso)".bright_black());
    } else {
        println!("{}", order_summary(&draft).yellow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert!(matches!(parse_command("/reset"), Some(Command::Reset)));
        assert!(matches!(parse_command("/draft"), Some(Command::Draft)));
        assert!(matches!(parse_command("quit"), Some(Command::Quit)));
        assert!(matches!(parse_command("/nope"), Some(Command::Unknown)));
        assert!(parse_command("quiero una torta").is_none());
    }
}
