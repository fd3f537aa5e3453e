//! Interactive chat loop.
//!
//! Plain lines are answered from the document collection. Lines starting
//! with `:` drive keyword memory directly.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

use crate::app::App;

const PROMPT: &str = "Me > ";

const HELP: &str = "\
Commands:
  :save <collection> <key> <text>   remember text under a key
  :get <collection> <key>           recall a saved entry
  :find <collection> <text>         search saved entries
  :code <text>                      search indexed code
  :help                             show this help
  exit                              leave
Anything else is answered from the ingested documents.";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    Ask(&'a str),
    Save { collection: &'a str, key: &'a str, text: &'a str },
    Get { collection: &'a str, key: &'a str },
    Find { collection: &'a str, query: &'a str },
    Code(&'a str),
    Help,
    Exit,
    Empty,
    Invalid(&'static str),
}

/// Split off the first whitespace-delimited word.
fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(at) => Some((&s[..at], s[at..].trim_start())),
        None => Some((s, "")),
    }
}

/// Parse a line typed at the prompt.
pub fn parse_line(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if line.eq_ignore_ascii_case("exit") {
        return Input::Exit;
    }
    let Some(command) = line.strip_prefix(':') else {
        return Input::Ask(line);
    };

    let Some((name, rest)) = next_word(command) else {
        return Input::Invalid("empty command; try :help");
    };
    match name {
        "save" => match next_word(rest).and_then(|(c, r)| Some((c, next_word(r)?))) {
            Some((collection, (key, text))) if !text.is_empty() => {
                Input::Save { collection, key, text }
            }
            _ => Input::Invalid("usage: :save <collection> <key> <text>"),
        },
        "get" => match next_word(rest) {
            Some((collection, key)) if !key.is_empty() => Input::Get { collection, key },
            _ => Input::Invalid("usage: :get <collection> <key>"),
        },
        "find" => match next_word(rest) {
            Some((collection, query)) if !query.is_empty() => Input::Find { collection, query },
            _ => Input::Invalid("usage: :find <collection> <text>"),
        },
        "code" if !rest.is_empty() => Input::Code(rest),
        "code" => Input::Invalid("usage: :code <text>"),
        "help" => Input::Help,
        _ => Input::Invalid("unknown command; try :help"),
    }
}

/// Read lines until `exit`, Ctrl-C or end of input.
pub async fn run(app: &App, collection: &str) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("Ask about '{collection}', or type :help. `exit` to leave.");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let _ = editor.add_history_entry(line.as_str());

        match parse_line(&line) {
            Input::Empty => {}
            Input::Exit => break,
            Input::Help => println!("{HELP}"),
            Input::Invalid(message) => println!("{message}"),
            Input::Ask(query) => match app.pipeline.retrieve(collection, query, None).await {
                Ok(answer) => println!("{answer}"),
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "retrieval failed");
                    println!("Error: {e}");
                }
            },
            Input::Save { collection, key, text } => {
                println!("{}", app.memory.save(collection, key, text).await);
            }
            Input::Get { collection, key } => {
                let lookup = app.memory.retrieve(collection, key).await;
                println!("{lookup}");
            }
            Input::Find { collection, query } => {
                println!("{}", app.memory.search(collection, query).await);
            }
            Input::Code(query) => {
                println!("{}", app.memory.search(&app.settings.code_collection, query).await);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(parse_line("  where do they meet? "), Input::Ask("where do they meet?"));
        assert_eq!(parse_line("   "), Input::Empty);
        assert_eq!(parse_line("EXIT"), Input::Exit);
    }

    #[test]
    fn save_keeps_the_rest_of_the_line_as_text() {
        assert_eq!(
            parse_line(":save notes meeting  Paris, in   the rain"),
            Input::Save { collection: "notes", key: "meeting", text: "Paris, in   the rain" }
        );
        assert!(matches!(parse_line(":save notes meeting"), Input::Invalid(_)));
    }

    #[test]
    fn lookup_commands() {
        assert_eq!(
            parse_line(":get notes meeting"),
            Input::Get { collection: "notes", key: "meeting" }
        );
        assert_eq!(
            parse_line(":find codebase fn main"),
            Input::Find { collection: "codebase", query: "fn main" }
        );
        assert_eq!(parse_line(":code impl Drop"), Input::Code("impl Drop"));
        assert_eq!(parse_line(":help"), Input::Help);
    }

    #[test]
    fn malformed_commands_are_reported() {
        assert!(matches!(parse_line(":"), Input::Invalid(_)));
        assert!(matches!(parse_line(":get notes"), Input::Invalid(_)));
        assert!(matches!(parse_line(":code"), Input::Invalid(_)));
        assert!(matches!(parse_line(":frobnicate x"), Input::Invalid(_)));
    }
}
