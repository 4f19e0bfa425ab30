//! Parsing of the line-oriented commands typed at the reader prompt.

use anyhow::{Context, Result, anyhow, bail};
use guide_core::SessionCommand;

/// One parsed prompt line.
#[derive(Debug, Clone)]
pub enum Input {
    Session(SessionCommand),
    /// Mark the logical line as the current position.
    Mark,
    AddBookmark { title: String },
    Rename { id: String, title: String },
    Note { id: String, note: String },
    Move { id: String, line: usize },
    Remove { id: String },
    List,
    View,
    Json,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  goto <line>          jump to a line
  pgdn | pgup          move one screen
  scroll <offset>      report a raw scroll offset in pixels
  resize <height>      change the viewport height in pixels
  tap <line>           tap a line; two quick taps mark the current position
  find <text>          search the first lines of the guide
  next | prev          cycle through search results
  mark                 mark the current line as the current position
  add <title>          bookmark the current line
  rename <id> <title>  retitle a bookmark
  note <id> [text]     set or clear a bookmark note
  move <id> <line>     move a bookmark
  rm <id>              delete a bookmark
  list                 show bookmarks
  jump <id>            go to a bookmark
  view | json          show the viewport
  help | quit";

pub fn parse(line: &str) -> Result<Input> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    let input = match verb {
        "" | "view" => Input::View,
        "json" => Input::Json,
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        "goto" | "g" => Input::Session(SessionCommand::GotoLine {
            line: parse_number(rest, "goto <line>")?,
        }),
        "pgdn" | "n" => Input::Session(SessionCommand::PageDown),
        "pgup" | "p" => Input::Session(SessionCommand::PageUp),
        "scroll" => Input::Session(SessionCommand::Scrolled {
            offset: parse_float(rest, "scroll <offset>")?,
        }),
        "resize" => Input::Session(SessionCommand::Resized {
            viewport_height: parse_float(rest, "resize <height>")?,
        }),
        "tap" => Input::Session(SessionCommand::Tap {
            line: parse_number(rest, "tap <line>")?,
        }),
        "find" | "/" => Input::Session(SessionCommand::SearchSetQuery {
            query: rest.to_string(),
        }),
        "next" => Input::Session(SessionCommand::SearchNext),
        "prev" => Input::Session(SessionCommand::SearchPrev),
        "jump" => Input::Session(SessionCommand::GotoBookmark {
            id: required(rest, "jump <id>")?.to_string(),
        }),
        "mark" => Input::Mark,
        "add" => Input::AddBookmark {
            title: rest.to_string(),
        },
        "rename" => {
            let (id, title) = split_id(rest, "rename <id> <title>")?;
            Input::Rename {
                id,
                title: title.to_string(),
            }
        }
        "note" => {
            let id = rest.split_whitespace().next().unwrap_or_default();
            let note = rest[id.len()..].trim();
            Input::Note {
                id: required(id, "note <id> [text]")?.to_string(),
                note: note.to_string(),
            }
        }
        "move" => {
            let (id, line) = split_id(rest, "move <id> <line>")?;
            Input::Move {
                id,
                line: parse_number(line, "move <id> <line>")?,
            }
        }
        "rm" | "delete" => Input::Remove {
            id: required(rest, "rm <id>")?.to_string(),
        },
        "list" | "ls" => Input::List,
        other => bail!("unknown command `{other}`; type `help`"),
    };
    Ok(input)
}

fn required<'a>(value: &'a str, usage: &str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(anyhow!("usage: {usage}"));
    }
    Ok(value)
}

fn split_id<'a>(rest: &'a str, usage: &str) -> Result<(String, &'a str)> {
    let (id, tail) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("usage: {usage}"))?;
    Ok((id.to_string(), tail.trim()))
}

fn parse_number(value: &str, usage: &str) -> Result<usize> {
    required(value, usage)?
        .parse()
        .with_context(|| format!("usage: {usage}"))
}

fn parse_float(value: &str, usage: &str) -> Result<f32> {
    required(value, usage)?
        .parse()
        .with_context(|| format!("usage: {usage}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation() {
        assert!(matches!(
            parse("goto 120").unwrap(),
            Input::Session(SessionCommand::GotoLine { line: 120 })
        ));
        assert!(matches!(
            parse("  pgdn ").unwrap(),
            Input::Session(SessionCommand::PageDown)
        ));
        assert!(matches!(
            parse("scroll 2000.5").unwrap(),
            Input::Session(SessionCommand::Scrolled { offset }) if offset == 2000.5
        ));
    }

    #[test]
    fn keeps_spaces_in_free_text() {
        match parse("find  Gold Saucer ").unwrap() {
            Input::Session(SessionCommand::SearchSetQuery { query }) => {
                assert_eq!(query, "Gold Saucer")
            }
            other => panic!("unexpected {other:?}"),
        }
        match parse("rename abc Before the boss").unwrap() {
            Input::Rename { id, title } => {
                assert_eq!(id, "abc");
                assert_eq!(title, "Before the boss");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn note_without_text_clears() {
        match parse("note abc").unwrap() {
            Input::Note { id, note } => {
                assert_eq!(id, "abc");
                assert!(note.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse("goto").is_err());
        assert!(parse("goto ten").is_err());
        assert!(parse("move abc").is_err());
        assert!(parse("rm").is_err());
        assert!(parse("dance").is_err());
    }

    #[test]
    fn blank_line_redraws() {
        assert!(matches!(parse("").unwrap(), Input::View));
    }
}
