//! Terminal command parsing into session intents.

use crate::session::Intent;
use shared::BOARD_COLS;

pub const HELP: &str = "\
commands:
  login <name>   connect with a display name
  join           join the matchmaking queue
  drop <column>  drop a disc (columns 0-6)
  resume         pick a held game back up
  abandon        give up a held game
  again          queue for a rematch
  leave          leave the game and log out
  board          print the current board
  help           this text
  quit           exit";

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { name: String },
    Intent(Intent),
    ShowBoard,
    Help,
    Quit,
}

/// Parses a command line. Errors are short usage strings meant for stdout.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let keyword = match parts.next() {
        Some(word) => word,
        None => return Err("empty command, try 'help'".to_string()),
    };

    let command = match keyword {
        "login" => {
            let name = match parts.next() {
                Some(name) => name.to_string(),
                None => return Err("usage: login <name>".to_string()),
            };
            Command::Login { name }
        }
        "join" => Command::Intent(Intent::JoinQueue),
        "drop" => {
            let column = parts
                .next()
                .and_then(|raw| raw.parse::<usize>().ok())
                .filter(|column| *column < BOARD_COLS);
            match column {
                Some(column) => Command::Intent(Intent::MakeMove { column }),
                None => return Err(format!("usage: drop <column 0-{}>", BOARD_COLS - 1)),
            }
        }
        "resume" => Command::Intent(Intent::Resume),
        "abandon" => Command::Intent(Intent::Abandon),
        "again" => Command::Intent(Intent::PlayAgain),
        "leave" => Command::Intent(Intent::Leave),
        "board" => Command::ShowBoard,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };

    if parts.next().is_some() {
        return Err(format!("too many arguments for '{}'", keyword));
    }
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("join"), Ok(Command::Intent(Intent::JoinQueue)));
        assert_eq!(parse_command("resume"), Ok(Command::Intent(Intent::Resume)));
        assert_eq!(parse_command("abandon"), Ok(Command::Intent(Intent::Abandon)));
        assert_eq!(parse_command("again"), Ok(Command::Intent(Intent::PlayAgain)));
        assert_eq!(parse_command("leave"), Ok(Command::Intent(Intent::Leave)));
        assert_eq!(parse_command("board"), Ok(Command::ShowBoard));
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_login() {
        assert_eq!(
            parse_command("login alice"),
            Ok(Command::Login {
                name: "alice".to_string()
            })
        );
        assert!(parse_command("login").is_err());
    }

    #[test]
    fn test_parse_drop_column() {
        assert_eq!(
            parse_command("drop 3"),
            Ok(Command::Intent(Intent::MakeMove { column: 3 }))
        );
        assert_eq!(
            parse_command("drop 0"),
            Ok(Command::Intent(Intent::MakeMove { column: 0 }))
        );
        assert_eq!(
            parse_command("drop 6"),
            Ok(Command::Intent(Intent::MakeMove { column: 6 }))
        );
    }

    #[test]
    fn test_drop_rejects_bad_columns() {
        assert!(parse_command("drop").is_err());
        assert!(parse_command("drop seven").is_err());
        assert!(parse_command("drop 7").is_err());
        assert!(parse_command("drop -1").is_err());
    }

    #[test]
    fn test_unknown_command_errors() {
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_empty_line_errors() {
        assert!(parse_command("").is_err());
        assert!(parse_command("   ").is_err());
    }

    #[test]
    fn test_trailing_arguments_rejected() {
        assert!(parse_command("join now").is_err());
        assert!(parse_command("login alice smith").is_err());
    }

    #[test]
    fn test_whitespace_is_tolerated() {
        assert_eq!(
            parse_command("  drop   5  "),
            Ok(Command::Intent(Intent::MakeMove { column: 5 }))
        );
    }
}
