//! Special commands parser for the interactive prompts
//!
//! Special commands are available in chat and in the step flows. They
//! control the session rather than being sent to the backend:
//! - Show the chat transcript or the current state
//! - List records without leaving the conversation
//! - Go back to the menu, or exit
//!
//! Commands are prefixed with `/` and are case-insensitive. In chat and
//! the menu `exit` and `quit` also work without the prefix. Step flows use
//! `parse_prefixed_command`, so a bare word is always a field answer.

use thiserror::Error;

use crate::flow::EntityType;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed at an interactive prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Print the chat transcript so far
    ShowHistory,

    /// Show the flow stage or pending confirmation
    ShowStatus,

    /// Display help information
    Help,

    /// Show every record of a kind
    List(EntityType),

    /// Leave the current flow or chat and return to the menu
    Back,

    /// Exit the program
    Exit,

    /// Not a special command
    ///
    /// The input should be handled as a chat message or field answer.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is
/// not a valid command, `MissingArgument` for `/list` without a kind and
/// `UnsupportedArgument` for an unknown kind.
///
/// # Examples
///
/// ```
/// use household_assistant::commands::special_commands::{parse_special_command, SpecialCommand};
/// use household_assistant::flow::EntityType;
///
/// assert_eq!(parse_special_command("/back").unwrap(), SpecialCommand::Back);
/// assert_eq!(
///     parse_special_command("/list meals").unwrap(),
///     SpecialCommand::List(EntityType::Meal)
/// );
/// assert_eq!(parse_special_command("Dishes").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/history" => Ok(SpecialCommand::ShowHistory),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/back" | "/menu" | "/cancel" => Ok(SpecialCommand::Back),

        "/list" => Err(CommandError::MissingArgument {
            command: "/list".to_string(),
            usage: "/list <chores|meals|recipes|members>".to_string(),
        }),
        input if input.starts_with("/list ") => {
            let arg = input[6..].trim();
            EntityType::parse_str(arg)
                .map(SpecialCommand::List)
                .map_err(|_| CommandError::UnsupportedArgument {
                    command: "/list".to_string(),
                    arg: arg.to_string(),
                })
        }

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        input if input.starts_with('/') => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }

        _ => Ok(SpecialCommand::None),
    }
}

/// Parse only `/`-prefixed special commands
///
/// Anything without the prefix, including `exit` and `quit`, is
/// `SpecialCommand::None` and goes to the caller as plain input.
///
/// # Examples
///
/// ```
/// use household_assistant::commands::special_commands::{parse_prefixed_command, SpecialCommand};
///
/// assert_eq!(parse_prefixed_command("quit").unwrap(), SpecialCommand::None);
/// assert_eq!(parse_prefixed_command("/quit").unwrap(), SpecialCommand::Exit);
/// ```
pub fn parse_prefixed_command(input: &str) -> Result<SpecialCommand, CommandError> {
    if input.trim().starts_with('/') {
        parse_special_command(input)
    } else {
        Ok(SpecialCommand::None)
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands
================

  /list <kind>    - Show chores, meals, recipes or members
  /status         - Show the current stage or pending confirmation
  /history        - Show the chat transcript (chat only)
  /back           - Return to the menu (also /menu, /cancel)
  /help           - Show this help message
  /exit, /quit    - Leave the assistant (bare exit/quit outside step flows)

While a step flow shows a summary:
  done            - Create the record
  edit            - Change values before creating

When the assistant asks to confirm a removal:
  yes             - Carry out the action
  no              - Cancel it
  Other commands are not available until you answer.
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regular_input_is_none() {
        assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
        assert_eq!(parse_special_command("yes").unwrap(), SpecialCommand::None);
        assert_eq!(parse_special_command("").unwrap(), SpecialCommand::None);
    }

    #[test]
    fn test_parse_exit_aliases() {
        for input in ["exit", "QUIT", "/exit", " /quit "] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Exit);
        }
    }

    #[test]
    fn test_prefixed_parse_leaves_bare_words_as_input() {
        for input in ["exit", "Quit", "Dishes", ""] {
            assert_eq!(parse_prefixed_command(input).unwrap(), SpecialCommand::None);
        }
    }

    #[test]
    fn test_prefixed_parse_recognizes_slash_commands() {
        assert_eq!(parse_prefixed_command(" /EXIT").unwrap(), SpecialCommand::Exit);
        assert_eq!(parse_prefixed_command("/back").unwrap(), SpecialCommand::Back);
        assert_eq!(
            parse_prefixed_command("/list meals").unwrap(),
            SpecialCommand::List(EntityType::Meal)
        );
        assert!(parse_prefixed_command("/nope").is_err());
    }

    #[test]
    fn test_parse_back_aliases() {
        for input in ["/back", "/menu", "/Cancel"] {
            assert_eq!(parse_special_command(input).unwrap(), SpecialCommand::Back);
        }
    }

    #[test]
    fn test_parse_info_commands() {
        assert_eq!(
            parse_special_command("/history").unwrap(),
            SpecialCommand::ShowHistory
        );
        assert_eq!(
            parse_special_command("/STATUS").unwrap(),
            SpecialCommand::ShowStatus
        );
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_parse_list_kinds() {
        assert_eq!(
            parse_special_command("/list chores").unwrap(),
            SpecialCommand::List(EntityType::Chore)
        );
        assert_eq!(
            parse_special_command("/list Members").unwrap(),
            SpecialCommand::List(EntityType::Member)
        );
    }

    #[test]
    fn test_parse_list_without_kind() {
        assert!(matches!(
            parse_special_command("/list"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_list_unknown_kind() {
        assert_eq!(
            parse_special_command("/list cars"),
            Err(CommandError::UnsupportedArgument {
                command: "/list".to_string(),
                arg: "cars".to_string()
            })
        );
    }

    #[test]
    fn test_parse_unknown_command_returns_error() {
        let err = parse_special_command("/delete 4").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/delete".to_string()));
        assert!(err.to_string().contains("/help"));
    }
}
