use leads_core::{parse_keywords, RawFilters};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  run [keywords=a,b] [size=1-10|11-50|51-200|201-500|500+] [instagram] [linkedin] [phone] [limit=N]
              keywords are comma separated; blank tags are ignored
  stop        stop the current run, keeping its log
  reset       clear the run (only when not running)
  download    save the CSV once it is ready
  dismiss     clear the error panel
  help        show this text
  quit        exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Run(RawFilters),
    Stop,
    Reset,
    Download,
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command {0:?}; type 'help'")]
    UnknownCommand(String),
    #[error("unknown run option {0:?}; type 'help'")]
    UnknownOption(String),
    #[error("{0} takes no arguments")]
    UnexpectedArguments(&'static str),
}

/// Parse one line of terminal input. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<UserCommand>, InputError> {
    let mut tokens = line.split_whitespace();
    let Some(head) = tokens.next() else {
        return Ok(None);
    };
    let head = head.to_ascii_lowercase();
    let rest: Vec<&str> = tokens.collect();

    let command = match head.as_str() {
        "run" | "start" => return parse_run(&rest).map(|raw| Some(UserCommand::Run(raw))),
        "stop" => UserCommand::Stop,
        "reset" => UserCommand::Reset,
        "download" => UserCommand::Download,
        "dismiss" | "retry" => UserCommand::Dismiss,
        "help" | "?" => UserCommand::Help,
        "quit" | "exit" => UserCommand::Quit,
        _ => return Err(InputError::UnknownCommand(head)),
    };
    if !rest.is_empty() {
        return Err(InputError::UnexpectedArguments(command_name(&command)));
    }
    Ok(Some(command))
}

fn parse_run(options: &[&str]) -> Result<RawFilters, InputError> {
    let mut raw = RawFilters::default();
    for option in options {
        match option.split_once('=') {
            Some(("keywords", value)) => raw.keywords.extend(parse_keywords(value)),
            Some(("size", value)) => raw.size = Some(value.to_string()),
            Some(("limit", value)) => raw.limit = Some(value.to_string()),
            None if *option == "instagram" => raw.has_instagram = true,
            None if *option == "linkedin" => raw.has_linkedin = true,
            None if *option == "phone" => raw.has_phone = true,
            _ => return Err(InputError::UnknownOption(option.to_string())),
        }
    }
    Ok(raw)
}

fn command_name(command: &UserCommand) -> &'static str {
    match command {
        UserCommand::Run(_) => "run",
        UserCommand::Stop => "stop",
        UserCommand::Reset => "reset",
        UserCommand::Download => "download",
        UserCommand::Dismiss => "dismiss",
        UserCommand::Help => "help",
        UserCommand::Quit => "quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_collects_every_option() {
        let command = parse_command("run keywords=tech,saas size=11-50 phone limit=50").unwrap();
        assert_eq!(
            command,
            Some(UserCommand::Run(RawFilters {
                keywords: vec!["tech".to_string(), "saas".to_string()],
                size: Some("11-50".to_string()),
                has_phone: true,
                limit: Some("50".to_string()),
                ..RawFilters::default()
            }))
        );
    }

    #[test]
    fn bare_run_uses_defaults() {
        assert_eq!(
            parse_command("  START ").unwrap(),
            Some(UserCommand::Run(RawFilters::default()))
        );
    }

    #[test]
    fn blank_keyword_tags_are_dropped() {
        assert_eq!(
            parse_command("run keywords=,tech,, keywords=").unwrap(),
            Some(UserCommand::Run(RawFilters {
                keywords: vec!["tech".to_string()],
                ..RawFilters::default()
            }))
        );
        assert!(HELP.contains("blank tags are ignored"));
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn unknown_input_is_reported() {
        assert_eq!(
            parse_command("launch"),
            Err(InputError::UnknownCommand("launch".to_string()))
        );
        assert_eq!(
            parse_command("run colour=red"),
            Err(InputError::UnknownOption("colour=red".to_string()))
        );
        assert_eq!(
            parse_command("stop now"),
            Err(InputError::UnexpectedArguments("stop"))
        );
    }
}
