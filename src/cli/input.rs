use crate::event_loop::{Command, EngineMessage};
use crate::timeline::SegmentDescriptor;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("`{0}` is not a number")]
    NotANumber(String),
}

const ADD_USAGE: &str = "add <amount> <single> <chord> [scale|quick]";

/// Maps one line of user input onto an engine message. Blank lines map to `None`.
pub fn parse_command(line: &str) -> Result<Option<EngineMessage>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("add", [amount, single, chord]) => {
            Command::Add(SegmentDescriptor::new(*amount, *single, *chord, Default::default()))
        }
        ("add", [amount, single, chord, kind]) => {
            let kind = kind
                .parse()
                .map_err(|_| CommandError::Usage(ADD_USAGE))?;
            Command::Add(SegmentDescriptor::new(*amount, *single, *chord, kind))
        }
        ("add", _) => return Err(CommandError::Usage(ADD_USAGE)),
        ("remove" | "rm", [position]) => Command::Remove(parse_number(position)?),
        ("remove" | "rm", _) => return Err(CommandError::Usage("remove <position>")),
        ("bpm" | "tempo", [bpm]) => Command::Tempo(parse_number(bpm)?),
        ("bpm" | "tempo", _) => return Err(CommandError::Usage("bpm <value>")),
        ("play" | "start", []) => Command::Start,
        ("stop", []) => Command::Stop,
        ("toggle" | "t", []) => Command::Toggle,
        ("list" | "ls", []) => Command::List,
        ("import", [path]) => Command::Import(PathBuf::from(path)),
        ("import", _) => return Err(CommandError::Usage("import <file>")),
        ("export", []) => Command::Export(None),
        ("export", [path]) => Command::Export(Some(PathBuf::from(path))),
        ("quit" | "exit" | "q", []) => return Ok(Some(EngineMessage::Shutdown)),
        _ => return Err(CommandError::Unknown(line.trim().to_string())),
    };
    Ok(Some(EngineMessage::Command(command)))
}

fn parse_number<T: std::str::FromStr>(word: &str) -> Result<T, CommandError> {
    word.parse()
        .map_err(|_| CommandError::NotANumber(word.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loops::PatternKind;

    #[test]
    fn test_add_defaults_to_scale() {
        match parse_command("add 4 4 CM7") {
            Ok(Some(EngineMessage::Command(Command::Add(descriptor)))) => {
                assert_eq!(descriptor.repeat_count, "4");
                assert_eq!(descriptor.subdivision, "4");
                assert_eq!(descriptor.chord, "CM7");
                assert_eq!(descriptor.pattern, PatternKind::Scale);
            }
            other => panic!("Expected Add command, got {:?}", other),
        }
    }

    #[test]
    fn test_add_with_pattern() {
        match parse_command("add 2 8 Em7 quick") {
            Ok(Some(EngineMessage::Command(Command::Add(descriptor)))) => {
                assert_eq!(descriptor.pattern, PatternKind::Quick);
            }
            other => panic!("Expected Add command, got {:?}", other),
        }
        assert_eq!(
            parse_command("add 2 8 Em7 swing").unwrap_err(),
            CommandError::Usage(ADD_USAGE)
        );
    }

    #[test]
    fn test_transport_words() {
        assert!(matches!(
            parse_command("play"),
            Ok(Some(EngineMessage::Command(Command::Start)))
        ));
        assert!(matches!(
            parse_command("  stop "),
            Ok(Some(EngineMessage::Command(Command::Stop)))
        ));
        assert!(matches!(parse_command("quit"), Ok(Some(EngineMessage::Shutdown))));
    }

    #[test]
    fn test_numbers() {
        assert!(matches!(
            parse_command("bpm -5"),
            Ok(Some(EngineMessage::Command(Command::Tempo(-5))))
        ));
        assert!(matches!(
            parse_command("remove 2"),
            Ok(Some(EngineMessage::Command(Command::Remove(2))))
        ));
        assert_eq!(
            parse_command("remove two").unwrap_err(),
            CommandError::NotANumber("two".to_string())
        );
    }

    #[test]
    fn test_blank_and_unknown() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }
}
