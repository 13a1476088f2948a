//! Structured command line parsing.
//!
//! Converts the raw command line into a `ParsedCommand`. Parsing is pure:
//! unknown input becomes `ParsedCommand::Unknown` carrying the text verbatim,
//! which the executor turns into "Not an editor command".

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoTarget {
    /// One-based line number; 0 is treated as 1.
    Number(usize),
    /// `$`
    Last,
    /// `+N` / `-N`
    Relative(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// `:w`; `!` is accepted and changes nothing.
    Write,
    Quit { force: bool },
    /// `:wq`, with or without `!`.
    WriteQuit,
    /// `:x` / `ZZ`: save only when modified, then quit.
    WriteIfModifiedQuit,
    Goto(GotoTarget),
    /// Empty command line.
    Nop,
    Unknown(String),
}

impl ParsedCommand {
    /// The same command with `!` added.
    pub fn forced(self) -> Self {
        match self {
            Self::Quit { .. } => Self::Quit { force: true },
            other => other,
        }
    }
}

pub struct CommandParser;

impl CommandParser {
    pub fn parse(raw: &str) -> ParsedCommand {
        let s = raw.trim();
        let body = s.strip_prefix(':').unwrap_or(s).trim();
        match body {
            "" => return ParsedCommand::Nop,
            "w" | "write" | "w!" | "write!" => return ParsedCommand::Write,
            "q" | "quit" => return ParsedCommand::Quit { force: false },
            "q!" | "quit!" => return ParsedCommand::Quit { force: true },
            "wq" | "wq!" => return ParsedCommand::WriteQuit,
            "x" | "xit" | "x!" | "xit!" => return ParsedCommand::WriteIfModifiedQuit,
            "$" => return ParsedCommand::Goto(GotoTarget::Last),
            _ => {}
        }
        if body.bytes().all(|b| b.is_ascii_digit()) {
            return match body.parse::<usize>() {
                Ok(n) => ParsedCommand::Goto(GotoTarget::Number(n)),
                // more digits than usize holds: past any real last line
                Err(_) => ParsedCommand::Goto(GotoTarget::Last),
            };
        }
        if let Some(sign) = body.chars().next().filter(|c| *c == '+' || *c == '-') {
            let digits = &body[1..];
            let amount = if digits.is_empty() {
                Some(1)
            } else if digits.bytes().all(|b| b.is_ascii_digit()) {
                Some(digits.parse::<i64>().unwrap_or(i64::MAX))
            } else {
                None
            };
            if let Some(amount) = amount {
                let delta = if sign == '-' { -amount } else { amount };
                return ParsedCommand::Goto(GotoTarget::Relative(delta));
            }
        }
        ParsedCommand::Unknown(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_write_and_quit_forms() {
        assert_eq!(CommandParser::parse(":w"), ParsedCommand::Write);
        assert_eq!(CommandParser::parse("write"), ParsedCommand::Write);
        assert_eq!(CommandParser::parse("w!"), ParsedCommand::Write);
        assert_eq!(CommandParser::parse(":q"), ParsedCommand::Quit { force: false });
        assert_eq!(CommandParser::parse(" :q! "), ParsedCommand::Quit { force: true });
        assert_eq!(CommandParser::parse(":wq"), ParsedCommand::WriteQuit);
        assert_eq!(CommandParser::parse("wq!"), ParsedCommand::WriteQuit);
        assert_eq!(CommandParser::parse(":x"), ParsedCommand::WriteIfModifiedQuit);
    }

    #[test]
    fn parse_line_jumps() {
        assert_eq!(CommandParser::parse(":12"), ParsedCommand::Goto(GotoTarget::Number(12)));
        assert_eq!(CommandParser::parse(":0"), ParsedCommand::Goto(GotoTarget::Number(0)));
        assert_eq!(CommandParser::parse(":$"), ParsedCommand::Goto(GotoTarget::Last));
        assert_eq!(CommandParser::parse(":+3"), ParsedCommand::Goto(GotoTarget::Relative(3)));
        assert_eq!(CommandParser::parse(":-"), ParsedCommand::Goto(GotoTarget::Relative(-1)));
    }

    #[test]
    fn parse_empty_and_unknown() {
        assert_eq!(CommandParser::parse(":"), ParsedCommand::Nop);
        assert_eq!(CommandParser::parse("  "), ParsedCommand::Nop);
        match CommandParser::parse(":foo bar") {
            ParsedCommand::Unknown(text) => assert_eq!(text, "foo bar"),
            other => panic!("expected Unknown, got {:?}", other),
        }
        assert_eq!(
            CommandParser::parse(":+x"),
            ParsedCommand::Unknown("+x".into())
        );
    }

    #[test]
    fn forcing_adds_bang() {
        assert_eq!(
            ParsedCommand::Quit { force: false }.forced(),
            ParsedCommand::Quit { force: true }
        );
        assert_eq!(ParsedCommand::Nop.forced(), ParsedCommand::Nop);
    }
}
