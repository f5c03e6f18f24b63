//! Module `commands`
//!
//! Parses one control line into a command verb, an optional argument and the
//! separator count used for arity checks.

/// Represents an FTP command verb understood by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    USER,
    QUIT,
    CWD,
    CDUP,
    TYPE,
    MODE,
    STRU,
    PASV,
    RETR,
    NLST,
    UNKNOWN(String),
}

impl Command {
    fn from_verb(verb: &str) -> Self {
        match verb.to_ascii_uppercase().as_str() {
            "USER" => Command::USER,
            "QUIT" => Command::QUIT,
            "CWD" => Command::CWD,
            "CDUP" => Command::CDUP,
            "TYPE" => Command::TYPE,
            "MODE" => Command::MODE,
            "STRU" => Command::STRU,
            "PASV" => Command::PASV,
            "RETR" => Command::RETR,
            "NLST" => Command::NLST,
            _ => Command::UNKNOWN(verb.to_string()),
        }
    }

    /// Number of space characters a well-formed line for this verb contains.
    pub fn expected_separators(&self) -> Option<usize> {
        match self {
            Command::USER
            | Command::CWD
            | Command::TYPE
            | Command::MODE
            | Command::STRU
            | Command::RETR => Some(1),
            Command::QUIT | Command::CDUP | Command::PASV | Command::NLST => Some(0),
            Command::UNKNOWN(_) => None,
        }
    }
}

/// A parsed control line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub command: Command,
    pub argument: Option<String>,
    /// Count of `' '` characters in the line, extra and trailing ones included.
    pub separators: usize,
}

impl CommandLine {
    /// Parses a line whose CR/LF terminator has already been removed.
    pub fn parse(line: &str) -> Self {
        let separators = line.matches(' ').count();
        let mut tokens = line.split(' ').filter(|token| !token.is_empty());
        let command = Command::from_verb(tokens.next().unwrap_or(""));
        let argument = tokens.next().map(str::to_string);

        Self {
            command,
            argument,
            separators,
        }
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }
}

/// What the session loop does after a command has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Continue,
    CloseConnection,
}

/// Truncates a received line at its first CR or LF.
pub fn strip_line_ending(raw: &str) -> &str {
    raw.split(['\r', '\n']).next().unwrap_or("")
}
