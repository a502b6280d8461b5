use thiserror::Error;

use crate::common::{Command, ErrorReply, Request, COMMAND_MAX, KEY_MAX, VALUE_MAX};

/// Why a request line could not be turned into a [`Request`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// No command token at all.
    #[error("malformed request")]
    Empty,

    /// The command token is not `SET`, `GET` or `DEL`.
    #[error("invalid command")]
    UnknownCommand,

    /// `GET` or `DEL` without a key token.
    #[error("missing key")]
    MissingKey,

    /// `SET` without a value.
    #[error("missing value")]
    MissingValue,
}

impl From<ParseError> for ErrorReply {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Empty => ErrorReply::Malformed,
            ParseError::UnknownCommand => ErrorReply::InvalidCommand,
            ParseError::MissingKey => ErrorReply::MissingKey,
            ParseError::MissingValue => ErrorReply::MissingValue,
        }
    }
}

/// Returns `true` if `key` may be used as a file name.
///
/// Rejects the empty key and any key containing `/`, `\`, `.` or a space.
/// Dotted names are refused outright rather than canonicalized.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['/', '\\', '.', ' '])
}

/// Parses one raw request.
///
/// The line is scanned as `<command> <key> <rest of line>`, each field
/// bounded by its ceiling. The key is not validated here.
pub fn parse(raw: &[u8]) -> Result<Request, ParseError> {
    let mut scanner = Scanner::new(raw);

    let command = scanner.token(COMMAND_MAX).ok_or(ParseError::Empty)?;
    let command = Command::from_token(command);
    if command == Command::Invalid {
        return Err(ParseError::UnknownCommand);
    }

    let key = scanner.token(KEY_MAX);
    let value = match key {
        Some(_) => scanner.rest_of_line(VALUE_MAX),
        None => None,
    };

    match (command, key, value) {
        (Command::Get | Command::Del, None, _) => Err(ParseError::MissingKey),
        (Command::Set, _, None) => Err(ParseError::MissingValue),
        (_, key, value) => Ok(Request {
            command,
            key: key.unwrap_or_default().to_vec(),
            value: value.map(<[u8]>::to_vec).unwrap_or_default(),
        }),
    }
}

/// Width-limited field scanner.
///
/// A token longer than its ceiling is cut at the ceiling, and scanning of the
/// next field resumes right after the cut. Input ends at the first NUL byte.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(raw: &'a [u8]) -> Self {
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Scanner {
            input: &raw[..end],
            pos: 0,
        }
    }

    fn skip_space(&mut self) {
        while self.pos < self.input.len() && is_space(self.input[self.pos]) {
            self.pos += 1;
        }
    }

    /// Reads up to `max` non-whitespace bytes.
    fn token(&mut self, max: usize) -> Option<&'a [u8]> {
        self.skip_space();
        self.take_while(max, |b| !is_space(b))
    }

    /// Reads up to `max` bytes, stopping before a newline.
    fn rest_of_line(&mut self, max: usize) -> Option<&'a [u8]> {
        self.skip_space();
        self.take_while(max, |b| b != b'\n')
    }

    fn take_while(&mut self, max: usize, pred: impl Fn(u8) -> bool) -> Option<&'a [u8]> {
        let start = self.pos;
        while self.pos < self.input.len() && self.pos - start < max && pred(self.input[self.pos]) {
            self.pos += 1;
        }
        let (input, end) = (self.input, self.pos);
        (end > start).then(|| &input[start..end])
    }
}

/// Whitespace as C's `isspace` defines it in the "C" locale.
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}
