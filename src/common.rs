use std::fmt;

use crate::{KvError, Result};

/// Capacity of the per-connection request and response buffers.
pub const BUFFER_SIZE: usize = 1024;

/// Longest command token that is scanned; longer tokens are cut here.
pub const COMMAND_MAX: usize = 9;

/// Longest key token that is scanned; longer tokens are cut here.
pub const KEY_MAX: usize = 99;

/// Longest value that is scanned from a `SET` line.
pub const VALUE_MAX: usize = BUFFER_SIZE - 1;

/// Longest stored content returned by a `GET` reply.
///
/// Leaves room for the `OK\n` prefix and the trailing newline.
pub const VALUE_REPLY_MAX: usize = BUFFER_SIZE - 5;

/// Classification of the first token of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Not one of the known commands.
    Invalid,
    /// Store a value under a key.
    Set,
    /// Fetch the value stored under a key.
    Get,
    /// Remove a key.
    Del,
}

impl Command {
    /// Classifies a command token. Matching is exact and case-sensitive.
    pub fn from_token(token: &[u8]) -> Command {
        match token {
            b"SET" => Command::Set,
            b"GET" => Command::Get,
            b"DEL" => Command::Del,
            _ => Command::Invalid,
        }
    }
}

/// A parsed request, built fresh for every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The command to run.
    pub command: Command,
    /// The raw key token, at most [`KEY_MAX`] bytes. Not yet validated.
    pub key: Vec<u8>,
    /// The rest of the line after the key. Only used by `SET`.
    pub value: Vec<u8>,
}

/// Error replies the server can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReply {
    /// The key is empty, not UTF-8, or contains `/`, `\`, `.` or a space.
    InvalidKey,
    /// The storage backend refused the write.
    CouldNotCreate,
    /// The command token is not `SET`, `GET` or `DEL`.
    InvalidCommand,
    /// `GET` or `DEL` without a key.
    MissingKey,
    /// `SET` without a value.
    MissingValue,
    /// Nothing could be read from the request.
    Malformed,
}

impl ErrorReply {
    const ALL: [ErrorReply; 6] = [
        ErrorReply::InvalidKey,
        ErrorReply::CouldNotCreate,
        ErrorReply::InvalidCommand,
        ErrorReply::MissingKey,
        ErrorReply::MissingValue,
        ErrorReply::Malformed,
    ];

    /// The text sent after the `ERROR: ` prefix.
    pub fn message(self) -> &'static str {
        match self {
            ErrorReply::InvalidKey => "invalid key",
            ErrorReply::CouldNotCreate => "could not create",
            ErrorReply::InvalidCommand => "invalid command",
            ErrorReply::MissingKey => "missing key",
            ErrorReply::MissingValue => "missing value",
            ErrorReply::Malformed => "malformed request",
        }
    }

    fn from_message(message: &str) -> Option<ErrorReply> {
        Self::ALL.into_iter().find(|reply| reply.message() == message)
    }
}

impl fmt::Display for ErrorReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Reply sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `OK\n`
    Ok,
    /// `OK\n<content>\n`
    Value(Vec<u8>),
    /// `NOTFOUND\n`
    NotFound,
    /// `ERROR: <message>\n`
    Error(ErrorReply),
}

impl Response {
    /// Builds a `GET` reply, cutting the content to [`VALUE_REPLY_MAX`] bytes.
    pub fn value(mut content: Vec<u8>) -> Response {
        content.truncate(VALUE_REPLY_MAX);
        Response::Value(content)
    }

    /// Renders the reply as it is sent on the wire.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Response::Ok => b"OK\n".to_vec(),
            Response::Value(content) => {
                let mut buf = Vec::with_capacity(content.len() + 4);
                buf.extend_from_slice(b"OK\n");
                buf.extend_from_slice(content);
                buf.push(b'\n');
                buf
            }
            Response::NotFound => b"NOTFOUND\n".to_vec(),
            Response::Error(reply) => format!("ERROR: {}\n", reply).into_bytes(),
        }
    }

    /// Parses a reply read from the wire.
    pub fn decode(buf: &[u8]) -> Result<Response> {
        match buf {
            b"OK\n" => return Ok(Response::Ok),
            b"NOTFOUND\n" => return Ok(Response::NotFound),
            _ => {}
        }

        if let Some(content) = buf
            .strip_prefix(b"OK\n")
            .and_then(|rest| rest.strip_suffix(b"\n"))
        {
            return Ok(Response::Value(content.to_vec()));
        }

        let text = String::from_utf8_lossy(buf);
        let reply = text
            .strip_prefix("ERROR: ")
            .and_then(|rest| rest.strip_suffix('\n'))
            .and_then(ErrorReply::from_message);
        reply
            .map(Response::Error)
            .ok_or_else(|| KvError::UnexpectedResponse(text.into_owned()))
    }
}

impl From<ErrorReply> for Response {
    fn from(reply: ErrorReply) -> Self {
        Response::Error(reply)
    }
}
