#![deny(missing_docs)]

//! A minimal network-accessible key-value store.
//!
//! Clients connect over TCP, send a single `SET`, `GET` or `DEL` line and
//! receive a single text reply before the connection closes. Each key is
//! stored as one file, named by the key, inside the server's data directory.

mod client;
mod common;
mod dispatch;
mod engines;
mod error;
mod parser;
mod server;

pub use client::KvsClient;
pub use common::{
    Command, ErrorReply, Request, Response, BUFFER_SIZE, COMMAND_MAX, KEY_MAX, VALUE_MAX,
    VALUE_REPLY_MAX,
};
pub use dispatch::dispatch;
pub use engines::{FsStore, KvsEngine, MemoryStore};
pub use error::{KvError, Result};
pub use parser::{is_valid_key, parse, ParseError};
pub use server::{handle_connection, KvsServer};
