use std::str;

use log::{debug, warn};

use crate::common::{Command, ErrorReply, Request, Response};
use crate::engines::KvsEngine;
use crate::parser::is_valid_key;

/// Runs a parsed request against `engine` and builds the reply.
///
/// Never fails: every storage outcome is folded into a [`Response`].
/// The key is validated before the engine is touched; a key that is not
/// UTF-8 is invalid.
pub fn dispatch<E: KvsEngine + ?Sized>(engine: &E, request: &Request) -> Response {
    if request.command == Command::Invalid {
        return ErrorReply::InvalidCommand.into();
    }
    let key = match str::from_utf8(&request.key) {
        Ok(key) if is_valid_key(key) => key,
        _ => {
            debug!("Rejected key {:?}", String::from_utf8_lossy(&request.key));
            return ErrorReply::InvalidKey.into();
        }
    };

    match request.command {
        Command::Set => match engine.write(key, &request.value) {
            Ok(()) => Response::Ok,
            Err(e) => {
                warn!("Could not store {:?}: {}", key, e);
                ErrorReply::CouldNotCreate.into()
            }
        },
        Command::Get => match engine.read(key) {
            Ok(Some(content)) => Response::value(content),
            Ok(None) => Response::NotFound,
            Err(e) => {
                warn!("Could not read {:?}: {}", key, e);
                Response::NotFound
            }
        },
        Command::Del => {
            if let Err(e) = engine.delete(key) {
                warn!("Could not delete {:?}: {}", key, e);
            }
            Response::Ok
        }
        Command::Invalid => ErrorReply::InvalidCommand.into(),
    }
}
