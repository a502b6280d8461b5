use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use crate::common::Response;
use crate::{KvError, Result};

/// The client of the key-value store.
///
/// The server answers one request per connection, so every call opens a
/// fresh connection.
pub struct KvsClient {
    addr: SocketAddr,
}

impl KvsClient {
    /// Resolves the server address.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "no address to connect to")
        })?;
        Ok(Self { addr })
    }

    /// Sets a key-value pair on the server.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        match self.request(&format!("SET {} {}", key, value))? {
            Response::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Gets the value for a key from the server.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match self.request(&format!("GET {}", key))? {
            Response::Value(content) => {
                Ok(Some(String::from_utf8_lossy(&content).into_owned()))
            }
            Response::NotFound => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    /// Removes a key on the server.
    pub fn remove(&self, key: &str) -> Result<()> {
        match self.request(&format!("DEL {}", key))? {
            Response::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Sends one raw request line and decodes the reply.
    pub fn request(&self, line: &str) -> Result<Response> {
        let mut stream = TcpStream::connect(self.addr)?;
        stream.write_all(format!("{}\n", line).as_bytes())?;
        stream.flush()?;
        stream.shutdown(Shutdown::Write)?;

        let mut reply = Vec::new();
        stream.read_to_end(&mut reply)?;
        Response::decode(&reply)
    }
}

fn unexpected(response: Response) -> KvError {
    match response {
        Response::Error(reply) => KvError::StringError(format!("ERROR: {}", reply)),
        other => KvError::UnexpectedResponse(format!("{:?}", other)),
    }
}
