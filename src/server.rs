use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, info};

use crate::common::{ErrorReply, Response, BUFFER_SIZE};
use crate::dispatch::dispatch;
use crate::engines::KvsEngine;
use crate::parser::parse;
use crate::{KvError, Result};

/// How long the accept loop sleeps when no client is waiting.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The server of the key-value store.
///
/// Connections are served one at a time: each is read, answered and closed
/// before the next one is accepted.
pub struct KvsServer<E: KvsEngine> {
    engine: E,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl<E: KvsEngine> KvsServer<E> {
    /// Creates a `KvsServer` with a given storage engine.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            shutdown: Arc::new(AtomicBool::new(false)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets how often the accept loop re-checks the shutdown flag while idle.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the shutdown flag.
    ///
    /// Storing `true` makes the accept loop stop at its next check. The flag
    /// is safe to set from a signal handler.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Binds `addr` and serves until the shutdown flag is set.
    pub fn run(&self, addr: impl ToSocketAddrs) -> Result<()> {
        let listener = TcpListener::bind(addr)?;
        info!("Listening on {}", listener.local_addr()?);
        self.serve(listener)
    }

    /// Serves connections from an already bound listener.
    ///
    /// The listener is closed when this returns.
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        // Non-blocking accept so the flag is polled even with no clients.
        listener.set_nonblocking(true)?;

        while !self.shutdown.load(Ordering::SeqCst) {
            match listener.accept() {
                Ok((stream, _)) => {
                    if let Err(e) = handle_connection(&self.engine, stream) {
                        error!("Error handling connection: {}", e);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(self.poll_interval);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    debug!("Accept interrupted");
                }
                Err(e) => error!("Connection failed: {}", e),
            }
        }

        drop(listener);
        info!("Shutting down");
        Ok(())
    }
}

/// Handles a single client connection.
///
/// Reads one request, writes one reply and closes the socket. A peer that
/// sends nothing gets no reply. The stream is dropped, and so closed, on
/// every path out of this function.
pub fn handle_connection<E: KvsEngine + ?Sized>(engine: &E, mut stream: TcpStream) -> Result<()> {
    let peer_addr = stream.peer_addr()?;
    debug!("Accepted connection from {}", peer_addr);

    // An accepted socket may inherit the listener's non-blocking mode.
    stream.set_nonblocking(false)?;

    let mut buf = [0u8; BUFFER_SIZE];
    let len = stream.read(&mut buf[..BUFFER_SIZE - 1])?;
    if len == 0 {
        return Err(KvError::ConnectionClosed);
    }

    let response = match parse(&buf[..len]) {
        Ok(request) => {
            debug!("Received request from {}: {:?}", peer_addr, request);
            dispatch(engine, &request)
        }
        Err(e) => {
            debug!("Bad request from {}: {}", peer_addr, e);
            Response::Error(ErrorReply::from(e))
        }
    };

    // `write_all` resumes after `Interrupted` and reports any short write.
    stream.write_all(&response.encode())?;
    stream.flush()?;
    debug!("Replied to {}", peer_addr);

    Ok(())
}
