use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use filekv::{FsStore, KvsClient, KvsEngine, KvsServer, MemoryStore, Result};
use tempfile::TempDir;

struct TestServer {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<Result<()>>,
}

impl TestServer {
    fn start<E: KvsEngine>(engine: E) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = KvsServer::new(engine).poll_interval(Duration::from_millis(5));
        let shutdown = server.shutdown_handle();
        let handle = thread::spawn(move || server.serve(listener));
        TestServer {
            addr,
            shutdown,
            handle,
        }
    }

    /// Sends raw bytes on a fresh connection and returns the whole reply.
    fn send(&self, request: &[u8]) -> String {
        let mut stream = TcpStream::connect(self.addr).unwrap();
        stream.write_all(request).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        reply
    }

    fn stop(self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        self.handle.join().unwrap()
    }
}

#[test]
fn set_then_get() {
    let server = TestServer::start(MemoryStore::new());

    assert_eq!(server.send(b"SET greeting hello world\n"), "OK\n");
    assert_eq!(server.send(b"GET greeting\n"), "OK\nhello world\n");

    server.stop().unwrap();
}

#[test]
fn get_missing() {
    let server = TestServer::start(MemoryStore::new());

    assert_eq!(server.send(b"GET missing\n"), "NOTFOUND\n");

    server.stop().unwrap();
}

#[test]
fn delete_then_get() {
    let server = TestServer::start(MemoryStore::new());

    assert_eq!(server.send(b"SET greeting hello\n"), "OK\n");
    assert_eq!(server.send(b"DEL greeting\n"), "OK\n");
    assert_eq!(server.send(b"DEL greeting\n"), "OK\n");
    assert_eq!(server.send(b"GET greeting\n"), "NOTFOUND\n");

    server.stop().unwrap();
}

#[test]
fn rejects_path_traversal() {
    let store = MemoryStore::new();
    let server = TestServer::start(store.clone());

    assert_eq!(server.send(b"SET ../etc/passwd x\n"), "ERROR: invalid key\n");
    assert_eq!(server.send(b"GET ../etc/passwd\n"), "ERROR: invalid key\n");
    assert_eq!(server.send(b"DEL a.b\n"), "ERROR: invalid key\n");
    assert!(store.is_empty());

    server.stop().unwrap();
}

#[test]
fn non_utf8_keys_are_rejected() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let server = TestServer::start(FsStore::new(temp_dir.path()));

    assert_eq!(server.send(b"SET a\xffb first\n"), "ERROR: invalid key\n");
    assert_eq!(server.send(b"GET a\xfeb\n"), "ERROR: invalid key\n");
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);

    server.stop().unwrap();
}

#[test]
fn protocol_errors() {
    let server = TestServer::start(MemoryStore::new());

    assert_eq!(server.send(b"PUT a b\n"), "ERROR: invalid command\n");
    assert_eq!(server.send(b"FOO"), "ERROR: invalid command\n");
    assert_eq!(server.send(b"GET\n"), "ERROR: missing key\n");
    assert_eq!(server.send(b"SET key\n"), "ERROR: missing value\n");
    assert_eq!(server.send(b"  \r\n"), "ERROR: malformed request\n");

    server.stop().unwrap();
}

#[test]
fn silent_client_gets_no_reply_and_server_keeps_going() {
    let server = TestServer::start(MemoryStore::new());

    assert_eq!(server.send(b""), "");
    assert_eq!(server.send(b"GET missing\n"), "NOTFOUND\n");

    server.stop().unwrap();
}

#[test]
fn files_on_disk() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let server = TestServer::start(FsStore::new(temp_dir.path()));

    assert_eq!(server.send(b"SET greeting hello world\n"), "OK\n");
    assert_eq!(
        std::fs::read(temp_dir.path().join("greeting")).unwrap(),
        b"hello world"
    );
    assert_eq!(server.send(b"GET greeting\n"), "OK\nhello world\n");
    assert_eq!(server.send(b"DEL greeting\n"), "OK\n");
    assert!(!temp_dir.path().join("greeting").exists());

    server.stop().unwrap();
}

#[test]
fn write_failure_is_reported() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let server = TestServer::start(FsStore::new(temp_dir.path().join("missing")));

    assert_eq!(server.send(b"SET key value\n"), "ERROR: could not create\n");
    assert_eq!(server.send(b"GET key\n"), "NOTFOUND\n");

    server.stop().unwrap();
}

#[test]
fn value_round_trip_up_to_capacity() {
    let server = TestServer::start(MemoryStore::new());

    let value = "v ".repeat(400);
    let value = value.trim_end();
    assert_eq!(server.send(format!("SET k {}", value).as_bytes()), "OK\n");
    assert_eq!(server.send(b"GET k"), format!("OK\n{}\n", value));

    server.stop().unwrap();
}

#[test]
fn client_round_trip() -> Result<()> {
    let server = TestServer::start(MemoryStore::new());
    let client = KvsClient::connect(server.addr)?;

    client.set("greeting", "hello world")?;
    assert_eq!(client.get("greeting")?, Some("hello world".to_owned()));
    client.remove("greeting")?;
    assert_eq!(client.get("greeting")?, None);

    let err = client.set("a/b", "x").unwrap_err();
    assert_eq!(err.to_string(), "ERROR: invalid key");

    server.stop()
}

#[test]
fn shutdown_closes_listener() {
    let server = TestServer::start(MemoryStore::new());
    let addr = server.addr;

    assert_eq!(server.send(b"GET missing\n"), "NOTFOUND\n");
    server.stop().unwrap();

    assert!(TcpStream::connect(addr).is_err());
}
