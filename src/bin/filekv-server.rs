use std::env::current_dir;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::{error, info};
use signal_hook::consts::{SIGINT, SIGTERM};

use filekv::{FsStore, KvsServer, Result};

const DEFAULT_ADDR: &str = "0.0.0.0:5000";

#[derive(Parser)]
#[command(name = "filekv-server", version, about = "A one-shot key-value store server")]
struct Cli {
    /// Server listening address
    #[arg(long, default_value = DEFAULT_ADDR, value_name = "IP-PORT")]
    addr: SocketAddr,

    /// Directory holding one file per key (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = match cli.dir {
        Some(dir) => dir,
        None => current_dir()?,
    };

    let store = FsStore::new(dir);

    info!("filekv-server {}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {}", store.dir().display());

    let server = KvsServer::new(store);
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, server.shutdown_handle())?;
    }

    server.run(cli.addr)?;
    info!("Server stopped");
    Ok(())
}
