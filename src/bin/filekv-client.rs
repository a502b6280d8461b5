use std::net::SocketAddr;
use std::process::exit;

use clap::{Parser, Subcommand};

use filekv::KvsClient;

const DEFAULT_ADDR: &str = "127.0.0.1:5000";

#[derive(Parser)]
#[command(name = "filekv-client", version, about = "A one-shot key-value store client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the value of a key
    Set {
        /// The key
        key: String,
        /// The value; may contain spaces
        value: String,
        /// Server address
        #[arg(long, default_value = DEFAULT_ADDR, value_name = "IP-PORT")]
        addr: SocketAddr,
    },
    /// Get the value of a key
    Get {
        /// The key
        key: String,
        /// Server address
        #[arg(long, default_value = DEFAULT_ADDR, value_name = "IP-PORT")]
        addr: SocketAddr,
    },
    /// Remove a key
    Rm {
        /// The key
        key: String,
        /// Server address
        #[arg(long, default_value = DEFAULT_ADDR, value_name = "IP-PORT")]
        addr: SocketAddr,
    },
}

fn connect(addr: SocketAddr) -> KvsClient {
    KvsClient::connect(addr).unwrap_or_else(|e| {
        eprintln!("Failed to connect to server: {}", e);
        exit(1);
    })
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Set { key, value, addr } => {
            if let Err(e) = connect(addr).set(&key, &value) {
                eprintln!("{}", e);
                exit(1);
            }
        }
        Commands::Get { key, addr } => match connect(addr).get(&key) {
            Ok(Some(value)) => println!("{}", value),
            Ok(None) => println!("Key not found"),
            Err(e) => {
                eprintln!("{}", e);
                exit(1);
            }
        },
        Commands::Rm { key, addr } => {
            if let Err(e) = connect(addr).remove(&key) {
                eprintln!("{}", e);
                exit(1);
            }
        }
    }
}
