//! HandlerSocket CLI Client
//!
//! Command-line interface for talking to a HandlerSocket server.

use clap::{Args as ClapArgs, Parser, Subcommand};
use handlersocket::protocol::{Field, Response, Value};
use handlersocket::{Client, ClientConfig, Command, HsError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Index id the CLI binds before every find/insert
const INDEX_ID: u32 = 1;

/// HandlerSocket CLI
#[derive(Parser, Debug)]
#[command(name = "handlersocket-cli")]
#[command(about = "CLI for HandlerSocket key-value access")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9999")]
    server: String,

    /// Secret for the auth command
    #[arg(long)]
    secret: Option<String>,

    /// Connect, read and write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

/// Table selection shared by find and insert
#[derive(ClapArgs, Debug)]
struct IndexArgs {
    /// Database name
    #[arg(long)]
    db: String,

    /// Table name
    #[arg(long)]
    table: String,

    /// Index name
    #[arg(long, default_value = "PRIMARY")]
    index: String,

    /// Comma separated column list
    #[arg(long)]
    columns: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find rows by index key
    Find {
        #[command(flatten)]
        index: IndexArgs,

        /// Comparison operator (=, >, >=, <, <=)
        #[arg(long, default_value = "=")]
        op: String,

        /// Maximum rows to return
        #[arg(long)]
        limit: Option<u32>,

        /// Rows to skip
        #[arg(long, default_value = "0")]
        offset: u32,

        /// Key values (\N for null, int:, hex: and text: prefixes)
        keys: Vec<Value>,
    },

    /// Insert one row
    Insert {
        #[command(flatten)]
        index: IndexArgs,

        /// Column values in the order of --columns
        values: Vec<Value>,
    },

    /// Send one raw line and print the response
    Raw {
        /// Fields of the line
        fields: Vec<Value>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,handlersocket=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut builder = ClientConfig::builder()
        .addr(&args.server)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms);
    if let Some(secret) = &args.secret {
        builder = builder.auth_secret(secret);
    }
    let config = builder.build();

    tracing::debug!("Connecting to {}", config.addr);
    let mut client = Client::connect(&config)?;

    let response = match args.command {
        Commands::Find {
            index,
            op,
            limit,
            offset,
            keys,
        } => {
            open_index(&mut client, &index)?;
            match limit {
                Some(limit) => client.find_multi(INDEX_ID, &op, keys, limit, offset)?,
                None => client.find(INDEX_ID, &op, keys)?,
            }
            finish(&mut client)?
        }
        Commands::Insert { index, values } => {
            open_index(&mut client, &index)?;
            client.insert(INDEX_ID, values)?;
            finish(&mut client)?
        }
        Commands::Raw { fields } => {
            if fields.is_empty() {
                return Err(HsError::Config("raw needs at least one field".to_string()));
            }
            client.send(&Command::Raw { values: fields })?;
            client.flush()?;
            client.read_response()?
        }
    };

    for row in response.rows() {
        println!("{}", render_row(row));
    }

    client.close()
}

/// Pipeline the open-index command ahead of the real one
fn open_index(client: &mut Client, index: &IndexArgs) -> Result<()> {
    let columns: Vec<&str> = index.columns.split(',').map(str::trim).collect();
    client.open_index(INDEX_ID, &index.db, &index.table, &index.index, &columns)
}

/// Flush both pipelined commands and return the second response
fn finish(client: &mut Client) -> Result<Response> {
    client.flush()?;
    client.read_response()?;
    client.read_response()
}

fn render_row(row: &[Field]) -> String {
    row.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\t")
}
