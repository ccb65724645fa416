//! atomstore CLI
//!
//! Command-line interface for inspecting and writing atom files.

use std::path::PathBuf;

use atomstore::{AtomEngine, AtomView, Config, SizePolicy, StrandsPolicy, WriteOptions};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// atomstore CLI
#[derive(Parser, Debug)]
#[command(name = "atomstore")]
#[command(about = "Fixed-record memory-mapped atom store")]
#[command(version)]
struct Args {
    /// Backing atom file
    #[arg(short, long, default_value = "./atoms.zpa")]
    path: PathBuf,

    /// Extent size in MB when creating the file
    #[arg(short, long, default_value = "100")]
    size_mb: u64,

    /// Fail if an existing file's size differs from --size-mb
    #[arg(long)]
    exact_size: bool,

    /// Store and verify a CRC32 in the strands field
    #[arg(long)]
    checksum: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create (or open) the atom file and report its capacity
    Init,

    /// Write a payload into a slot
    Write {
        /// Slot index
        #[arg(allow_negative_numbers = true)]
        index: i64,

        /// Payload (UTF-8, truncated to 32 bytes)
        payload: String,

        /// Schema tag
        #[arg(long, default_value = "1")]
        schema: u16,

        /// geo_hash override
        #[arg(long)]
        geo_hash: Option<u64>,

        /// flags override
        #[arg(long)]
        flags: Option<u16>,
    },

    /// Read a slot
    Read {
        /// Slot index
        #[arg(allow_negative_numbers = true)]
        index: i64,
    },

    /// Print file and occupancy info
    Info,

    /// List occupied slots
    Scan {
        /// Stop after this many atoms
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atomstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("atomstore v{}", atomstore::VERSION);

    // Build config from args
    let config = Config::builder()
        .path(&args.path)
        .size_mb(args.size_mb)
        .size_policy(if args.exact_size {
            SizePolicy::Exact
        } else {
            SizePolicy::UseExisting
        })
        .strands_policy(if args.checksum {
            StrandsPolicy::Crc32
        } else {
            StrandsPolicy::default()
        })
        .build();

    let mut engine = match AtomEngine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut engine, args.command) {
        tracing::error!("{}", e);
        if let Err(close_err) = engine.close() {
            tracing::warn!("Failed to close engine: {}", close_err);
        }
        std::process::exit(1);
    }

    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        std::process::exit(1);
    }
}

fn run(engine: &mut AtomEngine, command: Commands) -> atomstore::Result<()> {
    match command {
        Commands::Init => {
            println!("{}: {} slots", engine.path().display(), engine.capacity());
        }
        Commands::Write {
            index,
            payload,
            schema,
            geo_hash,
            flags,
        } => {
            let mut options = WriteOptions::new(schema);
            options.geo_hash = geo_hash;
            options.flags = flags;

            if engine.write_atom_with(index, payload.as_bytes(), options)? {
                println!("OK");
            } else {
                println!("REJECTED");
            }
        }
        Commands::Read { index } => match engine.read_atom(index)? {
            Some(view) => print_atom(&view),
            None => println!("(absent)"),
        },
        Commands::Info => {
            println!("path:      {}", engine.path().display());
            println!("capacity:  {}", engine.capacity());
            println!("occupied:  {}", engine.occupied_count()?);
            println!("strands:   {:?}", engine.config().strands_policy);
            println!("threshold: {:.4}", engine.filter().threshold());
        }
        Commands::Scan { limit } => {
            for view in engine.iter_occupied()?.take(limit) {
                print_atom(&view);
            }
        }
    }
    Ok(())
}

fn print_atom(view: &AtomView<'_>) {
    let payload = view.payload();
    let end = payload.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);

    println!(
        "[{}] schema=0x{:04x} h={:.4} stamp={} geo=0x{:x} flags=0b{:b} strands=0x{:x} payload={:?}",
        view.index(),
        view.schema(),
        view.harmony(),
        view.sequence_stamp(),
        view.geo_hash(),
        view.flags(),
        view.strands(),
        String::from_utf8_lossy(&payload[..end])
    );
}
