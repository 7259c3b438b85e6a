//! seqstore CLI
//!
//! Command-line interface for reading and editing sequence stores.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use seqstore::record::RecordReader;
use seqstore::{
    ArchiveStore, Compression, DirectoryStore, FileStore, Result, SeqError, SequenceBackend,
    SequenceStore, StorageConfig,
};
use tracing_subscriber::{fmt, EnvFilter};

/// seqstore CLI
#[derive(Parser, Debug)]
#[command(name = "seqstore-cli")]
#[command(about = "Key-value access to FASTA files, folders and archives")]
#[command(version)]
struct Args {
    /// Storage layout
    #[arg(short, long, value_enum, default_value = "file")]
    backend: BackendKind,

    /// Record file, directory or archive
    #[arg(short, long)]
    path: PathBuf,

    /// File pattern for the directory backend
    #[arg(short, long, default_value = seqstore::backend::DEFAULT_GLOB)]
    glob: String,

    /// Compression for the archive backend (none, gz, bz2, xz)
    #[arg(short, long, default_value = "xz")]
    compression: Compression,

    /// Wrap written sequences at N columns
    #[arg(short, long)]
    wrap: Option<usize>,

    /// Max sequences kept in the read cache
    #[arg(long)]
    cache_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackendKind {
    /// One text file holding every record
    File,
    /// One file per record
    Dir,
    /// One tar member per record
    Archive,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the sequence of a record
    Get {
        /// The header to look up
        header: String,
    },

    /// Store a record
    Set {
        /// The header to set
        header: String,

        /// The sequence to store
        sequence: String,
    },

    /// Delete a record
    Del {
        /// The header to delete
        header: String,
    },

    /// List every header
    Headers,

    /// Print every record in FASTA format
    Export,

    /// Add every record of a FASTA file
    Import {
        /// Multi-record FASTA file
        file: PathBuf,
    },

    /// Print the number of records
    Count,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = StorageConfig::builder().autocommit(true);
    if let Some(width) = args.wrap {
        builder = builder.wrap(width);
    }
    if let Some(size) = args.cache_size {
        builder = builder.cache_size(size);
    }
    let config = builder.build();

    let result = match args.backend {
        BackendKind::File => FileStore::open(&args.path, config)
            .and_then(|mut store| execute(&mut store, args.command)),
        BackendKind::Dir => DirectoryStore::open_with_glob(&args.path, &args.glob, config)
            .and_then(|mut store| execute(&mut store, args.command)),
        BackendKind::Archive => ArchiveStore::open(&args.path, args.compression, config)
            .and_then(|mut store| execute(&mut store, args.command)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(SeqError::NotFound(header)) => {
            eprintln!("not found: {}", header);
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run one command inside a guard, so edits are committed only on success
fn execute<B: SequenceBackend>(store: &mut SequenceStore<B>, command: Commands) -> Result<()> {
    store.scoped(|store| {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());

        match command {
            Commands::Get { header } => {
                writeln!(out, "{}", store.get(&header)?)?;
            }
            Commands::Set { header, sequence } => {
                store.set(header, sequence);
            }
            Commands::Del { header } => {
                if !store.contains(&header)? {
                    return Err(SeqError::NotFound(header));
                }
                store.delete(&header);
            }
            Commands::Headers => {
                for header in store.headers()? {
                    writeln!(out, "{}", header)?;
                }
            }
            Commands::Export => {
                let wrap = store.config().wrap;
                for record in store.items()? {
                    out.write_all(record?.to_fasta(wrap).as_bytes())?;
                }
            }
            Commands::Import { file } => {
                let reader = BufReader::new(File::open(&file)?);
                let mut imported = 0usize;
                for record in RecordReader::new(reader) {
                    let record = record?;
                    store.set(record.header, record.sequence);
                    imported += 1;
                }
                tracing::info!("Imported {} records from {}", imported, file.display());
            }
            Commands::Count => {
                writeln!(out, "{}", store.len()?)?;
            }
        }

        out.flush()?;
        Ok(())
    })
}
