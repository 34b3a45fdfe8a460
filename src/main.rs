//! Command line front end: imports a `.reg` file into an in-memory store.

use clap::Parser;
use encoding_rs::Encoding;
use reg_import::{import_file, ImportError, ImportOptions, MemoryStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Import a Windows registry file (.reg)
///
/// Exits with status 0 when the file was read to the end, and 1 when it
/// could not be opened, has no usable header or uses a dialect whose
/// import is not complete.
#[derive(Parser)]
#[command(name = "reg-import")]
#[command(author, version, long_about = None)]
struct Cli {
    /// Registry file to import
    file: PathBuf,

    /// Code page for files without a UTF-16 byte order mark
    #[arg(long, value_name = "LABEL", default_value = "windows-1252", value_parser = parse_code_page)]
    code_page: &'static Encoding,

    /// Print the imported keys and values
    #[arg(long)]
    dump: bool,

    /// Print the imported keys and values as JSON
    #[cfg(feature = "serde")]
    #[arg(long, conflicts_with = "dump")]
    json: bool,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_code_page(label: &str) -> Result<&'static Encoding, String> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| format!("unknown code page '{}'", label))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reg_import={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dump(store: &MemoryStore) {
    for key in store.keys() {
        println!("[{}]", key.path);
        for value in &key.values {
            let name = match &value.name {
                Some(name) => format!("\"{}\"", name),
                None => "@".to_string(),
            };
            println!("{} ({}) = {}", name, value.value_type, value.data());
        }
        println!();
    }
}

fn run(cli: &Cli, store: &mut MemoryStore) -> Result<(), ImportError> {
    let options = ImportOptions::new().with_code_page(cli.code_page);

    // Line-level diagnostics are logged as warnings while importing.
    import_file(&cli.file, &mut *store, &options)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut store = MemoryStore::new();
    let outcome = run(&cli, &mut store);

    if cli.dump {
        dump(&store);
    }
    #[cfg(feature = "serde")]
    {
        if cli.json {
            match store.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            }
        }
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_header_error() => {
            eprintln!("Error: {}: {}", cli.file.display(), e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
