//! This is the entrypoint for a standalone program that compiles a feature
//! library into the positional index the engine scans.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

use chrono::Utc;
use clap::Parser;
use log::{info, LevelFilter};
use sha1::{Digest, Sha1};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use strum::IntoEnumIterator;

use plasmap::{feature_db_load::read_library, FeatureDatabase, FeatureIndex, FeatureType};

#[derive(Parser)]
#[command(about = "Compile a feature library into a k-mer index")]
struct Args {
    /// The library text file: one feature per line.
    library: PathBuf,

    /// Library name recorded in the database.
    #[arg(long, default_value = "default")]
    db_name: String,

    /// Where to write the compiled index; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also save the parsed library as a binary database file.
    #[arg(long)]
    save_db: Option<PathBuf>,
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&args.library)?;

    let mut db = read_library(&args.db_name, &text)?;
    db.db_version = version_stamp();

    log_type_counts(&db);

    let index = FeatureIndex::build(&db)?;
    info!(
        "Compiled {} entries for {} features",
        index.entry_count(),
        db.features.len()
    );

    match &args.out {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            index.write(&mut writer)?;
            writer.flush()?;
        }
        None => index.write(&mut io::stdout().lock())?,
    }

    if let Some(path) = &args.save_db {
        db.save(path)?;
        info!("Saved library database to {}", path.display());
    }

    Ok(())
}

/// An opaque version string consumers compare to invalidate cached
/// annotations; the hash of the build timestamp.
fn version_stamp() -> String {
    let mut hasher = Sha1::new();
    hasher.update(Utc::now().to_rfc3339().as_bytes());

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

fn log_type_counts(db: &FeatureDatabase) {
    for feature_type in FeatureType::iter() {
        let count = db
            .features
            .iter()
            .filter(|f| f.feature_type == feature_type)
            .count();
        if count > 0 {
            info!("{}: {count}", feature_type.to_string());
        }
    }
}

fn main() -> ExitCode {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("logger init");

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
