//! trikona - fingerprint images and search for transformed copies
//!
//! # Usage
//!
//! ```bash
//! # Fingerprint images into an index snapshot
//! trikona insert photos/a.png photos/b.png
//!
//! # Rank indexed images against a query image
//! trikona lookup --index trikona.idx crop.png
//!
//! # Inspect the pooled keypoints of an image
//! trikona keypoints photos/a.png
//! ```

use std::path::{Path, PathBuf};
use std::process;

use trikona::{
    load_snapshot, save_snapshot, FingerprintPipeline, MemoryStore, PipelineConfig, Result,
    SimilarityIndex,
};

enum Command {
    Insert,
    Lookup,
    Keypoints,
}

/// Command line arguments
struct Args {
    command: Command,
    config_path: Option<PathBuf>,
    index_path: PathBuf,
    images: Vec<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut command = None;
    let mut config_path = None;
    let mut index_path = PathBuf::from("trikona.idx");
    let mut images = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--index" | "-i" => {
                if i + 1 < args.len() {
                    index_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                process::exit(1);
            }
            "insert" if command.is_none() => command = Some(Command::Insert),
            "lookup" if command.is_none() => command = Some(Command::Lookup),
            "keypoints" if command.is_none() => command = Some(Command::Keypoints),
            arg => {
                if command.is_none() {
                    eprintln!("Unknown command: {}", arg);
                    print_help();
                    process::exit(1);
                }
                images.push(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    let Some(command) = command else {
        print_help();
        process::exit(1);
    };
    if images.is_empty() {
        eprintln!("No images given");
        print_help();
        process::exit(1);
    }

    Args {
        command,
        config_path,
        index_path,
        images,
    }
}

fn print_help() {
    println!("trikona - transformation-resilient image fingerprinting");
    println!();
    println!("USAGE:");
    println!("    trikona <COMMAND> [OPTIONS] <IMAGE>...");
    println!();
    println!("COMMANDS:");
    println!("    insert       Fingerprint images and add them to the index");
    println!("    lookup       Rank indexed images against each query image");
    println!("    keypoints    Print the pooled keypoints of each image");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>    Pipeline configuration (TOML)");
    println!("    -i, --index <FILE>     Index snapshot path (trikona.idx)");
    println!("    -h, --help             Print help information");
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => {
            log::info!("Using config: {}", p.display());
            PipelineConfig::from_toml_file(p)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let config = load_config(args.config_path.as_deref())?;
    let pipeline = FingerprintPipeline::new(config)?;

    match args.command {
        Command::Insert => insert(&pipeline, &args),
        Command::Lookup => lookup(&pipeline, &args),
        Command::Keypoints => keypoints(&pipeline, &args),
    }
}

/// Fingerprint every image and merge it into the index snapshot.
///
/// Images that fail to load are skipped with an error; the snapshot is
/// written once at the end.
fn insert(pipeline: &FingerprintPipeline, args: &Args) -> Result<()> {
    let store = if args.index_path.exists() {
        log::info!("Loading index snapshot {}", args.index_path.display());
        load_snapshot(&args.index_path)?
    } else {
        MemoryStore::new()
    };
    let mut index = SimilarityIndex::with_store(store, pipeline.config().index);

    let mut indexed = 0usize;
    for path in &args.images {
        let id = path.to_string_lossy();
        match pipeline.fingerprint_file(path) {
            Ok(signature) => {
                let added = index.insert(&id, &signature.fingerprints)?;
                log::info!(
                    "{}: {} keypoints, {} triangles, {} fingerprints ({} new)",
                    id,
                    signature.keypoints.len(),
                    signature.triangles.len(),
                    signature.fingerprints.len(),
                    added
                );
                indexed += 1;
            }
            Err(e) => log::error!("skipping {}: {}", id, e),
        }
    }

    save_snapshot(index.store(), &args.index_path)?;
    log::info!(
        "indexed {}/{} images; snapshot {} holds {} fingerprints",
        indexed,
        args.images.len(),
        args.index_path.display(),
        index.store().len()
    );
    Ok(())
}

/// Rank indexed images against each query image by shared fingerprints.
fn lookup(pipeline: &FingerprintPipeline, args: &Args) -> Result<()> {
    let store = load_snapshot(&args.index_path)?;
    let index = SimilarityIndex::with_store(store, pipeline.config().index);

    for path in &args.images {
        let id = path.to_string_lossy();
        match pipeline.fingerprint_file(path) {
            Ok(signature) => {
                let matches = index.lookup(&signature.fingerprints)?;
                println!("{}", id);
                if matches.is_empty() {
                    println!("    no matches");
                }
                for m in &matches {
                    println!("    {:<10} {}", m.votes, m.id);
                }
            }
            Err(e) => log::error!("skipping {}: {}", id, e),
        }
    }
    Ok(())
}

/// Print the pooled keypoints of each image.
fn keypoints(pipeline: &FingerprintPipeline, args: &Args) -> Result<()> {
    for path in &args.images {
        let id = path.to_string_lossy();
        match image::open(path) {
            Ok(dynamic) => {
                let points = pipeline.keypoints(&dynamic.to_rgb8());
                println!("{}: {} keypoints", id, points.len());
                for p in &points {
                    println!("    {:.1} {:.1}", p.x, p.y);
                }
            }
            Err(e) => log::error!("skipping {}: {}", id, e),
        }
    }
    Ok(())
}
