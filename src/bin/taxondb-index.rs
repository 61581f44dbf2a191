use clap::Parser;
use std::path::PathBuf;
use taxondb::{Database, IndexBuilder, map_file};

/// Build a minimizer offset index for a k-mer/taxon database file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Database (pair array) path
    #[arg(short, long)]
    database: PathBuf,

    /// Output index path (default: <database>.idx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Minimizer length in bases (1..=15, at most k)
    #[arg(short, long)]
    nt: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let map = map_file(&args.database)?;
    let db = Database::open(&map)?;
    anyhow::ensure!(
        args.nt >= 1 && args.nt <= 15 && args.nt <= db.k(),
        "minimizer length must be 1..=15 and at most k={}",
        db.k()
    );

    let bytes = IndexBuilder::new(args.nt).build(&db);
    let output = args.output.unwrap_or_else(|| {
        let mut path = args.database.clone().into_os_string();
        path.push(".idx");
        PathBuf::from(path)
    });
    std::fs::write(&output, &bytes)?;

    eprintln!(
        "Indexed {} pairs: k={}, nt={}, {} bins -> {}",
        db.key_ct(),
        db.k(),
        args.nt,
        1u64 << (2 * args.nt as u32),
        output.display()
    );

    Ok(())
}
