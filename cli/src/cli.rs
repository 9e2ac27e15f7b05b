use std::path::PathBuf;

use terragear::OutputStyle;

/// Scenery tile construction (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "construct-tile", version, about)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Source tree root; reads <work_base>.dem, <work_base>.apt, ...
    #[arg(value_hint = clap::ValueHint::AnyPath)]
    pub work_base: PathBuf,

    /// Output tree root; tiles are written under <output_base>/Scenery
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub output_base: PathBuf,

    /// Bucket index to build (repeatable)
    #[arg(short, long = "bucket")]
    pub buckets: Vec<i64>,

    /// Area to build, as min_lon,min_lat,max_lon,max_lat
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub bounds: Vec<f64>,

    /// JSON configuration file; flags override its values
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Tile layout: triangles or fans
    #[arg(long)]
    pub style: Option<OutputStyle>,

    /// Gzip the written tiles
    #[arg(long)]
    pub gzip: bool,
}
