use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// Seed URL to crawl and analyze
    #[arg(short, long)]
    pub url: String,

    /// Maximum crawl depth from the seed
    #[arg(short, long, default_value_t = 2)]
    pub depth: usize,

    /// Run the page analyzers over every discovered page and add
    /// status checks and load timings
    #[arg(short, long)]
    pub extended: bool,

    /// Skip load-time profiling (no local browser required)
    #[arg(long)]
    pub skip_load_times: bool,

    /// Report format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory thumbnails of oversized images are written to
    #[arg(long, default_value = "thumbnails")]
    pub thumbnail_dir: PathBuf,
}
