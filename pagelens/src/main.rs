mod arguments;

use anyhow::{bail, Context};
use arguments::Args;
use clap::Parser;
use pagelens_core::analysis::{run_analysis, AnalysisOptions};
use pagelens_core::report::{generate_json_report, generate_text_report, save_report, ReportFormat};
use pagelens_core::store::FsThumbnailStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Args = Args::parse();

    let format = match ReportFormat::from_str(&args.format) {
        Some(format) => format,
        None => bail!("unknown report format: {}", args.format),
    };

    let store = Arc::new(
        FsThumbnailStore::new(&args.thumbnail_dir)
            .with_context(|| format!("cannot use thumbnail dir {:?}", args.thumbnail_dir))?,
    );

    let options = AnalysisOptions {
        max_depth: args.depth,
        extended: args.extended,
        profile_load_times: !args.skip_load_times,
    };

    let report = run_analysis(&args.url, &options, store)
        .await
        .with_context(|| format!("analysis of {} failed", args.url))?;

    let rendered = match format {
        ReportFormat::Text => generate_text_report(&report),
        ReportFormat::Json => generate_json_report(&report)?,
    };

    match args.output {
        Some(path) => {
            save_report(&rendered, &path)
                .with_context(|| format!("cannot write report to {:?}", path))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
