//! Render a word cloud from a tokenizer export: a JSON word list plus a
//! pattern silhouette in, a size-bounded PNG and the chat's first
//! message (the caption) out.
//!
//! Stands in for the messaging-bot boundary: the archive decoder and
//! tokenizer produce the export file, this binary renders it and prints
//! the output path and caption for the transport layer to send.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use oblako_io::{RenderRequest, ServiceConfig, TempInput, generate};
use oblako_pipeline::{CloudConfig, WordEntry};
use oblako_render::EncodeLimits;

/// Render a densely packed word cloud from a chat-export word list,
/// shaped by a pattern silhouette.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Tokenizer export JSON:
    /// `{"first_message": "...", "words": [["слово", 42], ...]}`.
    input: PathBuf,

    /// Pattern base name, resolved as `{patterns_dir}/{name}.png`.
    #[arg(short, long)]
    pattern: String,

    /// Directory holding pattern images.
    #[arg(long, default_value = "patterns")]
    patterns_dir: PathBuf,

    /// User id embedded in the output file name.
    #[arg(long, default_value_t = 0)]
    user_id: i64,

    /// Directory receiving rendered clouds.
    #[arg(long, default_value = "outputs")]
    output_dir: PathBuf,

    /// Font file; the platform fallback chain is used when omitted.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Random seed for a reproducible layout.
    #[arg(long)]
    seed: Option<u64>,

    /// Square canvas size in pixels.
    #[arg(long)]
    size: Option<u32>,

    /// Output byte-size ceiling.
    #[arg(long)]
    max_bytes: Option<usize>,

    /// Delete the input export when done, on success or failure.
    #[arg(long)]
    delete_input: bool,
}

/// On-disk shape of the tokenizer's export.
#[derive(Deserialize)]
struct WordExport {
    first_message: String,
    words: Vec<(String, u32)>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("oblako=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // The guard deletes the export on every exit path below.
    let _cleanup = args.delete_input.then(|| TempInput::new(&args.input));

    let export: WordExport = serde_json::from_reader(std::fs::File::open(&args.input)?)?;
    let words: Vec<WordEntry> = export
        .words
        .into_iter()
        .map(|(word, frequency)| WordEntry::new(word, frequency))
        .collect();
    info!(words = words.len(), pattern = %args.pattern, "export loaded");

    let mut cloud = CloudConfig::default();
    if let Some(seed) = args.seed {
        cloud.seed = seed;
    }
    if let Some(size) = args.size {
        cloud.width = size;
        cloud.height = size;
    }
    let mut limits = EncodeLimits::default();
    if let Some(max_bytes) = args.max_bytes {
        limits.max_bytes = max_bytes;
    }
    let config = ServiceConfig {
        patterns_dir: args.patterns_dir,
        output_dir: args.output_dir,
        font_path: args.font,
        cloud,
        limits,
    };

    let request = RenderRequest {
        pattern: args.pattern,
        user_id: args.user_id,
        words,
        first_message: export.first_message,
    };
    let rendered = generate(&request, &config)?;

    println!("{}", rendered.path.display());
    if !rendered.first_message.is_empty() {
        println!("{}", rendered.first_message);
    }
    Ok(())
}
