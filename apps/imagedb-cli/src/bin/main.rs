use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use imagedb_core::config::{expand_path, Config};
use imagedb_core::traits::RecordIndexer;
use imagedb_core::{DisplayMetadata, MetadataField, Record, SearchHits, SearchQuery};
use imagedb_ingest::{DocumentBuilder, FeatureFamily};
use imagedb_text::{ImageIndex, ImageSearcher, KeywordSearcher};

const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"];
const BATCH_SIZE: usize = 1000;

struct Args {
    cmd: String,
    positional: Vec<String>,
    index_dir: Option<PathBuf>,
    limit: Option<usize>,
    fresh: bool,
    histogram: bool,
}

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {prog} <index|search|similar> [args...] [--index DIR] [--limit N] [--fresh] [--histogram]");
    eprintln!("  index [DIR]          ingest images (metadata from <file>.json when present)");
    eprintln!("  search \"<phrase>\"    keyword search over title, tags and location");
    eprintln!("  similar <identifier> search with the stored record's title");
    std::process::exit(1);
}

fn parse_args() -> Args {
    let mut raw: Vec<String> = env::args().collect();
    let prog = raw.remove(0);
    if raw.is_empty() { usage(&prog); }
    let cmd = raw.remove(0);
    let mut args = Args { cmd, positional: Vec::new(), index_dir: None, limit: None, fresh: false, histogram: false };
    let mut i = 0;
    while i < raw.len() {
        match raw[i].as_str() {
            "--index" => {
                if i + 1 >= raw.len() { eprintln!("--index requires a path"); std::process::exit(2); }
                args.index_dir = Some(expand_path(&raw[i + 1]));
                i += 2; continue;
            }
            "--limit" => {
                match raw.get(i + 1).and_then(|v| v.parse().ok()) {
                    Some(n) => args.limit = Some(n),
                    None => { eprintln!("--limit requires a number"); std::process::exit(2); }
                }
                i += 2; continue;
            }
            "--fresh" => args.fresh = true,
            "--histogram" => args.histogram = true,
            s if s.starts_with('-') => { eprintln!("Unknown flag: {s}"); std::process::exit(2); }
            s => args.positional.push(s.to_string()),
        }
        i += 1;
    }
    args
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = Config::load().context("loading config")?;
    let args = parse_args();
    let index_dir = match args.index_dir.clone() {
        Some(dir) => dir,
        None => config.index_dir().unwrap_or_else(|_| PathBuf::from("dev_data/indexes/images")),
    };
    let max_hits = match args.limit {
        Some(n) => n,
        None => config.search()?.max_hits,
    };
    let writer_heap_bytes = config.index().map(|s| s.writer_heap_bytes).ok();

    match args.cmd.as_str() {
        "index" => {
            let data_dir = args.positional.first().map(expand_path).unwrap_or_else(|| PathBuf::from("dev_data/images"));
            let index = if args.fresh { ImageIndex::create(&index_dir)? } else { ImageIndex::open_or_create(&index_dir)? };
            let index = match writer_heap_bytes { Some(bytes) => index.with_writer_heap_bytes(bytes), None => index };
            let family = if args.histogram { FeatureFamily::ColorHistogram { bins: 8 } } else { FeatureFamily::Plain };
            let count = ingest(&data_dir, &index, &DocumentBuilder::new(family))?;
            println!("✅ Indexed {} images into {} ({} records total)", count, index_dir.display(), index.num_records());
        }
        "search" => {
            let phrase = args.positional.join(" ");
            let Some(query) = SearchQuery::new(phrase) else { usage("imagedb") };
            let index = ImageIndex::open(&index_dir)?;
            let searcher = KeywordSearcher::new(max_hits)?;
            print_hits(&query.to_string(), searcher.search(None, Some(&query), &index)?);
        }
        "similar" => {
            let Some(identifier) = args.positional.first() else { usage("imagedb") };
            let index = ImageIndex::open(&index_dir)?;
            let reference = index.find_by_identifier(identifier)?;
            let searcher = KeywordSearcher::new(max_hits)?;
            let label = reference.get(MetadataField::Title).unwrap_or_default().to_string();
            print_hits(&label, searcher.search_record(&reference, &index)?);
        }
        other => { eprintln!("Unknown command: {other}"); usage("imagedb"); }
    }
    Ok(())
}

fn ingest(data_dir: &Path, index: &ImageIndex, builder: &DocumentBuilder<FeatureFamily>) -> anyhow::Result<usize> {
    let files: Vec<PathBuf> = WalkDir::new(data_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())))
        .collect();
    info!(dir = %data_dir.display(), files = files.len(), "ingesting images");

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images {msg}")?.progress_chars("#>-"));
    let mut batch: Vec<Record> = Vec::with_capacity(BATCH_SIZE);
    let mut indexed = 0usize;
    for path in &files {
        pb.inc(1);
        let metadata = match load_metadata(path) {
            Ok(m) => m,
            Err(e) => { warn!(path = %path.display(), error = %e, "unreadable metadata sidecar, skipping"); continue; }
        };
        match builder.build_record_from_path(path, Some(&metadata)) {
            Ok(record) => batch.push(record),
            Err(e) => { warn!(path = %path.display(), error = %e, "skipping image"); continue; }
        }
        if batch.len() >= BATCH_SIZE {
            indexed += index.index(&batch)?;
            batch.clear();
        }
    }
    if !batch.is_empty() { indexed += index.index(&batch)?; }
    pb.finish_with_message("done");
    Ok(indexed)
}

/// Reads `<file>.json` next to the image, falling back to the path as
/// identifier and the file stem as title.
fn load_metadata(path: &Path) -> anyhow::Result<DisplayMetadata> {
    let mut sidecar = path.as_os_str().to_owned();
    sidecar.push(".json");
    let mut metadata = match std::fs::read_to_string(&sidecar) {
        Ok(json) => serde_json::from_str(&json)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => DisplayMetadata::default(),
        Err(e) => return Err(e.into()),
    };
    if metadata.identifier.is_none() {
        metadata.identifier = Some(path.to_string_lossy().to_string());
    }
    if metadata.title.is_none() {
        metadata.title = path.file_stem().map(|s| s.to_string_lossy().to_string());
    }
    Ok(metadata)
}

fn print_hits(label: &str, hits: Option<SearchHits>) {
    let Some(hits) = hits else { println!("No query for \"{label}\""); return };
    println!("🔍 {} results for \"{}\" (max distance {:.4})", hits.len(), label, hits.max_distance());
    for hit in &hits {
        let m = hit.record.metadata();
        println!(
            "{:>3}. distance={:.4} id={} title={} tags={} location={}",
            hit.rank + 1,
            hit.distance,
            m.identifier.unwrap_or_default(),
            m.title.unwrap_or_default(),
            m.tags.unwrap_or_default(),
            m.location.unwrap_or_default(),
        );
    }
}
