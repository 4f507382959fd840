//! Command-line facade for the identification engine.
//!
//! Subcommands: `identify` a recording against the catalog, `ingest` a file
//! or directory of songs, `erase` the catalog, and `stats`. All commands
//! accept `--config <yaml>`; without it the built-in defaults and an
//! in-memory store are used, which only makes sense for smoke tests.
//! Point real runs at a redb catalog.

use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use waveprint::config::WaveprintConfig;
use waveprint::ingest::Ingestor;
use waveprint::{
    convert_to_wav, query_fingerprints, read_wav, CandidateMatch, FingerprintStore, Matcher,
};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let config = match take_flag_value(&mut args, "--config") {
        Some(path) => WaveprintConfig::from_file(&path)
            .with_context(|| format!("loading config {path}"))?,
        None => WaveprintConfig::default(),
    };

    let Some(command) = args.first().cloned() else {
        print_usage();
        bail!("no command given");
    };

    let store = config
        .store
        .to_store_config()
        .build()
        .context("opening catalog store")?;

    match command.as_str() {
        "identify" => {
            let Some(path) = args.get(1) else {
                bail!("usage: identify <path_to_audio_file>");
            };
            identify(Path::new(path), &config, store)
        }
        "ingest" => {
            let Some(path) = args.get(1) else {
                bail!("usage: ingest <path_to_file_or_directory>");
            };
            ingest(Path::new(path), &config, store)
        }
        "erase" => {
            store.wipe().context("wiping catalog")?;
            println!("Catalog erased.");
            Ok(())
        }
        "stats" => {
            let total = store.total_songs().context("counting songs")?;
            println!("Songs in catalog: {total}");
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command '{other}'");
        }
    }
}

fn identify(
    path: &Path,
    config: &WaveprintConfig,
    store: Arc<dyn FingerprintStore>,
) -> Result<()> {
    let (wav_path, transcoded) = if path.extension().is_some_and(|ext| ext == "wav") {
        (path.to_path_buf(), false)
    } else {
        (convert_to_wav(path, 1).context("transcoding recording")?, true)
    };

    let result = (|| -> Result<Vec<CandidateMatch>> {
        let wav = read_wav(&wav_path).context("reading recording")?;
        let query = query_fingerprints(
            &wav.left,
            wav.sample_rate,
            &config.spectral,
            &config.fingerprint,
        )
        .context("fingerprinting recording")?;
        println!("Generated {} fingerprints from the recording.", query.len());

        let matcher = Matcher::new(store, config.matcher.clone());
        matcher.match_query(&query).context("matching recording")
    })();
    if transcoded {
        let _ = std::fs::remove_file(&wav_path);
    }
    let matches = result?;

    if matches.is_empty() {
        println!("\nNo matches found.");
        return Ok(());
    }

    println!("Top matches:");
    for candidate in matches.iter().take(20) {
        println!(
            "  - {} by {} ({:.2})",
            candidate.title, candidate.artist, candidate.score
        );
    }

    let best = &matches[0];
    println!("\nPrediction: {} by {} ({:.2})", best.title, best.artist, best.score);
    Ok(())
}

fn ingest(path: &Path, config: &WaveprintConfig, store: Arc<dyn FingerprintStore>) -> Result<()> {
    let ingestor = Ingestor::new(
        store,
        config.spectral.clone(),
        config.fingerprint.clone(),
        &config.ingest,
    );
    let report = ingestor
        .ingest_path(path)
        .with_context(|| format!("ingesting {}", path.display()))?;

    for song in &report.ingested {
        println!("Saved {} (song id {})", song.path.display(), song.song_id);
    }
    for failure in &report.failures {
        eprintln!("Failed {}: {}", failure.path.display(), failure.reason);
    }
    println!(
        "Ingested {} file(s), {} failure(s).",
        report.ingested.len(),
        report.failures.len()
    );

    if report.ingested.is_empty() && !report.failures.is_empty() {
        bail!("every file failed to ingest");
    }
    Ok(())
}

/// Pull `--flag value` out of the argument list, if present.
fn take_flag_value(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let index = args.iter().position(|arg| arg == flag)?;
    if index + 1 >= args.len() {
        return None;
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Some(value)
}

fn print_usage() {
    println!("waveprint - song identification and catalog management");
    println!("Usage: waveprint [--config <yaml>] <command> [arguments]");
    println!();
    println!("Commands:");
    println!("  identify <file>     Identify a recording against the catalog");
    println!("  ingest <path>       Fingerprint and save a file or directory");
    println!("  erase               Clear the catalog");
    println!("  stats               Show catalog statistics");
}
