//! Application entry point: `reel-reader <file> [--narrate <chunk>] [--save]`.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Read and chunk the input file into a [`BookRecord`].
//! 4. Print the chunk list.
//! 5. `--save`: store the record in the [`JsonBookStore`].
//! 6. `--narrate N`: create a [`tokio`] runtime and narrate chunk `N`,
//!    printing each highlighted word until the session ends.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use reel_reader::{
    config::AppConfig,
    library::{BookRecord, JsonBookStore, RecordStore},
    narration::{build_strategy, Backends},
    sync::{SyncController, SyncEvent, SyncState},
    text::{display_word, Chunk, ChunkBuilder, SentenceSplitter},
};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Chunk a text file for reel reading, optionally narrating one chunk.
#[derive(Debug, PartialEq, Parser)]
#[command(name = "reel-reader", version, about)]
struct Args {
    /// Text file to ingest
    file: PathBuf,

    /// Narrate the chunk at this index, printing each highlighted word
    #[arg(long, value_name = "CHUNK_INDEX")]
    narrate: Option<usize>,

    /// Store the ingested book in the library
    #[arg(long)]
    save: bool,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn ingest(path: &Path, config: &AppConfig) -> Result<BookRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let policy = config.chunking.policy().context("invalid [chunking] settings")?;
    let builder = ChunkBuilder::with_splitter(
        policy,
        SentenceSplitter::with_extra(&config.text.extra_abbreviations),
    );
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string());
    Ok(BookRecord::ingest_with(title, &raw, &builder))
}

fn print_chunks(book: &BookRecord) {
    println!("{} ({} chunk(s), {} word(s))", book.title, book.chunks.len(), book.word_count());
    for chunk in &book.chunks {
        println!(
            "[{:>3}] {:>3} words  {}..{}  {}",
            chunk.id,
            chunk.word_count(),
            chunk.start_position,
            chunk.end_position,
            chunk.text
        );
    }
}

async fn narrate(chunk: &Chunk, config: &AppConfig) -> Result<()> {
    let strategy = build_strategy(&config.narration, Backends::default());
    let (controller, mut events) = SyncController::from_config(strategy, config);

    controller.play_chunk(chunk).await;
    while let Some(event) = events.recv().await {
        match event {
            SyncEvent::WordIndexChanged(i) => {
                let word = chunk.words.get(i).map(String::as_str).unwrap_or_default();
                println!("{i:>4}  {}", display_word(word));
            }
            SyncEvent::StateChanged(state) => {
                log::info!("narration: {}", state.label());
                if matches!(state, SyncState::Completed | SyncState::Errored) {
                    break;
                }
            }
            SyncEvent::Error(message) => eprintln!("narration error: {message}"),
        }
    }
    controller.stop();
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3–4. Ingest and list
    let mut book = ingest(&args.file, &config)?;
    print_chunks(&book);

    if let Some(index) = args.narrate {
        if index >= book.chunks.len() {
            bail!("chunk {index} does not exist ({} chunk(s))", book.chunks.len());
        }
        book.set_position(index);
    }

    // 5. Persist
    if args.save {
        let store = JsonBookStore::open_default();
        store.put(&book)?;
        println!("saved {} to {}", book.id, store.dir().display());
    }

    // 6. Narrate
    if let Some(chunk) = args.narrate.and_then(|i| book.chunks.get(i)) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("failed to create tokio runtime")?;
        rt.block_on(narrate(chunk, &config))?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("reel-reader").chain(list.iter().copied()))
    }

    #[test]
    fn parses_file_and_flags() {
        assert_eq!(
            args(&["book.txt", "--narrate", "2", "--save"]).unwrap(),
            Args {
                file: PathBuf::from("book.txt"),
                narrate: Some(2),
                save: true,
            }
        );
        assert_eq!(
            args(&["book.txt"]).unwrap(),
            Args {
                file: PathBuf::from("book.txt"),
                narrate: None,
                save: false,
            }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.txt", "--narrate"]).is_err());
        assert!(args(&["a.txt", "--narrate", "x"]).is_err());
        assert!(args(&["a.txt", "b.txt"]).is_err());
        assert!(args(&["a.txt", "--loud"]).is_err());
    }

    #[test]
    fn ingest_uses_config_abbreviations() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("voyage.txt");
        std::fs::write(&path, "Capt. Nemo dived. Deep.").unwrap();

        let mut config = AppConfig::default();
        config.chunking.target_words = 1;
        config.chunking.max_words = 1;
        config.chunking.min_words = 1;
        config.text.extra_abbreviations = vec!["Capt".into()];

        let book = ingest(&path, &config).unwrap();
        assert_eq!(book.title, "voyage");
        assert_eq!(book.chunks[0].text, "Capt. Nemo dived.");
    }

    #[test]
    fn ingest_rejects_invalid_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.txt");
        std::fs::write(&path, "Hello.").unwrap();

        let mut config = AppConfig::default();
        config.chunking.min_words = 100;
        assert!(ingest(&path, &config).is_err());
    }
}
