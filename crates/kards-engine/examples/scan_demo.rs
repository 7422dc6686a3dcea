//! Scans a business card photo and lists the collection.
//!
//! Run with: `cargo run --example scan_demo -- card.jpg`
//!
//! Prerequisites:
//! - `GEMINI_API_KEY` set to a key for the extraction service
//! - A photo of a business card (JPEG, PNG or WebP)

use kards_engine::query::{EmptyState, SortKey};
use kards_engine::{CardStore, Engine, Error, ExtractionClient, Resolution, ScanOutcome};

#[tokio::main]
async fn main() -> kards_engine::Result<()> {
    let Some(file) = std::env::args().nth(1) else {
        eprintln!("usage: scan_demo <image>");
        std::process::exit(2);
    };

    let mut builder = ExtractionClient::builder();
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        builder = builder.api_key(key);
    }
    let mut engine = Engine::new(builder.build(), CardStore::open("kards-demo.json")?);
    println!("Loaded {} cards", engine.store().len());

    let photo = std::fs::read(&file)?;
    match engine.scan_upload(&photo).await {
        Ok(ScanOutcome::Saved(id)) => println!("Saved new card {}", id),
        Ok(ScanOutcome::Duplicate(pending)) => {
            println!(
                "{} at {} is already stored, updating it",
                pending.existing().fields.name,
                pending.existing().fields.company
            );
            engine.resolve(pending, Resolution::Update)?;
        }
        Err(Error::Client(e)) => {
            eprintln!("{}", e.category().user_message());
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    }

    println!("\n--- Cards (A-Z) ---");
    let cards = engine.view("", SortKey::NameAsc);
    if cards.is_empty() {
        println!("  {}", EmptyState::for_collection(engine.store().len()).message());
    }
    for card in cards {
        let f = &card.fields;
        println!("  {} - {} ({})", f.name, f.company, f.website_url().unwrap_or_default());
    }

    Ok(())
}
