//! Command-line business card wallet.
//!
//! Scans card photos through the extraction service and keeps the resulting
//! contacts in a local JSON collection.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use kards_engine::query::{EmptyState, SortKey};
use kards_engine::{
    CardStore, ContactRecord, Engine, Error, ExtractionClient, Resolution, Resolved, ScanOutcome,
};
use tracing::{debug, info};

// ============================================================================
// CLI Arguments
// ============================================================================

/// Scan, search and manage business cards.
#[derive(Parser, Debug)]
#[command(name = "kards")]
#[command(version, about, long_about = None)]
struct Args {
    /// API key for the extraction service (falls back to API_KEY)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Vision model used for extraction
    #[arg(long, env = "KARDS_MODEL", default_value = "gemini-2.5-flash")]
    model: String,

    /// Base URL of the extraction service
    #[arg(
        long,
        env = "KARDS_ENDPOINT",
        default_value = "https://generativelanguage.googleapis.com"
    )]
    endpoint: String,

    /// Path to the card collection file
    #[arg(long, env = "KARDS_STORE", default_value = "kards.json")]
    store: PathBuf,

    /// Extraction request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a photo of a business card and store the contact
    Scan {
        /// Image file to scan
        file: PathBuf,

        /// What to do when the card already exists: update, new or discard
        /// (asks when omitted)
        #[arg(long)]
        on_duplicate: Option<Resolution>,
    },

    /// List stored cards
    List {
        /// Only show cards whose name or company contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Sort order: id-desc, id-asc, name-asc or name-desc
        #[arg(long, default_value_t = SortKey::IdDesc)]
        sort: SortKey,
    },

    /// Show every field of a card
    Show {
        /// Card id
        id: String,
    },

    /// Edit a card's fields
    Edit {
        /// Card id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Delete a card
    Delete {
        /// Card id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
}

// ============================================================================
// Commands
// ============================================================================

async fn scan(
    engine: &mut Engine,
    file: &Path,
    on_duplicate: Option<Resolution>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(file)?;
    info!(file = %file.display(), size = bytes.len(), "Scanning card");

    let outcome = match engine.scan_upload(&bytes).await {
        Ok(outcome) => outcome,
        Err(Error::Client(e)) => {
            eprintln!("Scan unsuccessful: {}", e.category().user_message());
            return Err(Box::new(e));
        }
        Err(e) => return Err(Box::new(e)),
    };

    match outcome {
        ScanOutcome::Saved(id) => {
            let record = engine.store().get(&id).ok_or("saved card is missing")?;
            println!("Saved card {}", id);
            print_record(record);
        }
        ScanOutcome::Duplicate(pending) => {
            let existing = pending.existing();
            println!(
                "A card for {} at {} already exists ({}).",
                existing.fields.name, existing.fields.company, existing.id
            );
            let resolution = match on_duplicate {
                Some(r) => r,
                None => prompt_resolution()?,
            };
            match engine.resolve(pending, resolution)? {
                Resolved::Updated(id) => println!("Updated card {}", id),
                Resolved::Created(id) => println!("Saved as new card {}", id),
                Resolved::Discarded => println!("Scan discarded"),
            }
        }
    }
    Ok(())
}

fn list(engine: &Engine, search: &str, sort: SortKey) {
    let cards = engine.view(search, sort);
    if cards.is_empty() {
        println!(
            "{}",
            EmptyState::for_collection(engine.store().len()).message()
        );
        return;
    }

    debug!(count = cards.len(), sort = %sort, "listing cards");
    for card in cards {
        let f = &card.fields;
        let subtitle = [f.title.as_str(), f.company.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}  {:<24} {}", card.id, f.name, subtitle);
    }
}

fn show(engine: &Engine, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let record = engine
        .store()
        .get(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    print_record(record);
    Ok(())
}

fn print_record(record: &ContactRecord) {
    let f = &record.fields;
    println!("id:       {}", record.id);
    println!("name:     {}", f.name);
    println!("title:    {}", f.title);
    println!("company:  {}", f.company);
    println!(
        "phone:    {}",
        f.phone_link().unwrap_or_else(|| "N/A".to_string())
    );
    println!(
        "email:    {}",
        f.email_link().unwrap_or_else(|| "N/A".to_string())
    );
    println!(
        "website:  {}",
        f.website_url().unwrap_or_else(|| "N/A".to_string())
    );
    println!("address:  {}", f.address);
    println!("image:    {} bytes", record.card_image.len());
}

fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn prompt_resolution() -> io::Result<Resolution> {
    loop {
        print!("[u]pdate existing card, save as [n]ew card, or [d]iscard scan? ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(Resolution::Discard);
        }
        match line.trim().to_lowercase().as_str() {
            "u" | "update" => return Ok(Resolution::Update),
            "n" | "new" => return Ok(Resolution::New),
            "d" | "discard" => return Ok(Resolution::Discard),
            _ => continue,
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("API_KEY").ok())
        .filter(|k| !k.is_empty());

    if matches!(args.command, Command::Scan { .. }) && api_key.is_none() {
        return Err("no API key: set GEMINI_API_KEY or pass --api-key".into());
    }

    let mut builder = ExtractionClient::builder()
        .url(&args.endpoint)
        .model(&args.model)
        .timeout(Duration::from_secs(args.timeout_secs));
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }

    let store = CardStore::open(&args.store)?;
    info!(
        store = %args.store.display(),
        cards = store.len(),
        model = %args.model,
        "Opened card collection"
    );

    let mut engine = Engine::new(builder.build(), store);

    match args.command {
        Command::Scan { file, on_duplicate } => scan(&mut engine, &file, on_duplicate).await?,
        Command::List { search, sort } => list(&engine, &search, sort),
        Command::Show { id } => show(&engine, &id)?,
        Command::Edit {
            id,
            name,
            title,
            company,
            phone,
            email,
            website,
            address,
        } => {
            let mut draft = engine
                .store()
                .get(&id)
                .ok_or_else(|| Error::NotFound(id.clone()))?
                .to_draft();
            let overrides = [
                ("name", name),
                ("title", title),
                ("company", company),
                ("phone", phone),
                ("email", email),
                ("website", website),
                ("address", address),
            ];
            for (field, value) in overrides {
                if let (Some(value), Some(slot)) = (value, draft.fields.get_mut(field)) {
                    *slot = value;
                }
            }
            engine.store_mut().update(&id, draft)?;
            println!("Updated card {}", id);
        }
        Command::Delete { id, yes } => {
            let record = engine
                .store()
                .get(&id)
                .ok_or_else(|| Error::NotFound(id.clone()))?;
            let question = format!(
                "Delete the card for {}? This cannot be undone.",
                record.fields.name
            );
            if yes || confirm(&question)? {
                engine.store_mut().delete(&id)?;
                println!("Deleted card {}", id);
            } else {
                println!("Cancelled");
            }
        }
    }

    Ok(())
}
