//! twinmap demo
//!
//! Uploads the DTDL models in a directory, writes two people and a friendship
//! through the typed repository, reads them back and cleans the graph up
//! again. Runs against an in-memory store that enforces uploaded models.
//!
//! Usage:
//!   twinmap-demo --models-dir core/twinmap-demo/models --verbose

mod models;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Months, TimeDelta, Utc};
use clap::Parser;
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;
use twinmap_model::EncodeMode;
use twinmap_store::{InMemoryTwinStore, RepositoryConfig, TwinRepository};

use crate::models::{ContactInfo, Friendship, Gender, GeoLocation, Person};

#[derive(Parser, Debug)]
#[command(name = "twinmap-demo")]
#[command(about = "Round-trips a small person graph through a twin store")]
struct Args {
    /// Directory holding DTDL model documents (*.json)
    #[arg(short, long, default_value = "models")]
    models_dir: PathBuf,

    /// Repository config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write zero values for absent properties instead of omitting them
    #[arg(long)]
    canonical: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let mut config = match &args.config {
        Some(path) => load_config(path).await?,
        None => RepositoryConfig::default(),
    };
    if args.canonical {
        config.encode_mode = EncodeMode::Canonical;
    }
    debug!("Repository config: {:?}", config);

    let store = Arc::new(InMemoryTwinStore::strict());
    let repository = TwinRepository::with_config(store.clone(), config);

    let documents = read_model_documents(&args.models_dir).await?;
    let uploaded = repository
        .upload_models(&documents)
        .await
        .context("Failed to upload models")?;
    info!("Uploaded models: {}", uploaded.join(", "));

    let people = create_test_people(&repository).await?;

    let raw = repository.load_twin(&people[1].id).await?;
    info!("Stored twin:\n{}", serde_json::to_string_pretty(&raw)?);

    let first: Person = repository.load(&people[0].id).await?;
    info!(
        "Loaded {} ({:?}), contact email {:?}",
        first.id,
        first.name,
        first.contact_info.as_ref().and_then(|c| c.email.as_deref())
    );

    let everyone: Vec<Person> = repository.load_all().await?;
    for person in &everyone {
        info!(
            "{}: {} friendship(s), geo location {}",
            person.id,
            person.friendships.len(),
            if person.geo_location.is_some() { "set" } else { "unset" }
        );
    }

    repository
        .delete_graph(&everyone)
        .await
        .context("Failed to delete test twins")?;
    info!(
        "Store now holds {} twin(s) and {} relationship(s)",
        store.twin_count().await,
        store.relationship_count().await
    );
    Ok(())
}

async fn load_config(path: &Path) -> Result<RepositoryConfig> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

/// Reads every `*.json` file in `dir`, in file name order.
async fn read_model_documents(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to open models directory {}", dir.display()))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        debug!("Reading model {}", path.display());
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        documents.push(text);
    }
    Ok(documents)
}

async fn create_test_people(repository: &TwinRepository) -> Result<Vec<Person>> {
    let now = Utc::now().fixed_offset();

    let mut first = Person::new("Test_6740cde7-961a-4e19-b914-be6cdd9450ea");
    first.name = Some("Test1".into());
    first.gender = Gender::Female;
    first.height = 177.0;
    first.birth_date = now.checked_sub_months(Months::new(25 * 12));
    first.car_count = 1;
    first.contact_info = Some(ContactInfo {
        email: Some("SomeEmail".into()),
    });
    first.created_by = Some("Someone".into());
    first.geo_location = Some(GeoLocation {
        latitude: 51.1,
        longitude: -0.5,
    });
    first.has_drivers_licence = true;
    first.time_spent_looking_at_cat_videos = Some(TimeDelta::seconds(14 * 3600 + 2 * 60 + 15));

    let mut second = Person::new("Test_693e3e41-d2db-45b4-91ad-2c4cbebe81bf");
    second.name = Some("Test2".into());
    second.gender = Gender::Male;
    second.height = 174.0;
    second.birth_date = now.checked_sub_months(Months::new(45 * 12));
    second.car_count = 3;
    second.time_spent_looking_at_cat_videos = Some(TimeDelta::seconds(14 * 3600 + 2 * 60 + 15));
    second.friendships.push(Friendship {
        target_id: first.id.clone(),
        comment: Some("Old classmate".into()),
    });

    repository.save(&first).await?;
    repository.save(&second).await?;
    let descriptor = repository
        .save_relationship(&second.id, &second.friendships[0])
        .await?;
    info!("Created relationship {}", descriptor.relationship_id);

    Ok(vec![first, second])
}
