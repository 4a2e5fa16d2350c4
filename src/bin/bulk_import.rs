use std::path::PathBuf;

use clap::Parser;

use revisio::config::AppConfig;
use revisio::db::repository::{MongoResourceRepository, ResourceRepository};
use revisio::import::{import_topics, resolve_asset_refs};
use revisio::models::container::ResourceContainer;
use revisio::parser::builder::parse_bulk_text;
use revisio::storage::client::{content_type_for, PendingAsset, S3AssetStorage};

/// Parse a revision-notes markup file and import its topics into a
/// resource container, one topic at a time.
#[derive(Parser, Debug)]
#[command(name = "bulk-import")]
struct Args {
    /// Path to the markup file.
    #[arg(long)]
    file: PathBuf,

    /// Subject of the target container (e.g. "Mathematics").
    #[arg(long)]
    subject: String,

    /// Course of the target container (e.g. "IGCSE").
    #[arg(long)]
    course: String,

    /// Exam board of the target container (e.g. "Edexcel").
    #[arg(long)]
    exam_board: String,

    /// Local image/PDF files referenced by name in the markup; uploaded
    /// to asset storage and rewritten to their URLs before parsing.
    /// Repeatable.
    #[arg(long = "asset")]
    assets: Vec<PathBuf>,

    /// Create the container if it does not exist yet.
    #[arg(long)]
    create: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revisio=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env();

    let mut text = std::fs::read_to_string(&args.file)?;

    if !args.assets.is_empty() {
        let storage = S3AssetStorage::from_env().await?;
        let mut pending = Vec::new();
        for path in &args.assets {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid asset path {}", path.display()))?
                .to_string();
            let content_type = content_type_for(&name).to_string();
            let data = std::fs::read(path)?;
            pending.push(PendingAsset {
                name,
                content_type,
                data,
            });
        }
        text = resolve_asset_refs(&storage, &text, pending).await?;
        tracing::info!(count = args.assets.len(), "Uploaded assets and resolved references");
    }

    let topics = parse_bulk_text(&text);
    if topics.is_empty() {
        anyhow::bail!("No topics found in {}", args.file.display());
    }
    tracing::info!(
        count = topics.len(),
        "Parsed topics from {}",
        args.file.display()
    );

    let client = mongodb::Client::with_uri_str(&config.mongodb_uri).await?;
    let db = client.database(&config.mongodb_database);
    let repo = MongoResourceRepository::new(&db);

    let container = match repo
        .find_by_course(&args.subject, &args.course, &args.exam_board)
        .await?
    {
        Some(container) => container,
        None if args.create => {
            repo.create_or_update(ResourceContainer::new(
                args.subject.clone(),
                args.course.clone(),
                args.exam_board.clone(),
            ))
            .await?;
            repo.find_by_course(&args.subject, &args.course, &args.exam_board)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Container upsert did not persist"))?
        }
        None => anyhow::bail!(
            "No container for {}/{}/{} (pass --create to make one)",
            args.subject,
            args.course,
            args.exam_board
        ),
    };
    let container_id = container
        .id
        .ok_or_else(|| anyhow::anyhow!("Container has no id"))?;

    let report = import_topics(&repo, &container_id, &topics).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.success_count == 0 && !report.failures.is_empty() {
        anyhow::bail!("All {} topics failed to import", report.failures.len());
    }
    Ok(())
}
