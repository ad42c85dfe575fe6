use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use log::{info, warn};
use serde_json::Value;
use tokio::time;

use imovia::clients::AdminApiClient;
use imovia::config::{self, Config};
use imovia::import::{batch_import, BatchImporter, PreviewNavigator, PropertyBatch};
use imovia::logger::setup_logger;
use imovia::models::image::ImageBlob;
use imovia::models::property::DraftProperty;
use imovia::save::{LogProgress, SaveMode, StagedSave};
use imovia::session::AdminSession;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    setup_logger()?;

    let config: Arc<Config> = Arc::new(config::read_config());
    let client = AdminApiClient::new(&config)?;

    let path = env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: imovia <drafts.json>"))?;
    let text = fs::read_to_string(&path)?;

    if !client.probe_server().await {
        return Err(anyhow!("the backend at {} is not reachable", config.api_base_url));
    }

    // An array of drafts drives the bulk import; a single object drives the
    // staged save of one property.
    let value: Value = serde_json::from_str(&text)?;
    match value {
        Value::Array(_) => run_batch_import(&client, &text).await,
        Value::Object(_) => run_single_save(&client, &text).await,
        _ => Err(anyhow!("expected a JSON object or an array of objects")),
    }
}

async fn run_batch_import(client: &AdminApiClient, text: &str) -> Result<()> {
    let mut batch = PropertyBatch::new();
    let count = batch.replace_from_json(text)?;
    info!("Loaded {} draft properties", count);

    batch.begin_preview()?;
    let confirmed = preview_loop(&batch)?;
    if !confirmed {
        batch.discard();
        info!("Import cancelled, nothing was sent");
        return Ok(());
    }

    let importer = BatchImporter::new(client);
    let report = importer.submit(&mut batch).await?;
    println!(
        "{} properties registered successfully, {} failed.",
        report.succeeded, report.failed
    );

    if report.succeeded > 0 {
        time::sleep(batch_import::REDIRECT_DELAY).await;
        info!("Returning to the property list");
    }
    Ok(())
}

// Walks the preview one draft at a time; returns whether the user confirmed
// the whole batch.
fn preview_loop(batch: &PropertyBatch) -> Result<bool> {
    let mut navigator = PreviewNavigator::new(batch);
    loop {
        println!("{}", navigator.render_current()?);
        print!("[n]ext, [p]revious, [c]onfirm and submit, [q]uit > ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim() {
            "n" => navigator.next(),
            "p" => navigator.previous(),
            "c" => return Ok(true),
            "q" => return Ok(false),
            _ => println!("unknown command"),
        }
    }
}

async fn run_single_save(client: &AdminApiClient, text: &str) -> Result<()> {
    let draft: DraftProperty = serde_json::from_str(text)?;

    let mut blobs: Vec<ImageBlob> = Vec::with_capacity(draft.image_files.len());
    for file in &draft.image_files {
        blobs.push(ImageBlob::from_path(Path::new(file))?);
    }

    let mut session = AdminSession::new();
    session.select_files(blobs)?;
    if !session.pending_files().is_empty() {
        let staged = session.confirm_upload(client).await?;
        info!("Images added successfully ({} staged), saving the property", staged);
    }

    let save = StagedSave::new(client);
    let mut progress = LogProgress;
    let outcome = save
        .run(SaveMode::Create, &draft, session.confirmed_images(), &mut progress)
        .await?;

    if let Some(warning) = &outcome.warning {
        warn!("{}", warning);
    }
    println!("Property {} and images saved successfully.", outcome.property_id);
    session.clear_images();

    time::sleep(imovia::save::REDIRECT_DELAY).await;
    info!("Returning to the property list");
    Ok(())
}
