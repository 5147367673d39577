// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::info;

use lunchrs::application::dto::menu_message::QueueRecord;
use lunchrs::config::settings::Settings;
use lunchrs::domain::models::restaurant::RestaurantContext;
use lunchrs::domain::models::weekly_key::WeeklyKey;
use lunchrs::domain::repositories::secret_repository::SecretStore;
use lunchrs::domain::repositories::storage_repository::StorageRepository;
use lunchrs::domain::services::credential_provider::CredentialProvider;
use lunchrs::domain::services::csv_validator;
use lunchrs::domain::services::llm_service::LLMService;
use lunchrs::domain::services::menu_import::group_daily_menus;
use lunchrs::domain::services::request_builder::RequestBuilder;
use lunchrs::domain::use_cases::extract_menu::ExtractMenuUseCase;
use lunchrs::engines::reqwest_engine::ReqwestEngine;
use lunchrs::infrastructure::secrets::FileSecretStore;
use lunchrs::infrastructure::storage::create_storage_repository;
use lunchrs::utils::telemetry;
use lunchrs::workers::MenuWorker;

#[derive(Parser)]
#[command(name = "lunchrs", about = "Weekly lunch menu extraction pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one parse-menu queue message (reads stdin when --message is omitted)
    Html {
        /// JSON body: {"restaurant_url", "restaurant_id", "city", "area"}
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Extract the menu from a local image file
    Image {
        #[arg(short, long)]
        restaurant_id: String,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the weekly storage key for a restaurant
    Key {
        #[arg(short, long)]
        restaurant_id: String,
        /// Date as YYYY-MM-DD (default: today, UTC)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Validate a menu CSV file
    Validate { file: PathBuf },
    /// Print the daily menu items of a stored weekly CSV as JSON
    Import {
        #[arg(short, long)]
        key: String,
    },
}

/// 主函数
///
/// 初始化日志、配置与指标后执行子命令
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();
    let cli = Cli::parse();

    match cli.command {
        Commands::Key {
            restaurant_id,
            date,
        } => {
            let date = match date {
                Some(raw) => {
                    let day = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .with_context(|| format!("invalid date: {}", raw))?;
                    day.and_hms_opt(12, 0, 0)
                        .ok_or_else(|| anyhow!("invalid date: {}", raw))?
                        .and_utc()
                }
                None => Utc::now(),
            };
            println!("{}", WeeklyKey::build(&restaurant_id, Some(date)));
            Ok(())
        }
        Commands::Validate { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            match csv_validator::validate(&text) {
                Ok(document) => {
                    println!("valid: {} rows", document.len());
                    Ok(())
                }
                Err(e) => {
                    for reason in &e.reasons {
                        println!("{}", reason);
                    }
                    Err(e.into())
                }
            }
        }
        command => run_pipeline(command).await,
    }
}

async fn run_pipeline(command: Commands) -> anyhow::Result<()> {
    let settings = Settings::new()?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        lunchrs::infrastructure::metrics::init_metrics(&settings.metrics.listen_addr);
    }

    let storage = create_storage_repository(&settings.storage).await?;

    match command {
        Commands::Html { message } => {
            let body = match message {
                Some(body) => body,
                None => {
                    let mut body = String::new();
                    tokio::io::stdin().read_to_string(&mut body).await?;
                    body
                }
            };
            let worker = MenuWorker::new(build_use_case(&settings, storage.clone())?, storage);
            let outcomes = worker
                .handle_queue_batch(&[QueueRecord {
                    message_id: None,
                    body,
                }])
                .await?;
            for outcome in outcomes {
                println!("{}", outcome.key);
            }
            Ok(())
        }
        Commands::Image {
            restaurant_id,
            file,
        } => {
            let image = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let use_case = build_use_case(&settings, storage)?;
            let outcome = use_case
                .parse_image(image, &RestaurantContext::for_restaurant(restaurant_id))
                .await?;
            println!("{}", outcome.key);
            Ok(())
        }
        Commands::Import { key } => {
            let weekly_key =
                WeeklyKey::parse(&key).ok_or_else(|| anyhow!("not a weekly key: {}", key))?;
            let Some(object) = storage.get(&key).await? else {
                bail!("object not found: {}", key);
            };
            let csv_text = String::from_utf8(object.body).context("stored CSV is not UTF-8")?;
            let menus = group_daily_menus(
                &weekly_key,
                &csv_text,
                object.metadata.get("city").map(String::as_str),
                object.metadata.get("area").map(String::as_str),
            );
            println!("{}", serde_json::to_string_pretty(&menus)?);
            Ok(())
        }
        Commands::Key { .. } | Commands::Validate { .. } => Ok(()),
    }
}

fn build_use_case(
    settings: &Settings,
    storage: Arc<dyn StorageRepository>,
) -> anyhow::Result<Arc<ExtractMenuUseCase>> {
    let secret_store: Option<Arc<dyn SecretStore>> = settings
        .secrets
        .secrets_dir
        .as_ref()
        .map(|dir| Arc::new(FileSecretStore::new(dir)) as Arc<dyn SecretStore>);
    let credentials = Arc::new(CredentialProvider::from_settings(&settings.llm, secret_store));

    let client = LLMService::from_settings(&settings.llm, credentials)?;
    let fetcher = ReqwestEngine::from_settings(&settings.fetch)?;

    Ok(Arc::new(ExtractMenuUseCase::new(
        Arc::new(fetcher),
        Arc::new(client),
        RequestBuilder::from_settings(&settings.llm),
        storage,
    )))
}
