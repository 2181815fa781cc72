use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use foltia_core::cache::MemoryCache;
use foltia_core::video::VideoType;
use foltia_db::models::subtitle::SubtitleQuery;
use foltia_db::{DbConfig, SubtitleCatalog};

const USAGE: &str = "\
usage:
  foltia-catalog get <pid>
  foltia-catalog search [keyword] [page]
  foltia-catalog attach <pid> <ts|sd|hd> <filename>
  foltia-catalog detach <pid> <ts|sd|hd>...";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foltia_catalog=info,foltia_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("missing command\n{USAGE}");
    };

    // --- Configuration ---
    let config = DbConfig::from_env()?;
    tracing::info!(
        max_connections = config.max_connections,
        default_page_rows = config.default_page_rows,
        "Loaded database configuration"
    );

    // --- Database ---
    let pool = foltia_db::create_pool(&config)
        .await
        .context("Failed to connect to database")?;
    foltia_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    foltia_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    let catalog = SubtitleCatalog::new(pool.clone(), Arc::new(MemoryCache::new()))
        .with_default_page_rows(config.default_page_rows);

    let output = match command.as_str() {
        "get" => {
            let p_id = parse_pid(args.get(1))?;
            serde_json::to_value(catalog.get(p_id).await?)?
        }
        "search" => {
            let query = SubtitleQuery {
                keyword: args.get(1).filter(|k| !k.is_empty()).cloned(),
                ..Default::default()
            };
            let page = match args.get(2) {
                Some(raw) => raw.parse().with_context(|| format!("invalid page '{raw}'"))?,
                None => 0,
            };
            serde_json::to_value(catalog.find(&query, page).await?)?
        }
        "attach" => {
            let p_id = parse_pid(args.get(1))?;
            let video_type = parse_video_type(args.get(2))?;
            let Some(filename) = args.get(3).cloned() else {
                bail!("missing filename\n{USAGE}");
            };
            let updated = catalog
                .update_video(p_id, video_type, move |_, _| filename)
                .await?;
            serde_json::to_value(updated)?
        }
        "detach" => {
            let p_id = parse_pid(args.get(1))?;
            let video_types = args[2..]
                .iter()
                .map(|raw| parse_video_type(Some(raw)))
                .collect::<anyhow::Result<BTreeSet<_>>>()?;
            let result = catalog.delete_video(p_id, &video_types).await?;
            serde_json::to_value(result.map(|(before, after)| {
                serde_json::json!({ "before": before, "after": after })
            }))?
        }
        other => bail!("unknown command '{other}'\n{USAGE}"),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    pool.close().await;
    Ok(())
}

fn parse_pid(raw: Option<&String>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        bail!("missing pid\n{USAGE}");
    };
    raw.parse().with_context(|| format!("invalid pid '{raw}'"))
}

fn parse_video_type(raw: Option<&String>) -> anyhow::Result<VideoType> {
    let Some(raw) = raw else {
        bail!("missing video type\n{USAGE}");
    };
    VideoType::parse(raw).with_context(|| format!("invalid video type '{raw}'"))
}
