//! Database seeding tool
//!
//! Populates the configured database with sample articles and subscribers
//! for local development. Safe to run against an empty database; re-running
//! reports conflicts for rows that already exist.
//!
//! Usage: cargo run --bin seed

use anyhow::Result;
use chrono::{Duration, Utc};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lasercalc::{
    config::Config,
    db::{
        migrations,
        repositories::{SqlxArticleRepository, SqlxSubscriberRepository},
        Database,
    },
    models::{ArticleCategory, ArticleStatus, CreateArticleInput, CreateSubscriberInput},
    services::{ArticleService, ArticleServiceError, SubscriberService, SubscriberServiceError},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,lasercalc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_with_env(Path::new("config.yml"))?;

    let db = Database::from_config(&config.database).await?;
    migrations::run_migrations(db.pool()).await?;
    tracing::info!("Database ready: {}", config.database.url);

    let articles = ArticleService::new(SqlxArticleRepository::shared(db.pool().clone()));
    let subscribers = SubscriberService::new(SqlxSubscriberRepository::shared(db.pool().clone()));

    seed_articles(&articles).await?;
    seed_subscribers(&subscribers).await?;

    tracing::info!("Seeding complete");
    Ok(())
}

async fn seed_articles(service: &ArticleService) -> Result<()> {
    let samples = vec![
        CreateArticleInput::new(
            "How Laser Cutting Costs Are Calculated",
            "Laser cutting cost breaks down into machine time, material, gas \
             consumption and labor. This article walks through each component \
             and shows how cutting speed tables drive the time estimate.",
        )
        .with_category(ArticleCategory::Tutorials)
        .with_tags(vec!["laser-cutting".to_string(), "costing".to_string()])
        .with_status(ArticleStatus::Published),
        CreateArticleInput::new(
            "Choosing Between Fiber and CO2 Lasers",
            "Fiber lasers dominate thin sheet work while CO2 machines keep an \
             edge on thick acrylic and some specialty materials. We compare \
             operating costs per hour for both technologies.",
        )
        .with_category(ArticleCategory::Industry)
        .with_tags(vec!["laser-cutting".to_string(), "equipment".to_string()])
        .with_status(ArticleStatus::Published),
        CreateArticleInput::new(
            "Reducing Sheet Metal Waste with Better Nesting",
            "Material is often the largest cost component of a cut part. \
             Better nesting strategies routinely recover 5-15% of sheet \
             material that would otherwise be scrapped.",
        )
        .with_category(ArticleCategory::Tutorials)
        .with_tags(vec!["nesting".to_string(), "material".to_string()])
        .with_status(ArticleStatus::Published),
        // Scheduled draft, goes live when the publish-due sweep runs after
        // the timestamp passes
        {
            let mut input = CreateArticleInput::new(
                "Shop Rate Benchmarks for 2026",
                "An annual survey of hourly rates across job shops, broken \
                 down by machine class and region.",
            )
            .with_category(ArticleCategory::News);
            input.published_at = Some(Utc::now() + Duration::days(7));
            input
        },
    ];

    for input in samples {
        let title = input.title.clone();
        match service.create(input).await {
            Ok(article) => tracing::info!(slug = %article.slug, "Seeded article"),
            Err(ArticleServiceError::DuplicateSlug(slug)) => {
                tracing::info!(%slug, "Article already exists, skipping")
            }
            Err(e) => anyhow::bail!("Failed to seed article '{}': {}", title, e),
        }
    }

    Ok(())
}

async fn seed_subscribers(service: &SubscriberService) -> Result<()> {
    let samples = vec![
        CreateSubscriberInput::new("owner@precision-metals.example")
            .with_source_tool("laser-cutting"),
        CreateSubscriberInput::new("estimator@fabworks.example").with_source_tool("quotation"),
        CreateSubscriberInput::new("buyer@sheetparts.example"),
    ];

    for input in samples {
        let email = input.email.clone();
        match service.subscribe(input).await {
            Ok(subscriber) => tracing::info!(email = %subscriber.email, "Seeded subscriber"),
            Err(SubscriberServiceError::AlreadySubscribed) => {
                tracing::info!(%email, "Subscriber already exists, skipping")
            }
            Err(e) => anyhow::bail!("Failed to seed subscriber '{}': {}", email, e),
        }
    }

    Ok(())
}
