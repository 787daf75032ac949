//! Persistence and caching backends.
//!
//! `storage-database` and `storage-cache` share the storage kind, so a profile with the
//! default singleton kinds treats them as mutually exclusive.

use crate::settings::{crate_name, number, single_line, text};
use serde_json::json;
use stencil_composer::domain::ConfigMap;
use stencil_composer::domain::feature::{
    FeatureArtifacts, FeatureKind, PostAction, PostActionKind, ProjectProfile,
};
use stencil_composer::{Feature, ProviderError};

pub const DATABASE: &str = "storage-database";
pub const CACHE: &str = "storage-cache";
pub const REDIS: &str = "caching-redis";

const ENGINES: &[&str] = &["postgres", "mysql", "sqlite"];

pub(crate) fn features() -> Vec<Feature> {
    vec![
        Feature::builder()
            .id(DATABASE)
            .name("Relational database")
            .description("Connection pool and migration scaffolding")
            .kind(FeatureKind::Storage)
            .category("persistence")
            .priority(80)
            .default_config(ConfigMap::from([
                ("engine".to_owned(), json!("postgres")),
                ("poolSize".to_owned(), json!(10)),
            ]))
            .provider(database)
            .build(),
        Feature::builder()
            .id(CACHE)
            .name("Embedded cache store")
            .description("In-process key/value store for small deployments")
            .kind(FeatureKind::Storage)
            .category("persistence")
            .priority(40)
            .default_config(ConfigMap::from([("capacity".to_owned(), json!(10_000))]))
            .provider(cache)
            .build(),
        Feature::builder()
            .id(REDIS)
            .name("Redis cache")
            .description("Redis client with connection settings")
            .kind(FeatureKind::Caching)
            .category("persistence")
            .priority(45)
            .default_config(ConfigMap::from([("url".to_owned(), json!("redis://localhost:6379"))]))
            .provider(redis)
            .build(),
    ]
}

fn database(
    profile: &ProjectProfile,
    config: &ConfigMap,
) -> Result<FeatureArtifacts, ProviderError> {
    let engine = text(config, "engine", "postgres")?;
    if !ENGINES.contains(&engine.as_str()) {
        return Err(ProviderError::invalid_config(format!(
            "unknown engine '{engine}', expected one of {}",
            ENGINES.join(", ")
        )));
    }
    let pool = number(config, "poolSize", 10)?;
    let database = crate_name(&profile.name);

    Ok(FeatureArtifacts::new()
        .file(
            "src/db.rs",
            format!("pub const ENGINE: &str = {engine:?};\npub const POOL_SIZE: u32 = {pool};\n"),
        )
        .file("migrations/0001_init.sql", "-- initial schema\n")
        .file("config/database.env", format!("DATABASE_URL={engine}://localhost/{database}\n"))
        .template("storage/db.rs.hbs")
        .metadata("databaseEngine", engine.as_str())
        .post_action(
            PostAction::new(PostActionKind::Migrate, "Apply database migrations", "sqlx")
                .args(["migrate", "run"])
                .env("DATABASE_URL", format!("{engine}://localhost/{database}")),
        ))
}

fn cache(_: &ProjectProfile, config: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
    let capacity = number(config, "capacity", 10_000)?;

    Ok(FeatureArtifacts::new()
        .file("src/store.rs", format!("pub const CAPACITY: usize = {capacity};\n"))
        .template("storage/store.rs.hbs"))
}

fn redis(_: &ProjectProfile, config: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
    let url = text(config, "url", "redis://localhost:6379")?;
    if !url.starts_with("redis://") && !url.starts_with("rediss://") {
        return Err(ProviderError::invalid_config(format!("'{url}' is not a redis url")));
    }
    single_line("url", &url)?;

    Ok(FeatureArtifacts::new()
        .file("src/cache.rs", format!("pub const REDIS_URL: &str = {url:?};\n"))
        .file("config/cache.env", format!("REDIS_URL={url}\n"))
        .template("caching/redis.rs.hbs")
        .metadata("cacheBackend", "redis"))
}
