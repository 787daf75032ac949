//! Service skeleton: health endpoint and REST API.

use crate::settings::{crate_name, number, text};
use serde_json::{Map, Value, json};
use stencil_composer::domain::ConfigMap;
use stencil_composer::domain::feature::{
    FeatureArtifacts, FeatureKind, PostAction, PostActionKind, ProjectProfile,
};
use stencil_composer::{Feature, ProviderError};

pub const HEALTH_BASIC: &str = "health-basic";
pub const API_REST: &str = "api-rest";

pub(crate) fn features() -> Vec<Feature> {
    vec![
        Feature::builder()
            .id(HEALTH_BASIC)
            .name("Health checks")
            .description("Liveness and readiness endpoints")
            .kind(FeatureKind::Core)
            .category("web")
            .priority(100)
            .default_config(ConfigMap::from([("path".to_owned(), json!("/health"))]))
            .provider(health)
            .build(),
        Feature::builder()
            .id(API_REST)
            .name("REST API")
            .description("HTTP server with JSON routing")
            .kind(FeatureKind::Api)
            .category("web")
            .priority(90)
            .dependencies([HEALTH_BASIC])
            .optional_dependencies([crate::observability::TRACING])
            .default_config(ConfigMap::from([
                ("port".to_owned(), json!(8080)),
                ("prefix".to_owned(), json!("/api")),
            ]))
            .provider(rest)
            .build(),
    ]
}

fn health(
    profile: &ProjectProfile,
    config: &ConfigMap,
) -> Result<FeatureArtifacts, ProviderError> {
    let path = text(config, "path", "/health")?;
    let module = format!(
        "pub const HEALTH_PATH: &str = {path:?};\n\n\
         pub async fn live() -> &'static str {{\n    \"ok\"\n}}\n"
    );

    Ok(FeatureArtifacts::new()
        .file("src/health.rs", module)
        .template("web/health.rs.hbs")
        .metadata("healthPath", path)
        .metadata("service", crate_name(&profile.name)))
}

fn rest(profile: &ProjectProfile, config: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
    let port = number(config, "port", 8080)?;
    let prefix = text(config, "prefix", "/api")?;
    let name = crate_name(&profile.name);

    let mut manifest = Map::new();
    manifest.insert("name".to_owned(), Value::String(name.clone()));
    manifest.insert("port".to_owned(), json!(port));
    manifest.insert("prefix".to_owned(), Value::String(prefix.clone()));
    let manifest = serde_json::to_string_pretty(&manifest)?;

    let main = format!(
        "mod health;\nmod routes;\n\nconst NAME: &str = {name:?};\n\
         const ADDR: &str = \"0.0.0.0:{port}\";\n\n\
         fn main() {{\n    println!(\"{{NAME}} listening on {{ADDR}}{{}}\", routes::PREFIX);\n}}\n"
    );

    Ok(FeatureArtifacts::new()
        .file("src/main.rs", main)
        .file("src/routes.rs", format!("pub const PREFIX: &str = {prefix:?};\n"))
        .file("api.json", manifest)
        .template("web/main.rs.hbs")
        .asset("web/openapi.yaml")
        .metadata("port", port)
        .post_action(
            PostAction::new(PostActionKind::InstallDependencies, "Fetch crates", "cargo")
                .args(["fetch"]),
        )
        .post_action(
            PostAction::new(PostActionKind::Format, "Format sources", "cargo").args(["fmt"]),
        ))
}
