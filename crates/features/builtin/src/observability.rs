use crate::settings::{flag, text};
use serde_json::json;
use stencil_composer::domain::ConfigMap;
use stencil_composer::domain::feature::{FeatureArtifacts, FeatureKind, ProjectProfile, Tier};
use stencil_composer::{Feature, ProviderError};

pub const TRACING: &str = "observability-tracing";
pub const METRICS: &str = "observability-metrics";

pub(crate) fn features() -> Vec<Feature> {
    vec![
        Feature::builder()
            .id(TRACING)
            .name("Structured tracing")
            .description("tracing subscriber with env filter and optional JSON output")
            .kind(FeatureKind::Observability)
            .category("telemetry")
            .priority(60)
            .default_config(ConfigMap::from([
                ("level".to_owned(), json!("info")),
                ("json".to_owned(), json!(false)),
            ]))
            .provider(tracing_setup)
            .build(),
        Feature::builder()
            .id(METRICS)
            .name("Metrics")
            .description("Prometheus scrape endpoint")
            .kind(FeatureKind::Observability)
            .category("telemetry")
            .priority(50)
            .dependencies([TRACING])
            .min_tier(Tier::Intermediate)
            .default_config(ConfigMap::from([("path".to_owned(), json!("/metrics"))]))
            .provider(metrics)
            .build(),
    ]
}

fn tracing_setup(
    _: &ProjectProfile,
    config: &ConfigMap,
) -> Result<FeatureArtifacts, ProviderError> {
    let level = text(config, "level", "info")?;
    let json = flag(config, "json", false)?;
    let layer = if json { ".json()" } else { "" };

    Ok(FeatureArtifacts::new()
        .file(
            "src/telemetry.rs",
            format!(
                "pub fn init() {{\n    tracing_subscriber::fmt()\n        \
                 .with_env_filter({level:?})\n        {layer}\n        .init();\n}}\n"
            ),
        )
        .template("telemetry/tracing.rs.hbs")
        .metadata("logLevel", level))
}

fn metrics(_: &ProjectProfile, config: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
    let path = text(config, "path", "/metrics")?;

    Ok(FeatureArtifacts::new()
        .file("src/metrics.rs", format!("pub const METRICS_PATH: &str = {path:?};\n"))
        .template("telemetry/metrics.rs.hbs")
        .asset("telemetry/grafana-dashboard.json")
        .metadata("metricsPath", path))
}
