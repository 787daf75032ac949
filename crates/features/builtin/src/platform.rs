use crate::settings::{crate_name, number, text};
use serde_json::json;
use stencil_composer::domain::ConfigMap;
use stencil_composer::domain::feature::{
    FeatureArtifacts, FeatureKind, PostAction, PostActionKind, ProjectProfile, Tier,
};
use stencil_composer::{Feature, ProviderError};

pub const NATS: &str = "messaging-nats";
pub const DOCKER: &str = "deployment-docker";

pub(crate) fn features() -> Vec<Feature> {
    vec![
        Feature::builder()
            .id(NATS)
            .name("NATS messaging")
            .description("Publisher and subscriber wiring for a NATS server")
            .kind(FeatureKind::Messaging)
            .category("integration")
            .priority(30)
            .min_tier(Tier::Advanced)
            .optional_dependencies([crate::observability::TRACING])
            .default_config(ConfigMap::from([
                ("url".to_owned(), json!("nats://localhost:4222")),
                ("subjectPrefix".to_owned(), json!("events")),
            ]))
            .provider(nats)
            .build(),
        Feature::builder()
            .id(DOCKER)
            .name("Docker image")
            .description("Multi-stage Dockerfile and ignore list")
            .kind(FeatureKind::Deployment)
            .category("delivery")
            .priority(10)
            .default_config(ConfigMap::from([
                ("baseImage".to_owned(), json!("debian:bookworm-slim")),
                ("port".to_owned(), json!(8080)),
            ]))
            .provider(docker)
            .build(),
    ]
}

fn nats(profile: &ProjectProfile, config: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
    let url = text(config, "url", "nats://localhost:4222")?;
    let prefix = text(config, "subjectPrefix", "events")?;
    let subject = format!("{prefix}.{}", crate_name(&profile.name));

    Ok(FeatureArtifacts::new()
        .file(
            "src/messaging.rs",
            format!(
                "pub const NATS_URL: &str = {url:?};\npub const SUBJECT: &str = {subject:?};\n"
            ),
        )
        .template("messaging/nats.rs.hbs")
        .metadata("subject", subject))
}

fn docker(profile: &ProjectProfile, config: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
    let base = text(config, "baseImage", "debian:bookworm-slim")?;
    if base.is_empty() || base.contains(char::is_whitespace) {
        return Err(ProviderError::invalid_config(format!("'{base}' is not an image reference")));
    }
    let port = number(config, "port", 8080)?;
    let binary = crate_name(&profile.name);

    let dockerfile = format!(
        "FROM rust:1 AS build\nWORKDIR /src\nCOPY . .\nRUN cargo build --release\n\n\
         FROM {base}\nCOPY --from=build /src/target/release/{binary} /usr/local/bin/{binary}\n\
         EXPOSE {port}\nCMD [\"{binary}\"]\n"
    );

    Ok(FeatureArtifacts::new()
        .file("Dockerfile", dockerfile)
        .file(".dockerignore", "target\n.git\n")
        .asset("deployment/healthcheck.sh")
        .post_action(
            PostAction::new(PostActionKind::Custom, "Build container image", "docker")
                .args(["build", "-t", binary.as_str(), "."]),
        ))
}
