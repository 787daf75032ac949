use crate::settings::{number, text};
use serde_json::json;
use stencil_composer::domain::ConfigMap;
use stencil_composer::domain::feature::{FeatureArtifacts, FeatureKind, ProjectProfile, Tier};
use stencil_composer::{Feature, ProviderError};

pub const JWT: &str = "security-jwt";

pub(crate) fn features() -> Vec<Feature> {
    vec![
        Feature::builder()
            .id(JWT)
            .name("JWT authentication")
            .description("Bearer token validation middleware")
            .kind(FeatureKind::Security)
            .category("web")
            .priority(70)
            .dependencies([crate::web::API_REST])
            .min_tier(Tier::Intermediate)
            .default_config(ConfigMap::from([
                ("algorithm".to_owned(), json!("HS256")),
                ("ttlSeconds".to_owned(), json!(900)),
            ]))
            .provider(jwt)
            .build(),
    ]
}

fn jwt(_: &ProjectProfile, config: &ConfigMap) -> Result<FeatureArtifacts, ProviderError> {
    let algorithm = text(config, "algorithm", "HS256")?;
    if !matches!(algorithm.as_str(), "HS256" | "HS384" | "HS512" | "RS256" | "ES256") {
        return Err(ProviderError::invalid_config(format!("unsupported algorithm '{algorithm}'")));
    }
    let ttl = number(config, "ttlSeconds", 900)?;

    Ok(FeatureArtifacts::new()
        .file(
            "src/auth.rs",
            format!(
                "pub const ALGORITHM: &str = {algorithm:?};\n\
                 pub const TOKEN_TTL_SECS: u64 = {ttl};\n"
            ),
        )
        .file(".env.example", "JWT_SECRET=change-me\n")
        .template("security/jwt.rs.hbs")
        .metadata("authScheme", "bearer"))
}
