mod fixtures;

use fixtures::{catalog, counted, profile, stub};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use stencil_composer::domain::ConfigMap;
use stencil_composer::domain::composition::{
    CompositionOptions, CompositionRequest, ConflictKind,
};
use stencil_composer::domain::feature::{
    FeatureArtifacts, FeatureKind, PostAction, PostActionKind, ProjectProfile,
};
use stencil_composer::{Composer, ComposerError, Feature, ProviderError};

fn request(features: &[&str], options: CompositionOptions) -> CompositionRequest {
    CompositionRequest::builder()
        .features(features.iter().copied())
        .profile(profile())
        .options(options)
        .build()
}

fn health_and_api() -> Composer {
    Composer::new(catalog([
        stub(
            "health-basic",
            FeatureKind::Core,
            &[],
            &[],
            FeatureArtifacts::new().file("src/health.rs", "pub fn ok() {}"),
        ),
        stub(
            "api-rest",
            FeatureKind::Api,
            &["health-basic"],
            &[],
            FeatureArtifacts::new().file("src/api.rs", "pub fn routes() {}"),
        ),
    ]))
}

#[tokio::test]
async fn dependencies_are_pulled_in_first() {
    let composer = health_and_api();
    let result = composer
        .compose(&request(&["api-rest"], CompositionOptions::default()))
        .await
        .expect("composition succeeds");

    assert_eq!(result.resolved_features, ["health-basic", "api-rest"]);
    assert_eq!(result.dependency_edges["api-rest"], ["health-basic"]);
    assert!(result.dependency_edges["health-basic"].is_empty());

    let bundle = result.bundle.expect("bundle generated");
    assert_eq!(bundle.files.len(), 2);
    assert_eq!(result.metadata["project"], json!("fixture"));
    assert_eq!(result.metadata["tier"], json!("basic"));
    assert_eq!(result.metadata["featureCount"], json!(2));
    assert_eq!(result.metadata["dryRun"], json!(false));
}

#[tokio::test]
async fn repeated_requests_yield_identical_results() {
    let composer = health_and_api();
    let request = request(&["api-rest", "health-basic"], CompositionOptions::default());

    let first = composer.compose(&request).await.unwrap();
    let second = composer.compose(&request).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn singleton_storage_conflict_can_be_tolerated() {
    let composer = Composer::new(catalog([
        stub("storage-database", FeatureKind::Storage, &[], &[], FeatureArtifacts::new()),
        stub("storage-cache", FeatureKind::Storage, &[], &[], FeatureArtifacts::new()),
    ]));
    let options = CompositionOptions::builder().fail_on_conflicts(false).build();

    let result = composer
        .compose(&request(&["storage-database", "storage-cache"], options))
        .await
        .expect("conflicts are tolerated");

    assert_eq!(result.resolved_features, ["storage-database", "storage-cache"]);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].kind, ConflictKind::TypeExclusive);
    assert_eq!(result.conflicts[0].feature_a, "storage-database");
    assert!(result.bundle.is_some());
}

#[tokio::test]
async fn conflicts_abort_before_any_provider_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let composer = Composer::new(catalog([
        counted("storage-database", FeatureKind::Storage, &calls),
        counted("storage-cache", FeatureKind::Storage, &calls),
    ]));

    let failure = composer
        .compose(&request(&["storage-database", "storage-cache"], CompositionOptions::default()))
        .await
        .unwrap_err();

    assert!(matches!(failure.error(), ComposerError::CompositionConflict { count: 1, .. }));
    assert_eq!(failure.report().conflicts.len(), 1);
    assert!(failure.report().bundle.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn explicit_conflict_is_reported_once_in_any_order() {
    let composer = Composer::new(catalog([
        stub("auth-jwt", FeatureKind::Security, &[], &["auth-session"], FeatureArtifacts::new()),
        stub("auth-session", FeatureKind::Security, &[], &[], FeatureArtifacts::new()),
    ]));
    let options = CompositionOptions::builder().fail_on_conflicts(false).dry_run(true).build();

    for order in [["auth-jwt", "auth-session"], ["auth-session", "auth-jwt"]] {
        let result = composer.compose(&request(&order, options.clone())).await.unwrap();
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].kind, ConflictKind::Explicit);
        assert_eq!(result.conflicts[0].feature_a, order[0]);
    }
}

#[tokio::test]
async fn later_feature_wins_shared_paths() {
    let composer = Composer::new(catalog([
        stub("a", FeatureKind::Core, &[], &[], FeatureArtifacts::new().file("p", "from a")),
        stub("b", FeatureKind::Api, &[], &[], FeatureArtifacts::new().file("p", "from b")),
    ]));

    let ab = composer.compose(&request(&["a", "b"], CompositionOptions::default())).await.unwrap();
    let ba = composer.compose(&request(&["b", "a"], CompositionOptions::default())).await.unwrap();

    assert_eq!(ab.bundle.unwrap().files["p"], "from b");
    assert_eq!(ba.bundle.unwrap().files["p"], "from a");
}

#[tokio::test]
async fn post_actions_are_concatenated() {
    let install = PostAction::new(PostActionKind::InstallDependencies, "install", "cargo")
        .args(["fetch"]);
    let composer = Composer::new(catalog([
        stub(
            "a",
            FeatureKind::Core,
            &[],
            &[],
            FeatureArtifacts::new().post_action(install.clone()).post_action(install.clone()),
        ),
        stub("b", FeatureKind::Api, &[], &[], FeatureArtifacts::new().post_action(install)),
    ]));

    let result =
        composer.compose(&request(&["a", "b"], CompositionOptions::default())).await.unwrap();
    assert_eq!(result.post_actions.len(), 3);
    assert_eq!(result.bundle.unwrap().post_actions.len(), 3);
}

#[tokio::test]
async fn dry_run_skips_generation_but_keeps_edges() {
    let calls = Arc::new(AtomicUsize::new(0));
    let composer = Composer::new(catalog([counted("health-basic", FeatureKind::Core, &calls)]));
    let options = CompositionOptions::builder().dry_run(true).build();

    let result = composer.compose(&request(&["health-basic"], options)).await.unwrap();

    assert!(result.bundle.is_none());
    assert_eq!(result.resolved_features, ["health-basic"]);
    assert!(result.dependency_edges.contains_key("health-basic"));
    assert_eq!(result.metadata["dryRun"], json!(true));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn provider_failure_is_attributed() {
    let broken = Feature::builder()
        .id("broken")
        .name("Broken")
        .kind(FeatureKind::Deployment)
        .provider(|_: &ProjectProfile, _: &ConfigMap| {
            Err::<FeatureArtifacts, _>(ProviderError::invalid_config("missing registry url"))
        })
        .build();
    let composer = Composer::new(catalog([
        stub("ok", FeatureKind::Core, &[], &[], FeatureArtifacts::new()),
        broken,
    ]));

    let failure = composer
        .compose(&request(&["ok", "broken"], CompositionOptions::default()))
        .await
        .unwrap_err();

    assert_eq!(failure.error().feature_id(), Some("broken"));
    assert!(matches!(
        failure.error(),
        ComposerError::FeatureGenerationFailed { source: ProviderError::InvalidConfig { .. }, .. }
    ));
    assert_eq!(failure.report().resolved_features, ["ok", "broken"]);
    assert!(failure.report().bundle.is_none());
}

#[tokio::test]
async fn first_failure_abandons_in_flight_providers() {
    let finished = Arc::new(AtomicBool::new(false));
    let slow = {
        let finished = Arc::clone(&finished);
        Feature::builder()
            .id("slow")
            .name("Slow")
            .kind(FeatureKind::Core)
            .provider(move |_: &ProjectProfile, _: &ConfigMap| {
                std::thread::sleep(Duration::from_millis(1000));
                finished.store(true, Ordering::SeqCst);
                Ok::<_, ProviderError>(FeatureArtifacts::new().file("slow.txt", "late"))
            })
            .build()
    };
    let bad = Feature::builder()
        .id("bad")
        .name("Bad")
        .kind(FeatureKind::Api)
        .provider(|_: &ProjectProfile, _: &ConfigMap| {
            Err::<FeatureArtifacts, _>(ProviderError::failed("boom"))
        })
        .build();
    let composer = Composer::new(catalog([slow, bad]));

    let started = Instant::now();
    let failure = composer
        .compose(&request(&["slow", "bad"], CompositionOptions::default()))
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(!finished.load(Ordering::SeqCst));
    assert_eq!(failure.error().feature_id(), Some("bad"));
    assert!(failure.to_string().starts_with("Composition failed: "));
    assert!(failure.to_string().contains("'bad'"));
    assert!(matches!(
        failure.error(),
        ComposerError::FeatureGenerationFailed { source: ProviderError::Failed { .. }, .. }
    ));
    assert!(failure.report().bundle.is_none());
    assert!(failure.report().post_actions.is_empty());
}

#[tokio::test]
async fn slow_provider_times_out() {
    let slow = Feature::builder()
        .id("slow")
        .name("Slow")
        .kind(FeatureKind::Core)
        .provider(|_: &ProjectProfile, _: &ConfigMap| {
            std::thread::sleep(Duration::from_millis(300));
            Ok::<_, ProviderError>(FeatureArtifacts::new())
        })
        .build();
    let composer = Composer::builder()
        .catalog(catalog([slow]))
        .provider_timeout(Duration::from_millis(20))
        .build();

    let failure =
        composer.compose(&request(&["slow"], CompositionOptions::default())).await.unwrap_err();
    assert!(failure.error().is_timeout());
}

#[tokio::test]
async fn panicking_provider_is_a_failure() {
    let panicking = Feature::builder()
        .id("panicky")
        .name("Panicky")
        .kind(FeatureKind::Core)
        .provider(|_: &ProjectProfile, _: &ConfigMap| -> Result<FeatureArtifacts, ProviderError> {
            panic!("provider bug")
        })
        .build();
    let composer = Composer::new(catalog([panicking]));

    let failure =
        composer.compose(&request(&["panicky"], CompositionOptions::default())).await.unwrap_err();
    assert!(matches!(
        failure.error(),
        ComposerError::FeatureGenerationFailed { source: ProviderError::Panicked { .. }, .. }
    ));
}

#[tokio::test]
async fn overrides_reach_the_provider() {
    let echo = Feature::builder()
        .id("echo")
        .name("Echo")
        .kind(FeatureKind::Core)
        .default_config(ConfigMap::from([
            ("port".to_owned(), json!(8080)),
            ("host".to_owned(), json!("localhost")),
        ]))
        .provider(|_: &ProjectProfile, config: &ConfigMap| {
            let rendered = serde_json::to_string(config)?;
            Ok::<_, ProviderError>(FeatureArtifacts::new().file("config.json", rendered))
        })
        .build();
    let composer = Composer::new(catalog([echo]));
    let request = CompositionRequest::builder()
        .features(["echo"])
        .profile(profile())
        .feature_config(
            [("echo".to_owned(), ConfigMap::from([("port".to_owned(), json!(9000))]))].into(),
        )
        .build();

    let result = composer.compose(&request).await.unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&result.bundle.unwrap().files["config.json"]).unwrap();
    assert_eq!(written, json!({ "host": "localhost", "port": 9000 }));
}

#[tokio::test]
async fn unused_overrides_are_warned_about() {
    let composer = health_and_api();
    let request = CompositionRequest::builder()
        .features(["health-basic"])
        .profile(profile())
        .feature_config([("api-rest".to_owned(), ConfigMap::new())].into())
        .options(CompositionOptions::builder().dry_run(true).build())
        .build();

    let result = composer.compose(&request).await.unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("api-rest"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_limit_is_respected() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let features = (0..6).map(|n| {
        let (running, peak) = (Arc::clone(&running), Arc::clone(&peak));
        Feature::builder()
            .id(format!("f{n}"))
            .name(format!("F{n}"))
            .kind(FeatureKind::Core)
            .provider(move |_: &ProjectProfile, _: &ConfigMap| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(15));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, ProviderError>(FeatureArtifacts::new())
            })
            .build()
    });
    let composer = Composer::builder().catalog(catalog(features)).max_concurrency(2).build();

    let ids = ["f0", "f1", "f2", "f3", "f4", "f5"];
    let result = composer.compose(&request(&ids, CompositionOptions::default())).await.unwrap();

    assert_eq!(result.resolved_features, ids);
    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn resolution_failure_keeps_warnings() {
    let composer = health_and_api();
    let options = CompositionOptions::builder().excluded_feature_ids(["health-basic"]).build();

    let failure = composer.compose(&request(&["api-rest", "missing"], options)).await.unwrap_err();

    assert!(matches!(failure.error(), ComposerError::FeatureNotFound { .. }));
    assert_eq!(failure.report().warnings.len(), 1);
    assert!(failure.report().resolved_features.is_empty());
}
