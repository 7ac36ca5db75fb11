use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use breedmatch_common::{AppConfig, TraitScores};
use breedmatch_ml::{seed_dataset, train, ModelBundle, TrainingOptions};
use breedmatch_server::{configure, AppState};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};

fn options() -> TrainingOptions {
    TrainingOptions {
        n_estimators: 10,
        show_progress: false,
        ..TrainingOptions::default()
    }
}

fn build_state(config: AppConfig) -> Arc<AppState> {
    let dataset = seed_dataset();
    let (bundle, _) = train(&dataset, &options()).unwrap();
    Arc::new(AppState::from_parts(config, dataset, bundle).unwrap())
}

fn shared_state() -> Arc<AppState> {
    static STATE: OnceLock<Arc<AppState>> = OnceLock::new();
    STATE.get_or_init(|| build_state(AppConfig::default())).clone()
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data(web::Data::new($state)).configure(configure)).await
    };
}

fn preferences(scores: TraitScores, top_n: Option<usize>) -> Value {
    let mut body = serde_json::to_value(scores).unwrap();
    if let Some(n) = top_n {
        body["top_n"] = json!(n);
    }
    body
}

#[actix_web::test]
async fn test_health() {
    let app = app!(shared_state());
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["breeds"], 25);
}

#[actix_web::test]
async fn test_api_recommend_ranks_by_similarity() {
    let app = app!(shared_state());
    let req = test::TestRequest::post()
        .uri("/api/recommend")
        .set_json(preferences(TraitScores::uniform(3), None))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["count"], 5);
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 5);
    assert_eq!(recs[0]["breed"], "Chihuahua");
    assert_eq!(recs[0]["characteristics"]["size"], 1);

    let sims: Vec<f64> = recs.iter().map(|r| r["similarity"].as_f64().unwrap()).collect();
    assert!(sims.windows(2).all(|w| w[0] >= w[1]));
    assert!(body["user_cluster"].as_u64().unwrap() < 5);
}

#[actix_web::test]
async fn test_api_recommend_caps_top_n() {
    let config = AppConfig {
        max_top_n: 7,
        ..AppConfig::default()
    };
    let app = app!(build_state(config));
    let req = test::TestRequest::post()
        .uri("/api/recommend")
        .set_json(preferences(TraitScores::uniform(4), Some(100)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 7);
}

#[actix_web::test]
async fn test_api_recommend_rejects_bad_input() {
    let app = app!(shared_state());

    let out_of_range = preferences(TraitScores::uniform(3).with(breedmatch_common::Trait::Size, 9), None);
    let missing = json!({ "size": 3, "energy_level": 3 });
    let zero_top_n = preferences(TraitScores::uniform(3), Some(0));

    for body in [out_of_range, missing, zero_top_n] {
        let req = test::TestRequest::post().uri("/api/recommend").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let err: Value = test::read_body_json(resp).await;
        assert!(err["error"].is_string());
    }
}

#[actix_web::test]
async fn test_api_knn_exact_match_first() {
    let app = app!(shared_state());
    let great_dane = TraitScores::from_array([5, 2, 3, 4, 2, 1, 1, 2, 3, 3]);
    let req = test::TestRequest::post()
        .uri("/api/recommend/knn")
        .set_json(preferences(great_dane, Some(3)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["count"], 3);
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs[0]["breed"], "Great Dane");
    assert!((recs[0]["similarity"].as_f64().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(recs[0]["characteristics"]["size"], 5);
    assert!(recs[1]["similarity"].as_f64().unwrap() < 1.0);
}

#[actix_web::test]
async fn test_form_recommendation_page() {
    let app = app!(shared_state());
    let req = test::TestRequest::post()
        .uri("/dogs/recommend")
        .set_form(TraitScores::uniform(3))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("Recommended breeds"));
    assert!(html.contains("Chihuahua"));
    assert!(html.contains("<svg"));
}

#[actix_web::test]
async fn test_form_rejects_out_of_range() {
    let app = app!(shared_state());
    let req = test::TestRequest::post()
        .uri("/dogs/recommend")
        .set_form(TraitScores::uniform(3).with(breedmatch_common::Trait::GoodAlone, 6))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("good_alone must be between 1 and 5"));
}

#[actix_web::test]
async fn test_form_rejects_missing_field() {
    let app = app!(shared_state());
    let req = test::TestRequest::post()
        .uri("/dogs/recommend")
        .set_form([("size", "3"), ("energy_level", "abc")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(html.contains("Invalid form submission"));
}

#[actix_web::test]
async fn test_html_pages_render() {
    let app = app!(shared_state());
    for uri in ["/", "/dogs/", "/dogs/home", "/dogs/form", "/dogs/breeds", "/dogs/analytics"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {}", uri);
    }

    let req = test::TestRequest::get().uri("/dogs/analytics").to_request();
    let html = String::from_utf8(test::read_body(test::call_service(&app, req).await).await.to_vec()).unwrap();
    assert!(html.contains("Energy Level"));
    assert!(html.contains("Profiles of popular breeds"));
}

#[actix_web::test]
async fn test_api_breeds_and_stats() {
    let app = app!(shared_state());

    let req = test::TestRequest::get().uri("/api/breeds").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 25);
    assert_eq!(body["breeds"][0]["breed"], "Golden Retriever");
    assert_eq!(body["breeds"][0]["trainability"], 5);

    let req = test::TestRequest::get().uri("/api/analytics/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_breeds"], 25);
    assert_eq!(body["statistics"].as_array().unwrap().len(), 9);
    assert_eq!(body["size_distribution"]["5"], 2);
}

#[actix_web::test]
async fn test_state_requires_model_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("dog_breeds_dataset.csv");
    seed_dataset().write_csv(&dataset_path).unwrap();

    let config = AppConfig {
        dataset_path: dataset_path.clone(),
        models_dir: dir.path().join("models"),
        log_dir: dir.path().join("log"),
        ..AppConfig::default()
    };
    assert!(AppState::new(config.clone()).is_err());

    let (bundle, _) = train(&seed_dataset(), &options()).unwrap();
    bundle.save(&config.models_dir).unwrap();
    let state = AppState::new(config).unwrap();
    assert_eq!(state.dataset.len(), 25);
    assert!(ModelBundle::load(&dir.path().join("models")).is_ok());
}
