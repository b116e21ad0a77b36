use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use perf_core::logic::model::{ClassifierHead, ForestParams, RandomForest};
use perf_core::logic::preprocess::FittedPreprocessor;
use perf_core::logic::features::FeatureRow;
use perf_core::{
    ClassProbabilities, EngineStatus, InferenceEngine, InferenceError, PerformanceLevel,
    PredictionResult, Predictor, StudentRecord,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::{create_router, AppState};

// ============================================================================
// HELPERS
// ============================================================================

enum Behaviour {
    Probabilistic,
    LabelOnly,
    Fail,
}

/// Engine double that counts calls
struct StubEngine {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl StubEngine {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InferenceEngine for StubEngine {
    fn predict(&self, _record: &StudentRecord) -> Result<PredictionResult, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Probabilistic => Ok(PredictionResult {
                label: PerformanceLevel::Medium,
                probabilities: Some(ClassProbabilities {
                    low: 0.2,
                    medium: 0.5,
                    high: 0.3,
                }),
            }),
            Behaviour::LabelOnly => Ok(PredictionResult {
                label: PerformanceLevel::High,
                probabilities: None,
            }),
            Behaviour::Fail => Err(InferenceError::UnknownLabel("Excellent".to_string())),
        }
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            artifact_id: Some("stub".to_string()),
            feature_version: 1,
            n_trees: 3,
            classes: vec!["High".into(), "Low".into(), "Medium".into()],
            probabilistic: matches!(self.behaviour, Behaviour::Probabilistic),
            inference_count: self.calls() as u64,
            avg_latency_ms: 0.0,
        }
    }
}

fn state(engine: Arc<dyn InferenceEngine>) -> AppState {
    AppState {
        engine,
        config: Config {
            model_path: "unused.json".into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
        },
    }
}

fn example_body() -> Value {
    json!({
        "Age": 20,
        "Gender": "Male",
        "Department": "Science",
        "Sleep_Duration": 7,
        "Study_Hours": 3,
        "Social_Media_Hours": 2,
        "Physical_Activity": 60,
        "Stress_Level": 5
    })
}

/// Typical engineering student used by the end-to-end flow
fn engineering_student_body() -> Value {
    json!({
        "Age": 21,
        "Gender": "Male",
        "Department": "Engineering",
        "Sleep_Duration": 7.5,
        "Study_Hours": 3.0,
        "Social_Media_Hours": 3.0,
        "Physical_Activity": 60,
        "Stress_Level": 4
    })
}

async fn post_json(engine: Arc<dyn InferenceEngine>, body: String) -> Response {
    let req = Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    create_router(state(engine)).oneshot(req).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Small real predictor: preprocessor + forest fitted on a handful of students
fn trained_predictor() -> Predictor {
    let students = [
        ("Male", "Science", 1.0, 8.0, "Low"),
        ("Female", "Business", 1.5, 9.0, "Low"),
        ("Male", "Medical", 4.0, 5.0, "Medium"),
        ("Female", "Engineering", 4.5, 6.0, "Medium"),
        ("Male", "Science", 8.0, 2.0, "High"),
        ("Female", "Medical", 7.5, 3.0, "High"),
    ];
    let rows: Vec<FeatureRow> = students
        .iter()
        .map(|(gender, department, study, stress, _)| {
            StudentRecord {
                age: 20.0,
                gender: gender.to_string(),
                department: department.to_string(),
                sleep_duration: 7.0,
                study_hours: *study,
                social_media_hours: 2.0,
                physical_activity: 60.0,
                stress_level: *stress,
            }
            .to_feature_row()
        })
        .collect();
    let refs: Vec<&FeatureRow> = rows.iter().collect();
    let labels: Vec<&str> = students.iter().map(|s| s.4).collect();

    let preprocessor = FittedPreprocessor::fit(&refs).unwrap();
    let x = preprocessor.transform(&refs).unwrap();
    let params = ForestParams {
        n_trees: 15,
        ..ForestParams::default()
    };
    let forest = RandomForest::fit(x.view(), &labels, params).unwrap();
    Predictor::new(preprocessor, ClassifierHead::Probabilistic(Box::new(forest))).unwrap()
}

// ============================================================================
// POST /predict
// ============================================================================

#[tokio::test]
async fn test_predict_returns_label_and_probabilities() {
    let engine = StubEngine::new(Behaviour::Probabilistic);
    let resp = post_json(engine.clone(), example_body().to_string()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["predicted_profile"], "Medium");
    assert_eq!(body["probabilities"], json!({"Low": 0.2, "Medium": 0.5, "High": 0.3}));
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn test_label_only_engine_yields_null_probabilities() {
    let engine = StubEngine::new(Behaviour::LabelOnly);
    let resp = post_json(engine, example_body().to_string()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["predicted_profile"], "High");
    assert!(body["probabilities"].is_null());
    assert!(body.as_object().unwrap().contains_key("probabilities"));
}

#[tokio::test]
async fn test_out_of_bounds_fields_are_rejected_before_the_model() {
    let cases = [
        ("Age", json!(-1)),
        ("Age", json!(121)),
        ("Sleep_Duration", json!(24.5)),
        ("Study_Hours", json!(-0.1)),
        ("Social_Media_Hours", json!(25)),
        ("Physical_Activity", json!(301)),
        ("Stress_Level", json!(0)),
        ("Stress_Level", json!(11)),
    ];

    for (field, value) in cases {
        let engine = StubEngine::new(Behaviour::Probabilistic);
        let mut body = example_body();
        body[field] = value.clone();

        let resp = post_json(engine.clone(), body.to_string()).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{} = {}", field, value);
        let err = json_body(resp).await;
        assert_eq!(err["status"], 422);
        let message = err["error"].as_str().unwrap().to_lowercase();
        assert!(message.contains(&field.to_lowercase()), "{}", err);
        assert_eq!(engine.calls(), 0);
    }
}

#[tokio::test]
async fn test_bounds_are_inclusive() {
    let engine = StubEngine::new(Behaviour::Probabilistic);
    let mut body = example_body();
    body["Age"] = json!(120);
    body["Sleep_Duration"] = json!(0);
    body["Physical_Activity"] = json!(300);
    body["Stress_Level"] = json!(1);

    let resp = post_json(engine.clone(), body.to_string()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn test_missing_stress_level_is_rejected() {
    let engine = StubEngine::new(Behaviour::Probabilistic);
    let mut body = example_body();
    body.as_object_mut().unwrap().remove("Stress_Level");

    let resp = post_json(engine.clone(), body.to_string()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_schema_violations_are_unprocessable() {
    let mut unknown_gender = example_body();
    unknown_gender["Gender"] = json!("Other");

    let mut unknown_department = example_body();
    unknown_department["Department"] = json!("Law");

    let mut extra_field = example_body();
    extra_field["GPA"] = json!(3.2);

    let mut wrong_type = example_body();
    wrong_type["Age"] = json!("twenty");

    for body in [unknown_gender, unknown_department, extra_field, wrong_type] {
        let engine = StubEngine::new(Behaviour::Probabilistic);
        let resp = post_json(engine.clone(), body.to_string()).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
        assert_eq!(engine.calls(), 0);
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let engine = StubEngine::new(Behaviour::Probabilistic);
    let resp = post_json(engine.clone(), "{\"Age\": 20,".to_string()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["status"], 400);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_missing_content_type_is_unsupported() {
    let engine = StubEngine::new(Behaviour::Probabilistic);
    let req = Request::post("/predict")
        .body(Body::from(example_body().to_string()))
        .unwrap();
    let resp = create_router(state(engine.clone())).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_model_failure_is_internal_error() {
    let engine = StubEngine::new(Behaviour::Fail);
    let resp = post_json(engine.clone(), example_body().to_string()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["status"], 500);
    assert!(body["error"].as_str().unwrap().starts_with("prediction error: "));
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn test_end_to_end_with_trained_predictor() {
    let engine: Arc<dyn InferenceEngine> = Arc::new(trained_predictor());

    let first = json_body(post_json(engine.clone(), engineering_student_body().to_string()).await).await;
    let label = first["predicted_profile"].as_str().unwrap();
    assert!(["Low", "Medium", "High"].contains(&label));

    let probabilities = first["probabilities"].as_object().unwrap();
    assert_eq!(probabilities.len(), 3);
    let mut sum = 0.0;
    for level in ["Low", "Medium", "High"] {
        let p = probabilities[level].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&p));
        sum += p;
    }
    assert!((sum - 1.0).abs() <= 0.01);

    // Same record, same answer
    let second = json_body(post_json(engine.clone(), engineering_student_body().to_string()).await).await;
    assert_eq!(first, second);
    assert_eq!(engine.status().inference_count, 2);
}

// ============================================================================
// GET / and /health
// ============================================================================

#[tokio::test]
async fn test_index_serves_form() {
    let engine = StubEngine::new(Behaviour::Probabilistic);
    let req = Request::get("/").body(Body::empty()).unwrap();
    let resp = create_router(state(engine)).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("<form"));
    assert!(html.contains("/predict"));
}

#[tokio::test]
async fn test_health_reports_engine_status() {
    let engine = StubEngine::new(Behaviour::Probabilistic);
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let resp = create_router(state(engine)).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["artifact_id"], "stub");
    assert_eq!(body["n_trees"], 3);
    assert_eq!(body["environment"], "test");
}

#[test]
fn test_request_enums_match_feature_vocabulary() {
    use crate::models::prediction::{Department, Gender};
    use perf_core::logic::features::{DEPARTMENT_VALUES, GENDER_VALUES};

    let genders = [Gender::Male, Gender::Female];
    assert_eq!(genders.len(), GENDER_VALUES.len());
    for g in genders {
        assert!(GENDER_VALUES.contains(&g.as_str()));
    }

    let departments = [
        Department::Business,
        Department::Engineering,
        Department::Medical,
        Department::Science,
    ];
    assert_eq!(departments.len(), DEPARTMENT_VALUES.len());
    for d in departments {
        assert!(DEPARTMENT_VALUES.contains(&d.as_str()));
    }
}
