//! Shared fixtures for myp-api integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use axum::body::Body;
use axum::http::Request;
use myp_api::{build_router, AppState};
use myp_common::features::canonical_names;
use myp_common::forest::{ForestParams, Node, RandomForest, RegressionTree};
use myp_common::{ArtifactPaths, ModelArtifact, ModelMetrics};
use serde_json::{json, Value};

pub const TEST_RMSE: f64 = 14.69;

pub fn canonical() -> Vec<String> {
    canonical_names().map(String::from).collect()
}

pub fn metrics() -> ModelMetrics {
    ModelMetrics {
        r2_score: 0.6804,
        mae: 10.72,
        rmse: TEST_RMSE,
        n_train: 800,
        n_test: 200,
    }
}

/// One-tree forest: position 0 at or below 0.5 gives 1950, above gives 2000
pub fn split_forest(n_features: usize) -> RandomForest {
    let tree = RegressionTree::from_nodes(
        vec![
            Node::Split {
                feature: 0,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: 1950.0 },
            Node::Leaf { value: 2000.0 },
        ],
        n_features,
    )
    .unwrap();
    RandomForest::from_trees(n_features, vec![tree]).unwrap()
}

/// Two single-leaf trees whose sum overflows to infinity
pub fn overflowing_forest(n_features: usize) -> RandomForest {
    let trees = (0..2)
        .map(|_| RegressionTree::from_nodes(vec![Node::Leaf { value: 1.7e308 }], n_features))
        .collect::<myp_common::Result<Vec<_>>>()
        .unwrap();
    RandomForest::from_trees(n_features, trees).unwrap()
}

/// Write both artifacts for `names` into `dir`
pub fn write_artifacts(dir: &Path, names: Vec<String>) -> ArtifactPaths {
    let forest = split_forest(names.len());
    write_forest(dir, names, forest)
}

/// Write both artifacts for an explicit forest into `dir`
pub fn write_forest(dir: &Path, names: Vec<String>, forest: RandomForest) -> ArtifactPaths {
    let paths = ArtifactPaths::new(
        dir.join("models/music_year_model.json"),
        dir.join("models/feature_names.json"),
    );
    let artifact = ModelArtifact::new(names, vec![], metrics(), ForestParams::default(), forest);
    paths.save(&artifact).unwrap();
    paths
}

/// Paths inside `dir` where nothing has been written
pub fn missing_artifacts(dir: &Path) -> ArtifactPaths {
    ArtifactPaths::new(dir.join("models/absent.json"), dir.join("models/absent_names.json"))
}

pub fn write_index(static_dir: &Path) {
    fs::create_dir_all(static_dir).unwrap();
    fs::write(static_dir.join("index.html"), "<html><body>myp</body></html>").unwrap();
    fs::write(static_dir.join("style.css"), "body { margin: 0; }").unwrap();
}

pub fn setup_app(paths: &ArtifactPaths, static_dir: &Path) -> axum::Router {
    build_router(AppState::load(paths, static_dir.to_path_buf()))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// POST with no content-type header
pub fn post_untyped(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Example input from the README-style request
pub fn reference_song() -> Value {
    json!({
        "acousticness": 0.0936,
        "danceability": 0.743,
        "energy": 0.47,
        "instrumentalness": 0.0000315,
        "liveness": 0.186,
        "loudness": -13.154,
        "speechiness": 0.029,
        "tempo": 116.122,
        "valence": 0.89,
        "duration_ms": 160333,
        "key": 0,
        "mode": 1
    })
}
