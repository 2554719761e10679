//! Remote-backend behavior, driven through libsql's local-file mode.
//!
//! These live in their own test binary: libsql configures SQLite's global
//! threading mode once per process, and that configuration fails if a
//! rusqlite connection (the embedded-backend tests) has already touched the
//! library. Keeping the two clients in separate processes keeps both suites
//! green.

use fleetdb::storage::{Backend, RemoteBackend};
use fleetdb::SqlValue;

async fn local_backend(dir: &tempfile::TempDir) -> RemoteBackend {
    RemoteBackend::open_local(dir.path().join("fleet.db"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_result_shape_matches_embedded_backend() {
    let dir = tempfile::tempdir().unwrap();
    let backend = local_backend(&dir).await;
    backend.initialize().await.unwrap();

    let result = backend
        .exec("SELECT id, model FROM vehicles", &[])
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].columns, vec!["id", "model"]);
    assert_eq!(result[0].values.len(), 4);
    for tuple in &result[0].values {
        assert_eq!(tuple.len(), 2);
    }
}

#[tokio::test]
async fn test_repeated_initialize_does_not_duplicate_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let backend = local_backend(&dir).await;
    backend.initialize().await.unwrap();
    backend.initialize().await.unwrap();

    let drivers = backend
        .exec("SELECT COUNT(*) FROM drivers", &[])
        .await
        .unwrap();
    assert_eq!(drivers[0].values, vec![vec![SqlValue::Integer(2)]]);
    let users = backend
        .exec("SELECT COUNT(*) FROM users", &[])
        .await
        .unwrap();
    assert_eq!(users[0].values, vec![vec![SqlValue::Integer(1)]]);
}

#[tokio::test]
async fn test_run_reports_last_insert_id() {
    let dir = tempfile::tempdir().unwrap();
    let backend = local_backend(&dir).await;
    backend.initialize().await.unwrap();

    let outcome = backend
        .run(
            "INSERT INTO history (vehicleId, driverId) VALUES (?, ?)",
            &["QKI7G71".into(), "1".into()],
        )
        .await
        .unwrap();
    assert_eq!(outcome.rows_affected, 1);
    assert_eq!(outcome.last_insert_id, 1);
}

#[tokio::test]
async fn test_bound_parameters_filter_rows() {
    let dir = tempfile::tempdir().unwrap();
    let backend = local_backend(&dir).await;
    backend.initialize().await.unwrap();

    let result = backend
        .exec(
            "SELECT model FROM vehicles WHERE id = ?",
            &["RSB7C87".into()],
        )
        .await
        .unwrap();
    assert_eq!(
        result[0].values,
        vec![vec![SqlValue::Text("NISSAN VERSA".into())]]
    );
}

#[tokio::test]
async fn test_persist_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let backend = local_backend(&dir).await;
    backend.initialize().await.unwrap();
    backend.persist().await.unwrap();
}
