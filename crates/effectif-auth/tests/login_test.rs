//! Login flow against a spawned mock backend

use std::sync::Arc;

use effectif_auth::{AuthError, AuthService, FileSessionStorage, SessionStorage};
use effectif_client::{ApiClient, ClientConfig};
use effectif_mock_backend::MockBackend;
use tempfile::TempDir;

async fn setup(backend: &MockBackend, storage: Arc<FileSessionStorage>) -> AuthService {
    let addr = backend.spawn().await.unwrap();
    let client = ApiClient::new(ClientConfig::new(format!("http://{}", addr))).unwrap();
    AuthService::new(Arc::new(client.users()), storage)
}

#[tokio::test]
async fn test_login_persists_session_file() {
    let backend = MockBackend::with_demo_data();
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSessionStorage::new(dir.path().join("session.json")));
    let auth = setup(&backend, storage.clone()).await;

    let session = auth.authenticate("EMP67890").await.unwrap();
    assert!(session.has_habilitation("READ"));
    assert!(storage.path().exists());

    // A fresh service over the same file sees the session
    let reloaded = FileSessionStorage::new(storage.path()).load().unwrap();
    assert_eq!(reloaded, Some(session.clone()));

    auth.logout(session).unwrap();
    assert!(!storage.path().exists());
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn test_login_unknown_matricule() {
    let backend = MockBackend::with_demo_data();
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSessionStorage::new(dir.path().join("session.json")));
    let auth = setup(&backend, storage.clone()).await;

    let err = auth.authenticate("EMP00000").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound(_)));
    assert!(!storage.path().exists());
}

#[tokio::test]
async fn test_login_with_suffixed_matricule_is_refused() {
    let backend = MockBackend::with_demo_data();
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSessionStorage::new(dir.path().join("session.json")));
    let auth = setup(&backend, storage.clone()).await;

    for input in ["EMP12345#x", "EMP12345?admin=1", "EMP12345/.."] {
        let err = auth.authenticate(input).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound(ref m) if m == input), "{}", err);
    }
    assert!(!storage.path().exists());
}

#[tokio::test]
async fn test_blank_login_sends_no_request() {
    let backend = MockBackend::with_demo_data();
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSessionStorage::new(dir.path().join("session.json")));
    let auth = setup(&backend, storage).await;

    let err = auth.authenticate("").await.unwrap_err();
    assert!(matches!(err, AuthError::MissingIdentifier));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_backend_error_is_not_user_not_found() {
    let backend = MockBackend::with_demo_data();
    backend.fail_with(Some(500));
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSessionStorage::new(dir.path().join("session.json")));
    let auth = setup(&backend, storage).await;

    let err = auth.authenticate("EMP12345").await.unwrap_err();
    assert!(matches!(err, AuthError::Backend(_)));
}
