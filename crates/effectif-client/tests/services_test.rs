//! Service tests against a locally spawned mock backend

use effectif_client::proto::{
    Groupement, GroupementUpdate, Habilitation, NewPersonne, PersonneUpdate, Team, TeamAssignment,
    TeamUpdate, User, UNKNOWN_NAME, UNKNOWN_SURNAME,
};
use effectif_client::{ApiClient, ApiError, ClientConfig};
use effectif_mock_backend::MockBackend;
use serde_json::json;

async fn setup(backend: &MockBackend) -> ApiClient {
    let addr = backend.spawn().await.expect("mock backend should bind");
    ApiClient::new(ClientConfig::new(format!("http://{}", addr))).expect("client should build")
}

#[tokio::test]
async fn test_team_create_then_list_and_get_agree() {
    let backend = MockBackend::new();
    backend.seed_groupement("G1", "Groupement Nord", None);
    let client = setup(&backend).await;

    let team = Team::new("EQ010", "QA")
        .with_description("Qualité")
        .with_groupement("G1");
    let created = client.teams().create(&team).await.unwrap();
    assert_eq!(created.code, "EQ010");
    assert!(created.members.is_empty());

    let listed = client.teams().list().await.unwrap();
    let fetched = client.teams().get_by_key("EQ010").await.unwrap();
    assert_eq!(listed, vec![fetched.clone()]);

    let groupement = fetched.groupement.expect("groupement should be resolved");
    assert_eq!(groupement.id, "G1");
    assert_eq!(groupement.name, "Groupement Nord");

    let post = backend
        .requests()
        .into_iter()
        .find(|r| r.method == "POST")
        .unwrap();
    assert_eq!(post.path, "/equipes");
    assert_eq!(
        post.body,
        Some(json!({
            "code": "EQ010",
            "nom": "QA",
            "description": "Qualité",
            "groupementCode": "G1"
        }))
    );
}

#[tokio::test]
async fn test_get_by_key_on_missing_record_is_not_found() {
    let backend = MockBackend::new();
    let client = setup(&backend).await;

    let team = client.teams().get_by_key("NOPE").await.unwrap_err();
    let groupement = client.groupements().get_by_key("NOPE").await.unwrap_err();
    let personne = client.personnes().get_by_key("NOPE").await.unwrap_err();
    let user = client.users().get_by_key("NOPE").await.unwrap_err();

    for err in [team, groupement, personne, user] {
        assert!(err.is_not_found(), "unexpected error: {}", err);
    }
}

#[tokio::test]
async fn test_update_bodies_never_carry_the_key() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;

    client
        .teams()
        .update(
            "EQ001",
            &TeamUpdate {
                name: Some("Dev".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    client
        .groupements()
        .update(
            "G1",
            &GroupementUpdate {
                label: "Nord-Est".to_string(),
                direction: None,
            },
        )
        .await
        .unwrap();
    client
        .personnes()
        .update(
            "EMP12345",
            &PersonneUpdate {
                role: Some("Lead".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let puts: Vec<_> = backend
        .requests()
        .into_iter()
        .filter(|r| r.method == "PUT")
        .collect();
    assert_eq!(puts.len(), 3);
    for put in puts {
        let body = put.body.expect("update should send a body");
        for key in ["code", "identifiant", "matricule"] {
            assert!(body.get(key).is_none(), "{} leaked into {}", key, put.path);
        }
    }
}

#[tokio::test]
async fn test_server_error_surfaces_as_status() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;
    backend.fail_with(Some(500));

    let err = client.teams().list().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "API error 500");

    let err = client.groupements().get_by_key("G1").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(ClientConfig::new(format!("http://{}", addr))).unwrap();
    let err = client.personnes().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_groupement_crud() {
    let backend = MockBackend::new();
    let client = setup(&backend).await;

    let groupement = Groupement {
        code: "G7".to_string(),
        label: "Ouest".to_string(),
        direction: Some("DSI".to_string()),
    };
    client.groupements().create(&groupement).await.unwrap();
    assert_eq!(client.groupements().list().await.unwrap(), vec![groupement]);

    client.groupements().delete("G7").await.unwrap();
    assert!(client.groupements().list().await.unwrap().is_empty());

    let err = client.groupements().delete("G7").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_personne_create_and_team_assignment() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;

    let created = client
        .personnes()
        .create(&NewPersonne {
            identifier: "EMP99999".to_string(),
            name: "Martin".to_string(),
            surname: "Alice".to_string(),
            role: Some("Testeuse".to_string()),
            team_code: Some("EQ002".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(created.team_code(), Some("EQ002"));

    let cleared = client
        .personnes()
        .update(
            "EMP99999",
            &PersonneUpdate {
                team: TeamAssignment::from_form(Some("none")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.team.is_none());
    assert_eq!(cleared.name, "Martin");
}

#[tokio::test]
async fn test_add_and_remove_member() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;

    let available = client.teams().available_members("EQ001").await.unwrap();
    let identifiers: Vec<_> = available.iter().map(|p| p.identifier.as_str()).collect();
    assert_eq!(identifiers, vec!["EMP54321"]);

    client.teams().add_member("EQ001", "EMP54321").await.unwrap();
    let team = client.teams().get_by_key("EQ001").await.unwrap();
    assert!(team.has_member("EMP54321"));
    assert_eq!(team.members.len(), 3);

    client.teams().remove_member("EMP12345").await.unwrap();
    let team = client.teams().get_by_key("EQ001").await.unwrap();
    assert!(!team.has_member("EMP12345"));
}

#[tokio::test]
async fn test_user_list_joins_personnes_with_placeholders() {
    let backend = MockBackend::with_demo_data();
    backend.seed_utilisateur("EXT00001", &["READ"]);
    let client = setup(&backend).await;

    let users = client.users().list().await.unwrap();
    assert_eq!(users.len(), 3);

    let john = users.iter().find(|u| u.matricule == "EMP12345").unwrap();
    assert_eq!(john.name, "Doe");
    assert_eq!(john.surname, "John");
    assert_eq!(john.habilitations.len(), 3);

    let external = users.iter().find(|u| u.matricule == "EXT00001").unwrap();
    assert_eq!(external.name, UNKNOWN_NAME);
    assert_eq!(external.surname, UNKNOWN_SURNAME);

    let single = client.users().get_by_key("EXT00001").await.unwrap();
    assert_eq!(&single, external);
}

#[tokio::test]
async fn test_user_list_fails_on_backend_error() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;
    backend.fail_with(Some(502));

    let err = client.users().list().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_user_list_fails_when_personnes_fetch_fails() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;
    backend.fail_path("/personnes", Some(500));

    let err = client.users().list().await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let paths: Vec<_> = backend.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/utilisateurs", "/personnes"]);
}

#[tokio::test]
async fn test_user_get_fails_when_personne_fetch_fails() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;
    backend.fail_path("/personnes/EMP12345", Some(503));

    let err = client.users().get_by_key("EMP12345").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_user_save_sends_no_write_when_existence_check_fails() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;
    backend.fail_path("/utilisateurs/EMP67890", Some(500));

    let user = User {
        matricule: "EMP67890".to_string(),
        name: "Smith".to_string(),
        surname: "Jane".to_string(),
        habilitations: vec![Habilitation::new("ADMIN")],
    };
    let err = client.users().save(&user).await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert!(requests
        .iter()
        .all(|r| r.method != "POST" && r.method != "PUT"));
}

#[tokio::test]
async fn test_user_save_posts_new_and_puts_existing() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;

    let mut user = User {
        matricule: "EMP54321".to_string(),
        name: "Johnson".to_string(),
        surname: "Michael".to_string(),
        habilitations: vec![Habilitation::new("READ")],
    };
    let users = client.users().save(&user).await.unwrap();
    assert_eq!(users.len(), 3);

    user.habilitations.push(Habilitation::new("WRITE"));
    let users = client.users().save(&user).await.unwrap();
    let saved = users.iter().find(|u| u.matricule == "EMP54321").unwrap();
    assert_eq!(saved.habilitation_codes(), vec!["READ", "WRITE"]);

    let writes: Vec<_> = backend
        .requests()
        .into_iter()
        .filter(|r| r.method == "POST" || r.method == "PUT")
        .collect();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].method, "POST");
    assert_eq!(
        writes[0].body,
        Some(json!({"matricule": "EMP54321", "habilitationsIds": ["READ"]}))
    );
    assert_eq!(writes[1].method, "PUT");
    assert_eq!(writes[1].path, "/utilisateurs/EMP54321");
    assert_eq!(
        writes[1].body,
        Some(json!({"habilitationsIds": ["READ", "WRITE"]}))
    );
}

#[tokio::test]
async fn test_authorization_record() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;

    let authorized = client.users().get_authorization("EMP67890").await.unwrap();
    assert!(authorized.has_habilitation("READ"));
    assert!(!authorized.has_habilitation("ADMIN"));
}

#[tokio::test]
async fn test_keys_with_reserved_characters_stay_in_their_segment() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;

    let err = client.teams().delete("EQ001#old").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
    let err = client.teams().get_by_key("EQ001#old").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
    assert!(client.teams().get_by_key("EQ001").await.is_ok());

    let err = client.personnes().get_by_key("EMP12345?x=1").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
    let err = client.groupements().delete("G1/../G2").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
    assert_eq!(client.groupements().list().await.unwrap().len(), 2);

    let err = client.users().get_authorization("EMP12345#x").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);

    let delete = backend
        .requests()
        .into_iter()
        .find(|r| r.method == "DELETE")
        .unwrap();
    assert_eq!(delete.path, "/equipes/EQ001%23old");
}

#[tokio::test]
async fn test_dot_segments_never_leave_the_resource() {
    let backend = MockBackend::with_demo_data();
    let client = setup(&backend).await;

    for key in ["", ".", ".."] {
        let err = client.personnes().delete(key).await.unwrap_err();
        assert!(err.is_not_found(), "{:?} gave {}", key, err);
    }
    assert!(backend.requests().is_empty());
    assert_eq!(client.personnes().list().await.unwrap().len(), 3);
}
