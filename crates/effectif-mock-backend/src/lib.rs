//! In-memory personnel backend
//!
//! Serves the `/equipes`, `/groupements`, `/personnes` and `/utilisateurs` resources with
//! the same JSON shapes as the real backend. Every request is recorded so that callers
//! can inspect the bodies that were sent, and a status code can be forced to simulate
//! backend failures.

pub mod handlers;
pub mod middleware;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};
use effectif_proto::wire::ApiGroupement;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use handlers::ErrorResponse;
pub use state::{BackendState, RecordedRequest};

use state::{StoredEquipe, StoredPersonne};

/// Handle on a mock backend; clones share the same data
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<BackendState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend preloaded with a small organisation
    pub fn with_demo_data() -> Self {
        let backend = Self::new();
        backend.seed_demo();
        backend
    }

    pub fn build_router(&self) -> Router {
        Router::new()
            .route(
                "/groupements",
                get(handlers::list_groupements).post(handlers::create_groupement),
            )
            .route(
                "/groupements/{code}",
                get(handlers::get_groupement)
                    .put(handlers::update_groupement)
                    .delete(handlers::delete_groupement),
            )
            .route(
                "/equipes",
                get(handlers::list_equipes).post(handlers::create_equipe),
            )
            .route(
                "/equipes/{code}",
                get(handlers::get_equipe)
                    .put(handlers::update_equipe)
                    .delete(handlers::delete_equipe),
            )
            .route(
                "/personnes",
                get(handlers::list_personnes).post(handlers::create_personne),
            )
            .route(
                "/personnes/{identifiant}",
                get(handlers::get_personne)
                    .put(handlers::update_personne)
                    .delete(handlers::delete_personne),
            )
            .route(
                "/utilisateurs",
                get(handlers::list_utilisateurs).post(handlers::create_utilisateur),
            )
            .route(
                "/utilisateurs/{matricule}",
                get(handlers::get_utilisateur)
                    .put(handlers::update_utilisateur)
                    .delete(handlers::delete_utilisateur),
            )
            .layer(axum_middleware::from_fn_with_state(
                self.state.clone(),
                middleware::record_and_inject,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until the task is dropped
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!("Mock backend listening on http://{}", addr);
        }
        axum::serve(listener, self.build_router()).await
    }

    /// Bind an ephemeral local port and serve in the background
    pub async fn spawn(&self) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let backend = self.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.serve(listener).await {
                error!("Mock backend stopped: {}", e);
            }
        });
        Ok(addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests()
    }

    pub fn clear_requests(&self) {
        self.state.clear_requests();
    }

    /// Answer every following request with `status`; `None` restores normal service
    pub fn fail_with(&self, status: Option<u16>) {
        self.state.set_forced_status(status);
    }

    /// Answer requests for exactly `path`, whatever the method, with `status`
    pub fn fail_path(&self, path: &str, status: Option<u16>) {
        self.state.set_path_failure(path, status);
    }

    pub fn seed_groupement(&self, code: &str, libelle: &str, direction: Option<&str>) {
        self.state.data().groupements.insert(
            code.to_string(),
            ApiGroupement {
                code: code.to_string(),
                libelle: libelle.to_string(),
                direction: direction.map(str::to_string),
            },
        );
    }

    pub fn seed_equipe(
        &self,
        code: &str,
        nom: &str,
        description: Option<&str>,
        groupement_code: Option<&str>,
    ) {
        self.state.data().equipes.insert(
            code.to_string(),
            StoredEquipe {
                code: code.to_string(),
                nom: nom.to_string(),
                description: description.map(str::to_string),
                groupement_code: groupement_code.map(str::to_string),
            },
        );
    }

    pub fn seed_personne(
        &self,
        identifiant: &str,
        nom: &str,
        prenom: &str,
        poste: Option<&str>,
        equipe_code: Option<&str>,
    ) {
        self.state.data().personnes.insert(
            identifiant.to_string(),
            StoredPersonne {
                identifiant: identifiant.to_string(),
                nom: nom.to_string(),
                prenom: prenom.to_string(),
                poste: poste.map(str::to_string),
                equipe_code: equipe_code.map(str::to_string),
            },
        );
    }

    pub fn seed_habilitation(&self, code: &str, description: &str) {
        self.state
            .data()
            .habilitations
            .insert(code.to_string(), description.to_string());
    }

    pub fn seed_utilisateur(&self, matricule: &str, habilitations: &[&str]) {
        self.state.data().utilisateurs.insert(
            matricule.to_string(),
            habilitations.iter().map(|c| c.to_string()).collect(),
        );
    }

    pub fn seed_demo(&self) {
        self.seed_groupement("G1", "Groupement Nord", Some("Direction Technique"));
        self.seed_groupement("G2", "Groupement Sud", Some("Direction Technique"));

        self.seed_equipe("EQ001", "Développement", Some("Équipe de développement"), Some("G1"));
        self.seed_equipe("EQ002", "Infrastructure", Some("Équipe infrastructure"), Some("G2"));

        self.seed_personne("EMP12345", "Doe", "John", Some("Développeur"), Some("EQ001"));
        self.seed_personne("EMP67890", "Smith", "Jane", Some("Chef de projet"), Some("EQ001"));
        self.seed_personne("EMP54321", "Johnson", "Michael", Some("Administrateur"), None);

        self.seed_habilitation("ADMIN", "Administration");
        self.seed_habilitation("READ", "Lecture");
        self.seed_habilitation("WRITE", "Écriture");

        self.seed_utilisateur("EMP12345", &["ADMIN", "READ", "WRITE"]);
        self.seed_utilisateur("EMP67890", &["READ"]);
    }
}
