use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::error::IntegrationError;
use crate::models::ModelApi;
use crate::types::{CreateModelRequest, StoredModel, UpdateModelRequest, UserInfo};

/// A non-blocking handle to an in-flight async request.
/// Call `try_recv()` each tick to check for results without blocking.
pub struct PendingRequest<T> {
    receiver: mpsc::Receiver<Result<T, IntegrationError>>,
}

impl<T> PendingRequest<T> {
    /// Non-blocking check for the result. Returns `None` if still pending.
    pub fn try_recv(&self) -> Option<Result<T, IntegrationError>> {
        self.receiver.try_recv().ok()
    }

    /// Blocking wait for the result.
    pub fn wait(self) -> Result<T, IntegrationError> {
        self.receiver
            .recv()
            .map_err(|_| IntegrationError::Network("Channel closed".into()))?
    }
}

/// Facade for all model-storage server interactions.
/// Owns a background tokio runtime and dispatches async work via channels.
pub struct IntegrationClient {
    runtime: tokio::runtime::Runtime,
    auth: Arc<AuthManager>,
    models: Arc<ModelApi>,
    online: Arc<std::sync::atomic::AtomicBool>,
}

impl IntegrationClient {
    /// Create a new integration client with a background tokio runtime. The
    /// HTTP client keeps a cookie jar because the server tracks sessions
    /// with a cookie.
    pub fn new(config: ServerConfig) -> Result<Self, IntegrationError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| IntegrationError::Network(format!("Failed to create runtime: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| {
                IntegrationError::Network(format!("Failed to create HTTP client: {}", e))
            })?;

        let auth = Arc::new(AuthManager::new(client.clone(), config.base_url.clone()));
        let models = Arc::new(ModelApi::new(client, config.base_url));

        Ok(Self {
            runtime,
            auth,
            models,
            online: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        })
    }

    /// Create an account and start a session.
    pub fn signup(&self, username: String, password: String) -> PendingRequest<UserInfo> {
        let (tx, rx) = mpsc::channel();
        let auth = Arc::clone(&self.auth);
        let online = Arc::clone(&self.online);

        self.runtime.spawn(async move {
            let result = auth.signup(username, password).await;
            track_online(&online, &result);
            let _ = tx.send(result);
        });

        PendingRequest { receiver: rx }
    }

    /// Log in with username and password.
    pub fn login(&self, username: String, password: String) -> PendingRequest<UserInfo> {
        let (tx, rx) = mpsc::channel();
        let auth = Arc::clone(&self.auth);
        let online = Arc::clone(&self.online);

        self.runtime.spawn(async move {
            let result = auth.login(username, password).await;
            track_online(&online, &result);
            let _ = tx.send(result);
        });

        PendingRequest { receiver: rx }
    }

    /// Check whether the session cookie is still valid on the server.
    pub fn check_session(&self) -> PendingRequest<Option<UserInfo>> {
        let (tx, rx) = mpsc::channel();
        let auth = Arc::clone(&self.auth);

        self.runtime.spawn(async move {
            let result = auth.check_session().await;
            let _ = tx.send(result);
        });

        PendingRequest { receiver: rx }
    }

    /// End the session.
    pub fn logout(&self) -> PendingRequest<()> {
        let (tx, rx) = mpsc::channel();
        let auth = Arc::clone(&self.auth);

        self.runtime.spawn(async move {
            let result = auth.logout().await;
            let _ = tx.send(result);
        });

        PendingRequest { receiver: rx }
    }

    /// List the authenticated user's model records.
    pub fn list_models(&self) -> PendingRequest<Vec<StoredModel>> {
        let (tx, rx) = mpsc::channel();
        let auth = Arc::clone(&self.auth);
        let api = Arc::clone(&self.models);

        self.runtime.spawn(async move {
            let result = api.list(&auth).await;
            let _ = tx.send(result);
        });

        PendingRequest { receiver: rx }
    }

    /// Fetch a specific model record by id.
    pub fn fetch_model(&self, model_id: i64) -> PendingRequest<StoredModel> {
        let (tx, rx) = mpsc::channel();
        let api = Arc::clone(&self.models);

        self.runtime.spawn(async move {
            let result = api.get(model_id).await;
            let _ = tx.send(result);
        });

        PendingRequest { receiver: rx }
    }

    /// Create a model record with its painted colors.
    pub fn create_model(&self, request: CreateModelRequest) -> PendingRequest<()> {
        let (tx, rx) = mpsc::channel();
        let api = Arc::clone(&self.models);

        self.runtime.spawn(async move {
            let result = api.create(&request).await;
            let _ = tx.send(result);
        });

        PendingRequest { receiver: rx }
    }

    /// Replace a model record's painted colors.
    pub fn update_model(&self, model_id: i64, request: UpdateModelRequest) -> PendingRequest<()> {
        let (tx, rx) = mpsc::channel();
        let api = Arc::clone(&self.models);

        self.runtime.spawn(async move {
            let result = api.update(model_id, &request).await;
            let _ = tx.send(result);
        });

        PendingRequest { receiver: rx }
    }

    /// Delete a model record.
    pub fn delete_model(&self, model_id: i64) -> PendingRequest<()> {
        let (tx, rx) = mpsc::channel();
        let api = Arc::clone(&self.models);

        self.runtime.spawn(async move {
            let result = api.delete(model_id).await;
            let _ = tx.send(result);
        });

        PendingRequest { receiver: rx }
    }

    /// Whether the server appeared reachable on the last auth request.
    pub fn is_online(&self) -> bool {
        self.online.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Whether a user is logged in as far as this client knows.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// The id of the active user, if logged in.
    pub fn user_id(&self) -> Option<i64> {
        self.auth.user_id()
    }
}

fn track_online<T>(
    online: &std::sync::atomic::AtomicBool,
    result: &Result<T, IntegrationError>,
) {
    match result {
        Ok(_) => online.store(true, std::sync::atomic::Ordering::Relaxed),
        Err(IntegrationError::Offline) => {
            online.store(false, std::sync::atomic::Ordering::Relaxed)
        }
        _ => {}
    }
}
