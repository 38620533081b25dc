// ── Console ──
//
// Entry point for consumers. Owns the API client, the optional upload
// client, the query cache and the authentication state. Reads go through
// the cache (see `hooks`); writes go through `run_mutation` or `execute`
// so the right key families are invalidated once they succeed.

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use solarboard_api::{AdminUser, ApiClient, SessionStore, TransportConfig, UploadClient};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{ConsoleConfig, QueryTiming};
use crate::error::CoreError;
use crate::query::{MutationDescriptor, QueryCache, QueryKey, keys};
use crate::session::{AuthState, SessionGuard};
use crate::stream::QueryStream;

/// Cheaply cloneable handle to the admin console's data layer.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    api: ApiClient,
    uploader: Option<UploadClient>,
    cache: QueryCache,
    auth_state: Arc<watch::Sender<AuthState>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("auth_state", &*self.inner.auth_state.borrow())
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Build a console around `store`.
    ///
    /// The store is wrapped so that clearing the session (logout, or any
    /// HTTP 401) also purges the query cache. A session already present
    /// in the store marks the console authenticated.
    pub fn new(config: ConsoleConfig, store: Arc<dyn SessionStore>) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let cache = QueryCache::new();
        let (auth_state, _) = watch::channel(AuthState::Anonymous);
        let auth_state = Arc::new(auth_state);

        let existing = store.load().filter(|s| s.logged_in);
        let guarded: Arc<dyn SessionStore> =
            Arc::new(SessionGuard::new(store, cache.clone(), Arc::clone(&auth_state)));

        let api = ApiClient::new(config.api_url.clone(), guarded, &transport)?;
        let uploader = config
            .upload
            .as_ref()
            .map(|u| UploadClient::new(u.endpoint.clone(), u.api_key.expose_secret(), &transport))
            .transpose()?;

        if let Some(session) = existing {
            debug!(user_id = %session.user_id, "restored session");
            auth_state.send_replace(AuthState::Authenticated {
                user_id: session.user_id.clone(),
            });
            cache.set_query_data(&keys::AUTH.user(), session.user);
        }

        Ok(Self {
            inner: Arc::new(ConsoleInner {
                config,
                api,
                uploader,
                cache,
                auth_state,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    /// The underlying API client. Calls made on it bypass the cache.
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub(crate) fn uploader(&self) -> Result<&UploadClient, CoreError> {
        self.inner.uploader.as_ref().ok_or_else(|| CoreError::Config {
            message: "image uploads are not configured (set upload_url and an upload key)".into(),
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn background tasks (cache garbage collection).
    pub async fn start(&self) {
        let Some(interval) = self.inner.config.gc_interval else {
            return;
        };
        let handle = self
            .inner
            .cache
            .spawn_gc(interval, self.inner.cancel.child_token());
        self.inner.task_handles.lock().await.push(handle);
        debug!(?interval, "background gc started");
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("console shut down");
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in and seed the `auth/user` query with the returned profile.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Arc<AdminUser>, CoreError> {
        let session = self.inner.api.login(email, password).await?;
        self.inner
            .cache
            .set_query_data(&keys::AUTH.user(), session.user.clone());
        info!(user_id = %session.user_id, "console authenticated");
        Ok(Arc::new(session.user))
    }

    /// Clear the session and purge every cached query.
    pub fn logout(&self) {
        self.inner.api.logout();
    }

    pub fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.inner.auth_state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.auth_state.borrow().is_authenticated()
    }

    /// The signed-in admin, from the cache or the persisted session.
    pub fn current_user(&self) -> Option<Arc<AdminUser>> {
        self.inner
            .cache
            .get_query_data::<AdminUser>(&keys::AUTH.user())
            .or_else(|| self.inner.api.session().load().map(|s| Arc::new(s.user)))
    }

    pub(crate) fn require_login(&self) -> Result<(), CoreError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(CoreError::NotLoggedIn)
        }
    }

    // ── Cache plumbing ───────────────────────────────────────────────

    /// Mark `prefix` and everything under it stale.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.inner.cache.invalidate(prefix)
    }

    pub(crate) async fn query<T, F, Fut>(
        &self,
        key: &QueryKey,
        timing: QueryTiming,
        call: F,
    ) -> Result<Arc<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: Fn(ApiClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, solarboard_api::Error>> + Send + 'static,
    {
        self.inner.cache.fetch(key, timing, self.bind(call)).await
    }

    pub(crate) async fn refetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        timing: QueryTiming,
        call: F,
    ) -> Result<Arc<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: Fn(ApiClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, solarboard_api::Error>> + Send + 'static,
    {
        self.inner.cache.refetch(key, timing, self.bind(call)).await
    }

    pub(crate) fn watch<T, F, Fut>(&self, key: &QueryKey, timing: QueryTiming, call: F) -> QueryStream<T>
    where
        T: Send + Sync + 'static,
        F: Fn(ApiClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, solarboard_api::Error>> + Send + 'static,
    {
        self.inner.cache.subscribe(key, timing, self.bind(call))
    }

    /// Turn an API call into a cache fetcher bound to this console's client.
    fn bind<T, F, Fut>(
        &self,
        call: F,
    ) -> impl Fn() -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync + 'static
    where
        T: Send + Sync + 'static,
        F: Fn(ApiClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, solarboard_api::Error>> + Send + 'static,
    {
        let api = self.inner.api.clone();
        move || {
            let fut = call(api.clone());
            async move { fut.await.map_err(CoreError::from) }.boxed()
        }
    }

    /// Run a write and, only if it succeeds, invalidate what it names.
    pub(crate) async fn run_mutation<T, Fut>(
        &self,
        descriptor: MutationDescriptor,
        write: Fut,
    ) -> Result<T, CoreError>
    where
        Fut: Future<Output = Result<T, solarboard_api::Error>>,
    {
        let value = match write.await {
            Ok(value) => value,
            Err(e) => {
                debug!(mutation = descriptor.name, error = %e, "mutation failed");
                return Err(e.into());
            }
        };

        for prefix in &descriptor.invalidates {
            self.inner.cache.invalidate(prefix);
        }
        debug!(mutation = descriptor.name, "mutation applied");
        Ok(value)
    }
}

fn build_transport(config: &ConsoleConfig) -> TransportConfig {
    TransportConfig {
        tls: config.tls.clone(),
        timeout: config.timeout,
    }
}
