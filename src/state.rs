//! Application State
//!
//! Process-wide state constructed once at startup, containing all services.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use flora_lens_core::{Identification, KeyValueStore, ProxyConfig};
use flora_lens_llm::{GeminiProvider, InferenceGateway, ProviderConfig};

use crate::models::history::HistoryRecord;
use crate::models::reminder::ReminderTask;
use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::services::history::ResultCache;
use crate::services::identification::IdentificationService;
use crate::services::reminders::ReminderScheduler;
use crate::storage::{ConfigService, Database};
use crate::utils::error::{AppError, AppResult};

/// Environment variables checked, in order, for the Gemini API key.
const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Environment variable holding the proxy password. It is never stored in config.
pub const PROXY_PASSWORD_VAR: &str = "FLORA_LENS_PROXY_PASSWORD";

/// Resolve the API key from the environment
pub fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

/// Resolve the proxy password from the environment
pub fn proxy_password_from_env() -> Option<String> {
    std::env::var(PROXY_PASSWORD_VAR)
        .ok()
        .filter(|password| !password.is_empty())
}

/// Combine the stored proxy settings with a runtime password
pub fn resolve_proxy(proxy: Option<&ProxyConfig>, password: Option<String>) -> Option<ProxyConfig> {
    proxy.map(|proxy| ProxyConfig {
        password: password.or_else(|| proxy.password.clone()),
        ..proxy.clone()
    })
}

/// Build the Gemini gateway described by the configuration
pub fn build_gateway(
    config: &AppConfig,
    api_key: Option<String>,
    proxy_password: Option<String>,
) -> AppResult<Arc<dyn InferenceGateway>> {
    let provider = GeminiProvider::new(ProviderConfig {
        api_key,
        base_url: Some(config.endpoint.clone()),
        model: config.primary_model.clone(),
        timeout_secs: config.request_timeout_secs,
        proxy: resolve_proxy(config.proxy.as_ref(), proxy_password),
        ..ProviderConfig::default()
    })
    .map_err(|e| AppError::config(e.to_string()))?;
    Ok(Arc::new(provider))
}

/// Application state shared by all commands
pub struct AppState {
    /// SQLite database with connection pool
    database: Arc<RwLock<Option<Database>>>,
    /// Configuration service for app settings
    config: Arc<RwLock<Option<ConfigService>>>,
    /// Inference gateway; transport settings apply from the next start
    gateway: Arc<RwLock<Option<Arc<dyn InferenceGateway>>>>,
    /// Past identifications
    history: Arc<RwLock<Option<ResultCache>>>,
    /// Maintenance tasks
    reminders: Arc<RwLock<Option<ReminderScheduler>>>,
    /// Set while an identification is running
    identifying: Arc<AtomicBool>,
    /// Whether the state has been initialized
    initialized: Arc<RwLock<bool>>,
}

/// Clears the in-flight flag when dropped.
#[derive(Debug)]
pub struct IdentificationGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for IdentificationGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new() -> Self {
        Self {
            database: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(None)),
            gateway: Arc::new(RwLock::new(None)),
            history: Arc::new(RwLock::new(None)),
            reminders: Arc::new(RwLock::new(None)),
            identifying: Arc::new(AtomicBool::new(false)),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Initialize all services, using the Gemini gateway
    pub async fn initialize(&self, data_dir: &Path) -> AppResult<()> {
        let config = ConfigService::new(data_dir)?;
        let gateway = build_gateway(
            config.get_config(),
            api_key_from_env(),
            proxy_password_from_env(),
        )?;
        self.initialize_with(data_dir, config, gateway).await
    }

    /// Initialize all services with a caller-supplied gateway
    pub async fn initialize_with_gateway(
        &self,
        data_dir: &Path,
        gateway: Arc<dyn InferenceGateway>,
    ) -> AppResult<()> {
        let config = ConfigService::new(data_dir)?;
        self.initialize_with(data_dir, config, gateway).await
    }

    async fn initialize_with(
        &self,
        data_dir: &Path,
        config: ConfigService,
        gateway: Arc<dyn InferenceGateway>,
    ) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        let database = Database::new(data_dir)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(database.clone());
        let due_hours = config.get_config().reminder_due_hours;

        *self.history.write().await = Some(ResultCache::load(store.clone()));
        *self.reminders.write().await = Some(ReminderScheduler::with_due_hours(store, due_hours));
        *self.database.write().await = Some(database);
        *self.config.write().await = Some(config);
        *self.gateway.write().await = Some(gateway);

        *initialized = true;
        tracing::info!("[Storage] Application state ready at {}", data_dir.display());
        Ok(())
    }

    /// Check if database is healthy
    pub fn is_database_healthy(&self) -> bool {
        // Use try_read to avoid blocking
        if let Ok(guard) = self.database.try_read() {
            if let Some(ref db) = *guard {
                return db.is_healthy();
            }
        }
        false
    }

    /// Check if config is healthy
    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    /// Check if the gateway has an API key to call with
    pub fn has_api_key(&self) -> bool {
        if let Ok(guard) = self.gateway.try_read() {
            if let Some(ref gateway) = *guard {
                return gateway.config().api_key.is_some();
            }
        }
        false
    }

    /// Default model of the configured gateway
    pub fn gateway_model(&self) -> Option<String> {
        if let Ok(guard) = self.gateway.try_read() {
            if let Some(ref gateway) = *guard {
                return Some(gateway.model().to_string());
            }
        }
        None
    }

    /// Ask the gateway whether it is configured and reachable
    pub async fn probe_gateway(&self) -> AppResult<()> {
        let gateway = self
            .gateway
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::internal("Inference gateway not initialized"))?;
        gateway.health_check().await.map_err(|e| {
            tracing::warn!("[Health] {} probe failed: {}", gateway.name(), e);
            AppError::internal(e.to_string())
        })
    }

    /// Get the current configuration
    pub async fn get_config(&self) -> AppResult<AppConfig> {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => Ok(config.get_config_clone()),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Update the configuration
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let updated = {
            let mut guard = self.config.write().await;
            match &mut *guard {
                Some(config) => config.update_config(update)?,
                None => return Err(AppError::config("Config service not initialized")),
            }
        };

        if let Some(scheduler) = self.reminders.write().await.as_mut() {
            scheduler.set_due_hours(updated.reminder_due_hours);
        }
        Ok(updated)
    }

    /// Restore default settings
    pub async fn reset_config(&self) -> AppResult<AppConfig> {
        let defaults = {
            let mut guard = self.config.write().await;
            match &mut *guard {
                Some(config) => config.reset()?,
                None => return Err(AppError::config("Config service not initialized")),
            }
        };

        if let Some(scheduler) = self.reminders.write().await.as_mut() {
            scheduler.set_due_hours(defaults.reminder_due_hours);
        }
        Ok(defaults)
    }

    /// Claim the single identification slot.
    ///
    /// A second identification while one is running is rejected.
    pub fn begin_identification(&self) -> AppResult<IdentificationGuard> {
        self.identifying
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::validation("An identification is already in progress"))?;
        Ok(IdentificationGuard {
            flag: self.identifying.clone(),
        })
    }

    /// Build an identification service from the current models and gateway
    pub async fn identifier(&self) -> AppResult<IdentificationService> {
        let config = self.get_config().await?;
        let guard = self.gateway.read().await;
        match &*guard {
            Some(gateway) => Ok(IdentificationService::from_config(gateway.clone(), &config)),
            None => Err(AppError::internal("Inference gateway not initialized")),
        }
    }

    /// Record an accepted identification in history
    pub async fn record_history(
        &self,
        identification: Identification,
        source_image: Option<String>,
    ) -> AppResult<HistoryRecord> {
        self.with_history_mut(|cache| Ok(cache.record(identification, source_image)))
            .await
    }

    /// Get history access for reads
    pub async fn with_history<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&ResultCache) -> AppResult<T>,
    {
        let guard = self.history.read().await;
        match &*guard {
            Some(cache) => f(cache),
            None => Err(AppError::internal("History not initialized")),
        }
    }

    /// Get history access for mutations
    pub async fn with_history_mut<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut ResultCache) -> AppResult<T>,
    {
        let mut guard = self.history.write().await;
        match &mut *guard {
            Some(cache) => f(cache),
            None => Err(AppError::internal("History not initialized")),
        }
    }

    /// Get reminder access for reads
    pub async fn with_reminders<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&ReminderScheduler) -> AppResult<T>,
    {
        let guard = self.reminders.read().await;
        match &*guard {
            Some(scheduler) => f(scheduler),
            None => Err(AppError::internal("Reminders not initialized")),
        }
    }

    /// Get reminder access for mutations
    pub async fn with_reminders_mut<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut ReminderScheduler) -> AppResult<T>,
    {
        let mut guard = self.reminders.write().await;
        match &mut *guard {
            Some(scheduler) => f(scheduler),
            None => Err(AppError::internal("Reminders not initialized")),
        }
    }

    /// Schedule a reminder from a history record's suggestion list
    pub async fn accept_suggestion(
        &self,
        history_id: i64,
        index: usize,
    ) -> AppResult<ReminderTask> {
        let record = self
            .with_history(|cache| {
                cache
                    .get(history_id)
                    .ok_or_else(|| AppError::not_found(format!("History record {}", history_id)))
            })
            .await?;

        let suggestion = record
            .identification
            .suggested_reminders
            .get(index)
            .cloned()
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Suggestion {} on history record {}",
                    index, history_id
                ))
            })?;

        let plant_name = record.identification.common_name.clone();
        self.with_reminders_mut(|scheduler| {
            Ok(scheduler.schedule_suggestion(&suggestion, &plant_name))
        })
        .await
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("initialized", &self.initialized)
            .field("identifying", &self.identifying.load(Ordering::Relaxed))
            .finish()
    }
}
