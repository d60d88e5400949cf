use cafe_shift::config::{AppConfig, DataConfig};
use cafe_shift::error::AppError;
use cafe_shift::schedule::ScheduleCatalog;
use cafe_shift::sync::{
    last_viewer, remember_viewer, AppsScriptClient, JsonFileStore, ShiftLoader, ShiftSource,
    SnapshotStore, StoreError,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything a calendar request needs: static tables plus the loader that
/// owns the latest shift snapshot.
pub(crate) struct CalendarContext<S> {
    pub(crate) catalog: Arc<ScheduleCatalog>,
    pub(crate) loader: Arc<ShiftLoader<S>>,
}

impl<S> Clone for CalendarContext<S> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            loader: self.loader.clone(),
        }
    }
}

impl<S: SnapshotStore> CalendarContext<S> {
    pub(crate) fn new(catalog: ScheduleCatalog, loader: ShiftLoader<S>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            loader: Arc::new(loader),
        }
    }

    /// Console viewer selection. An explicit request (even an empty one)
    /// replaces the remembered viewer; otherwise the last selection is restored.
    pub(crate) fn resolve_viewer(
        &self,
        requested: Option<String>,
    ) -> Result<Option<String>, StoreError> {
        let store = self.loader.store();
        match requested {
            Some(staff_id) => {
                remember_viewer(&**store, &staff_id)?;
                Ok(Some(staff_id).filter(|id| !id.is_empty()))
            }
            None => last_viewer(&**store),
        }
    }
}

pub(crate) fn load_catalog(config: &DataConfig) -> Result<ScheduleCatalog, AppError> {
    match &config.schedule_path {
        Some(path) => {
            info!(path = %path.display(), "loading schedule tables");
            Ok(ScheduleCatalog::from_path(path)?)
        }
        None => Ok(ScheduleCatalog::standard()),
    }
}

pub(crate) fn build_loader(config: &DataConfig) -> ShiftLoader<JsonFileStore> {
    let store = Arc::new(JsonFileStore::new(config.store_path.clone()));
    let remote = config.api_url.as_ref().map(|url| {
        Arc::new(AppsScriptClient::new(url.clone())) as Arc<dyn ShiftSource>
    });
    ShiftLoader::new(store, remote)
}

pub(crate) fn file_context(config: &AppConfig) -> Result<CalendarContext<JsonFileStore>, AppError> {
    let catalog = load_catalog(&config.data)?;
    let loader = build_loader(&config.data);
    Ok(CalendarContext::new(catalog, loader))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
