//! Application state management

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use lodgekeep_core::{Database, DiscountPolicy, Error, Result};

use crate::config::AppConfig;
use crate::services::{LocalMediaStore, LogNotifier, MediaUploader, Notifier};

/// Main application state: storage plus the injected collaborators,
/// all living for the process lifetime.
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub config: AppConfig,
    pub uploader: Arc<dyn MediaUploader>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let db_path = match &config.database_path {
            Some(path) => path.clone(),
            None => Self::data_path()?.join("lodgekeep.db"),
        };

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path)?;

        let media_root = match &config.media_root {
            Some(path) => path.clone(),
            None => Self::data_path()?.join("media"),
        };

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            config,
            uploader: Arc::new(LocalMediaStore::new(media_root)),
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Assemble state around an existing database and collaborators
    /// (tests, alternative uploader/notifier implementations).
    pub fn with_collaborators(
        db: Database,
        config: AppConfig,
        uploader: Arc<dyn MediaUploader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config,
            uploader,
            notifier,
        }
    }

    pub fn discount_policy(&self) -> DiscountPolicy {
        self.config.discount_policy
    }

    fn data_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "lodgekeep", "lodgekeep").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;

        Ok(dirs.data_dir().to_path_buf())
    }
}
