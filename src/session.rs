//! Текущий пользователь.
//!
//! Состояние на весь процесс: читается из хранилища один раз при старте
//! (`SessionManager::init`) и очищается явно при выходе (`logout`).
//! Хранилище подменяется через трейт `SessionStore`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::TicketingApi;
use crate::error::{ClientError, Result};
use crate::forms::LoginForm;
use crate::models::CurrentUser;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> std::result::Result<Option<CurrentUser>, StoreError>;
    fn save(&self, user: &CurrentUser) -> std::result::Result<(), StoreError>;
    fn clear(&self) -> std::result::Result<(), StoreError>;
}

/// JSON-файл с пользователем.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> std::result::Result<Option<CurrentUser>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, user: &CurrentUser) -> std::result::Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(user)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> std::result::Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<CurrentUser>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: CurrentUser) -> Self {
        Self { user: Mutex::new(Some(user)) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CurrentUser>> {
        self.user.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> std::result::Result<Option<CurrentUser>, StoreError> {
        Ok(self.slot().clone())
    }

    fn save(&self, user: &CurrentUser) -> std::result::Result<(), StoreError> {
        *self.slot() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> std::result::Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}

pub struct SessionManager {
    store: Box<dyn SessionStore>,
    current: Option<CurrentUser>,
}

impl SessionManager {
    /// Читает пользователя из хранилища. Повреждённая запись
    /// не мешает старту: она удаляется, сессия начинается пустой.
    pub fn init(store: Box<dyn SessionStore>) -> Self {
        let current = match store.load() {
            Ok(user) => user,
            Err(e) => {
                warn!("Discarding stored session: {}", e);
                if let Err(e) = store.clear() {
                    warn!("Failed to clear stored session: {}", e);
                }
                None
            }
        };
        if let Some(user) = &current {
            info!("Restored session for {}", user.email);
        }
        Self { store, current }
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current.as_ref()
    }

    pub async fn login<A>(&mut self, api: &A, form: &LoginForm) -> Result<&CurrentUser>
    where
        A: TicketingApi + ?Sized,
    {
        let request = form.to_request()?;
        let user = api.login(&request).await?;
        if let Err(e) = self.store.save(&user) {
            // Сессия всё равно действует до конца процесса
            warn!("Failed to persist session: {}", e);
        }
        info!("Logged in as {}", user.email);
        Ok(&*self.current.insert(user))
    }

    pub fn logout(&mut self) -> Result<()> {
        if let Some(user) = self.current.take() {
            info!("Logged out {}", user.email);
        }
        self.store
            .clear()
            .map_err(|e| ClientError::Unexpected(e.to_string()))
    }
}
