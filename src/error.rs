//! Ошибки клиента бронирования.
//!
//! Локальные ошибки (`Validation`, `InvalidState`) никогда не доходят до сети.
//! Удалённые ошибки несут текст сервера, если он его прислал.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Некорректный ввод пользователя или 400 от сервера.
    #[error("{0}")]
    Validation(String),

    /// Операция недоступна в текущем состоянии сессии.
    #[error("{0}")]
    InvalidState(String),

    /// Сервер отклонил команду, обычно место уже занято.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Circuit breaker разомкнут, запрос не отправлялся.
    #[error("booking service is temporarily unavailable")]
    ServiceUnavailable,

    #[error("network error: {0}")]
    Network(String),

    #[error("server responded with {status}")]
    Server { status: u16, message: Option<String> },

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ClientError {
    /// Текст для пользователя: сообщение сервера или локальное,
    /// иначе `fallback` для конкретной операции.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(m)
            | ClientError::InvalidState(m)
            | ClientError::Conflict(m)
            | ClientError::NotFound(m)
            | ClientError::Unauthorized(m) => m.clone(),
            ClientError::Server { message: Some(m), .. } if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Ошибки, которые возникли без обращения к серверу.
    pub fn is_local(&self) -> bool {
        matches!(self, ClientError::Validation(_) | ClientError::InvalidState(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Unexpected(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}
