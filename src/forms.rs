//! Формы как неизменяемые записи.
//!
//! Каждое поле меняется через `with_field`, который возвращает новую запись.
//! Проверка выполняется один раз при отправке, а не на каждое нажатие клавиши.

use validator::{Validate, ValidationErrors};

use crate::error::{ClientError, Result};
use crate::models::{LoginRequest, PaymentMethod};

/// Собирает сообщения `validator` в одну строку для показа пользователю.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join("; ")
}

fn unknown_field(form: &str, name: &str) -> ClientError {
    ClientError::Validation(format!("Unknown {} field '{}'", form, name))
}

/// Данные плательщика из формы бронирования.
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct PayerForm {
    user_id: String,
    #[validate(length(min = 1, message = "Payer name is required"))]
    payer_name: String,
    #[validate(email(message = "Payer email must be a valid email address"))]
    payer_email: String,
    payment_method: String,
    #[validate(length(min = 1, message = "Payment reference is required"))]
    payment_reference: String,
}

/// Проверенные данные плательщика, готовые для команды бронирования.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayerDetails {
    pub user_id: Option<i64>,
    pub payer_name: String,
    pub payer_email: String,
    pub payment_method: PaymentMethod,
    pub payment_reference: String,
}

impl PayerForm {
    pub const FIELDS: [&'static str; 5] =
        ["userId", "payerName", "payerEmail", "paymentMethod", "paymentReference"];

    pub fn new() -> Self {
        Self {
            payment_method: PaymentMethod::default().to_string(),
            ..Self::default()
        }
    }

    /// Новая запись с изменённым полем. Имена - как в JSON команды,
    /// допускается и snake_case.
    pub fn with_field(&self, name: &str, value: &str) -> Result<Self> {
        let mut next = self.clone();
        let value = value.trim().to_string();
        match name {
            "userId" | "user_id" => next.user_id = value,
            "payerName" | "payer_name" | "name" => next.payer_name = value,
            "payerEmail" | "payer_email" | "email" => next.payer_email = value,
            "paymentMethod" | "payment_method" | "method" => next.payment_method = value,
            "paymentReference" | "payment_reference" | "reference" => {
                next.payment_reference = value
            }
            other => return Err(unknown_field("payer", other)),
        }
        Ok(next)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "userId" => Some(&self.user_id),
            "payerName" => Some(&self.payer_name),
            "payerEmail" => Some(&self.payer_email),
            "paymentMethod" => Some(&self.payment_method),
            "paymentReference" => Some(&self.payment_reference),
            _ => None,
        }
    }

    /// Проверяет форму и разбирает поля в типизированные значения.
    pub fn to_details(&self) -> Result<PayerDetails> {
        let mut problems = Vec::new();
        if let Err(errors) = self.validate() {
            problems.push(describe(&errors));
        }

        let user_id = if self.user_id.is_empty() {
            None
        } else {
            match self.user_id.parse::<i64>() {
                Ok(id) if id > 0 => Some(id),
                _ => {
                    problems.push("User ID must be a positive number".to_string());
                    None
                }
            }
        };

        let payment_method = match self.payment_method.parse::<PaymentMethod>() {
            Ok(method) => method,
            Err(message) => {
                problems.push(message);
                PaymentMethod::default()
            }
        };

        if !problems.is_empty() {
            return Err(ClientError::Validation(problems.join("; ")));
        }

        Ok(PayerDetails {
            user_id,
            payer_name: self.payer_name.clone(),
            payer_email: self.payer_email.clone(),
            payment_method,
            payment_reference: self.payment_reference.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Email must be a valid email address"))]
    email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(&self, name: &str, value: &str) -> Result<Self> {
        let mut next = self.clone();
        match name {
            "email" => next.email = value.trim().to_string(),
            // Пароль не обрезаем
            "password" => next.password = value.to_string(),
            other => return Err(unknown_field("login", other)),
        }
        Ok(next)
    }

    pub fn to_request(&self) -> Result<LoginRequest> {
        self.validate()
            .map_err(|errors| ClientError::Validation(describe(&errors)))?;
        Ok(LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}
