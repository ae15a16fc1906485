//! JSON bodies exchanged between the terminal front end and the backend.
//!
//! Field names are part of the HTTP contract and must not change.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/register` and `POST /api/login`.
///
/// Both fields are optional at the type level so that a missing field is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub nombre_empresa: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(nombre_empresa: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            nombre_empresa: Some(nombre_empresa.into()),
            password: Some(password.into()),
        }
    }

    pub fn name(&self) -> &str {
        self.nombre_empresa.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: i64,
    pub nombre_empresa: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub nombre_empresa: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
