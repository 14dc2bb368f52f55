use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::descriptor::{validate_draft, FieldDescriptor, FieldErrors, InputKind};
use crate::services::{AdminError, Record, ResourceService, ServiceResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub operator: Operator,
    /// Unix seconds; `None` never expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl Session {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

/// The signed-in operator, shared between the shell and its services.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, session: Session) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(session);
        }
    }

    pub fn sign_out(&self) -> Option<Session> {
        self.inner.lock().ok().and_then(|mut slot| slot.take())
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current()
            .map(|session| !session.is_expired_at(Utc::now().timestamp()))
            .unwrap_or(false)
    }

    pub fn token(&self) -> Option<String> {
        self.current()
            .filter(|session| !session.is_expired_at(Utc::now().timestamp()))
            .map(|session| session.token)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let fields = [
            FieldDescriptor::new("email", "Email", InputKind::Email).required(),
            FieldDescriptor::new("password", "Password", InputKind::Password)
                .required()
                .sensitive(),
        ];
        let mut draft = Record::new();
        draft.set("email", &self.email);
        draft.set("password", &self.password);
        validate_draft(&fields, &draft)
    }
}

/// Posts credentials to `auth/login`; rejects locally invalid input without a request.
pub async fn sign_in_remote<S: ResourceService>(
    service: &S,
    credentials: &Credentials,
) -> ServiceResult<Session> {
    let errors = credentials.validate();
    if let Some(message) = errors.values().next() {
        return Err(AdminError::Validation(message.clone()));
    }
    let response = service
        .action(
            "auth/login",
            json!({"email": credentials.email, "password": credentials.password}),
        )
        .await?;
    serde_json::from_value(response).map_err(|err| AdminError::Decode(err.to_string()))
}
