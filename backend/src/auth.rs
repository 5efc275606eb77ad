//! Caller identity taken from gateway-provided headers.
//!
//! Authentication itself happens upstream; this service trusts `X-User-Id`, `X-User-Name` and
//! `X-User-Roles` and only enforces role requirements per endpoint.

use crate::error::ApiError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::collections::HashSet;
use std::future::{ready, Ready};

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_NAME_HEADER: &str = "X-User-Name";
pub const USER_ROLES_HEADER: &str = "X-User-Roles";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Uploader,
    Reviewer,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim() {
            "ROLE_USER" => Some(Role::User),
            "ROLE_UPLOADER" => Some(Role::Uploader),
            "ROLE_REVIEWER" => Some(Role::Reviewer),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Uploader => "ROLE_UPLOADER",
            Role::Reviewer => "ROLE_REVIEWER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub user_name: Option<String>,
    pub roles: HashSet<Role>,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>, roles: &[Role]) -> Self {
        AuthenticatedUser {
            user_id: user_id.into(),
            user_name: None,
            roles: roles.iter().copied().collect(),
        }
    }

    /// Admins hold every role implicitly.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role) || self.roles.contains(&Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ApiError::insufficient_rights(
                "Insufficient rights",
                format!("This operation requires {}.", role.as_str()),
            ))
        }
    }

    fn from_headers(req: &HttpRequest) -> Result<Self, ApiError> {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };
        let user_id = header(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header.", USER_ID_HEADER)))?;
        let roles = header(USER_ROLES_HEADER)
            .map(|roles| roles.split(',').filter_map(Role::parse).collect())
            .unwrap_or_default();
        Ok(AuthenticatedUser {
            user_id: user_id.to_string(),
            user_name: header(USER_NAME_HEADER).map(str::to_string),
            roles,
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(AuthenticatedUser::from_headers(req))
    }
}
