//! Caller identity as forwarded by the authentication layer in front of the service.
use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use book_reviews_shared::types::MemberId;

use crate::errors::ServiceError;

pub const MEMBER_ID_HEADER: &str = "x-member-id";
pub const MEMBER_ROLE_HEADER: &str = "x-member-role";
const ADMIN_ROLE: &str = "ADMIN";

/// The member making the request, if any.
///
/// A missing or unparsable `X-Member-Id` header means an anonymous caller; extraction
/// itself never fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actor {
    pub member_id: Option<MemberId>,
    pub is_admin: bool,
}

impl Actor {
    pub fn require_member(&self) -> Result<MemberId, ServiceError> {
        self.member_id.ok_or(ServiceError::Unauthorized)
    }

    pub fn require_admin(&self) -> Result<MemberId, ServiceError> {
        let member_id = self.require_member()?;
        if self.is_admin {
            Ok(member_id)
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
        };

        let member_id = header(MEMBER_ID_HEADER).and_then(|value| value.parse::<MemberId>().ok());
        let is_admin = member_id.is_some()
            && header(MEMBER_ROLE_HEADER).is_some_and(|role| role.eq_ignore_ascii_case(ADMIN_ROLE));

        Ok(Actor { member_id, is_admin })
    }
}
