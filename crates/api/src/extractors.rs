//! Request extractors.
//!
//! Every rejection is an [`AppError`], so malformed requests get the same
//! error envelope as business failures.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use moviehub_common::AppError;
use moviehub_db::entities::user;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::middleware::IdentityLookupFailed;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware when the bearer token resolved
        if let Some(user) = parts.extensions.get::<user::Model>() {
            return Ok(Self(user.clone()));
        }

        match parts.extensions.get::<IdentityLookupFailed>() {
            Some(IdentityLookupFailed(message)) => Err(AppError::Database(message.clone())),
            None => Err(AppError::Unauthorized),
        }
    }
}

/// Optional authenticated user extractor.
///
/// A missing or unknown token yields `None` rather than a rejection, and so
/// does a failed token lookup.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// JSON body that is deserialized and then validated.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::invalid_request(rejection.body_text()))?;

        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string that is deserialized and then validated.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::invalid_request(rejection.body_text()))?;

        value.validate()?;
        Ok(Self(value))
    }
}
