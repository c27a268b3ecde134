/// HTTP middleware for around-service
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

use crate::error::AppError;
use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::models::CallerIdentity;

/// Claims carried by caller tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

/// Verifies `Authorization: Bearer <jwt>` (HS256) and attaches the caller's
/// username to the request.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    key: DecodingKey,
}

impl JwtAuthMiddleware {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            key: Rc::new(self.key.clone()),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    key: Rc<DecodingKey>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let key = self.key.clone();

        Box::pin(async move {
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?
                .strip_prefix("Bearer ")
                .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
                .to_string();

            let username = validate_token(&token, &key)?;
            req.extensions_mut().insert(CallerIdentity(username));

            service.call(req).await
        })
    }
}

/// Decodes an HS256 token and returns its `username` claim.
pub fn validate_token(token: &str, key: &DecodingKey) -> Result<String, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // exp is checked when present but not required
    validation.required_spec_claims = HashSet::new();

    let data = decode::<Claims>(token, key, &validation).map_err(|e| {
        tracing::warn!("JWT validation failed: {}", e);
        AppError::Unauthorized("Invalid or expired token".into())
    })?;

    if data.claims.username.is_empty() {
        return Err(AppError::Unauthorized("Token has no username".into()));
    }
    Ok(data.claims.username)
}

impl FromRequest for CallerIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<CallerIdentity>() {
            Some(identity) => ready(Ok(identity.clone())),
            None => ready(Err(AppError::Unauthorized("User not authenticated".into()).into())),
        }
    }
}

/// Records request count and latency per method and path.
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();

        Box::pin(async move {
            let result = service.call(req).await;
            let status = match &result {
                Ok(res) => res.status().as_u16().to_string(),
                Err(e) => e.as_response_error().status_code().as_u16().to_string(),
            };

            HTTP_REQUESTS_TOTAL
                .with_label_values(&[&method, &path, &status])
                .inc();
            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&[&method, &path])
                .observe(start.elapsed().as_secs_f64());

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_token_signed_with_the_secret() {
        let t = token(
            "s3cret",
            &Claims {
                username: "alice".into(),
                exp: None,
            },
        );
        let username = validate_token(&t, &DecodingKey::from_secret(b"s3cret")).unwrap();
        assert_eq!(username, "alice");
    }

    #[test]
    fn rejects_token_signed_with_another_secret() {
        let t = token(
            "other",
            &Claims {
                username: "alice".into(),
                exp: None,
            },
        );
        assert!(validate_token(&t, &DecodingKey::from_secret(b"s3cret")).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let t = token(
            "s3cret",
            &Claims {
                username: "alice".into(),
                exp: Some(1_000),
            },
        );
        assert!(validate_token(&t, &DecodingKey::from_secret(b"s3cret")).is_err());
    }

    #[test]
    fn rejects_empty_username() {
        let t = token(
            "s3cret",
            &Claims {
                username: String::new(),
                exp: None,
            },
        );
        assert!(validate_token(&t, &DecodingKey::from_secret(b"s3cret")).is_err());
    }
}
