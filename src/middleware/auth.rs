use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Claims issued by the external identity system. The engine never mints
/// or refreshes tokens; it only consumes the principal they carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Authenticated caller, attached to the request after token validation.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub role: String,
    pub name: String,
    pub email: String,
}

fn unauthorized(tag: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": tag }))).into_response()
}

fn decode_principal(req: &Request) -> std::result::Result<Principal, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("unsupported_scheme"));
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data,
        Err(_) => return Err(unauthorized("invalid_token")),
    };

    let Ok(id) = data.claims.sub.parse::<Uuid>() else {
        return Err(unauthorized("invalid_subject"));
    };

    Ok(Principal {
        id,
        role: data.claims.role.unwrap_or_default(),
        name: data.claims.name.unwrap_or_default(),
        email: data.claims.email.unwrap_or_default(),
    })
}

fn require_role(req: &Request, allowed: &[&str]) -> std::result::Result<Principal, Response> {
    let principal = decode_principal(req)?;
    if !allowed.iter().any(|r| r.eq_ignore_ascii_case(&principal.role)) {
        return Err((StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"}))).into_response());
    }
    Ok(principal)
}

pub async fn require_instructor(mut req: Request, next: Next) -> Response {
    match require_role(&req, &["instructor", "admin"]) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_student(mut req: Request, next: Next) -> Response {
    match require_role(&req, &["student"]) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}
