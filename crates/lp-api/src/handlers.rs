//! # lp-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core
//! ports: read-by-name for the public page and the JSON API, claim-backed
//! saves, advisory availability, owner lookup, and asset uploads.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use actix_multipart::Multipart;
use askama::Template;
use futures_util::StreamExt as _;
use serde::Deserialize;
use serde_json::{json, Value};

use lp_core::error::AppError;
use lp_core::migrate::normalize;
use lp_core::models::Profile;
use lp_core::names::{validate_name, NameRegistry};
use lp_core::render::compose;
use lp_core::traits::{AssetKind, BlobStore, IdentityProvider, ProfileRepo, MAX_UPLOAD_BYTES};
use lp_ui::{NotFoundTemplate, PageTemplate};

/// State shared across all worker threads.
pub struct AppState {
    pub repo: Box<dyn ProfileRepo>,
    pub store: Box<dyn BlobStore>,
    pub auth: Box<dyn IdentityProvider>,
    pub registry: NameRegistry,
}

/// Renders the public page for a name (e.g. `/my-page`).
pub async fn view_page(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let name = path.into_inner();

    // Invalid names cannot exist in the store; skip the read.
    if validate_name(&name).is_err() {
        return not_found_page(&name);
    }

    match data.repo.get(&name).await {
        Ok(Some(raw)) => {
            let profile = normalize(raw);
            let title = if profile.display_name.is_empty() {
                name.clone()
            } else {
                profile.display_name.clone()
            };
            let tree = compose(&profile, Some(&name));
            match (PageTemplate { title: &title, tree: &tree }).render() {
                Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
                Err(err) => {
                    log::error!("template rendering failed for {name}: {err}");
                    HttpResponse::InternalServerError().finish()
                }
            }
        }
        Ok(None) => not_found_page(&name),
        Err(err) => {
            log::error!("profile read failed for {name}: {err}");
            HttpResponse::ServiceUnavailable().finish()
        }
    }
}

fn not_found_page(name: &str) -> HttpResponse {
    match (NotFoundTemplate { name }).render() {
        Ok(html) => HttpResponse::NotFound().content_type("text/html").body(html),
        Err(_) => HttpResponse::NotFound().finish(),
    }
}

/// Normalized profile JSON for a name. Consumed by editor front ends.
pub async fn get_profile(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let name = path.into_inner();
    match data.repo.get(&name).await {
        Ok(Some(raw)) => HttpResponse::Ok().json(normalize(raw)),
        Ok(None) => error_response(&AppError::NotFound(name)),
        Err(err) => {
            log::error!("profile read failed for {name}: {err}");
            HttpResponse::ServiceUnavailable().finish()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub key: String,
    pub data: Value,
}

/// Saves a profile under a name through the atomic claim.
pub async fn save_profile(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<SaveRequest>,
) -> impl Responder {
    // 1. Identity: the bearer token decides who is acting.
    let owner_id = match bearer_owner(&req, data.auth.as_ref()) {
        Some(owner_id) => owner_id,
        None => return HttpResponse::Unauthorized().json(json!({ "error": "not signed in" })),
    };

    let SaveRequest { key, data: document } = body.into_inner();

    // 2. Payload: current-shape document; serde defaults tolerate partial
    //    payloads, unknown block types are a caller bug.
    let profile: Profile = match serde_json::from_value(document) {
        Ok(profile) => profile,
        Err(err) => {
            return HttpResponse::BadRequest()
                .json(json!({ "error": format!("malformed profile: {err}") }))
        }
    };

    // 3. Claim: validity and uniqueness are re-decided here, never from
    //    advisory state the client may hold.
    match data
        .registry
        .claim(data.repo.as_ref(), &key, &owner_id, &profile)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(json!({ "key": key })),
        Err(err) => error_response(&err),
    }
}

/// Advisory availability for a candidate name.
pub async fn check_availability(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let name = path.into_inner();
    match data.registry.check(data.repo.as_ref(), &name).await {
        Ok(availability) => HttpResponse::Ok().json(availability),
        Err(err) => error_response(&err),
    }
}

/// The name bound to the signed-in owner, for "my page" routing.
pub async fn my_page(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let owner_id = match bearer_owner(&req, data.auth.as_ref()) {
        Some(owner_id) => owner_id,
        None => return HttpResponse::Unauthorized().json(json!({ "error": "not signed in" })),
    };
    match data
        .registry
        .resolve_by_owner(data.repo.as_ref(), &owner_id)
        .await
    {
        Ok(name) => HttpResponse::Ok().json(json!({ "name": name })),
        Err(err) => error_response(&err),
    }
}

/// Accepts one multipart file field and stores it as the given asset kind.
pub async fn upload_asset(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    mut payload: Multipart,
) -> impl Responder {
    // 1. Identity first; uploads are namespaced by owner.
    let owner_id = match bearer_owner(&req, data.auth.as_ref()) {
        Some(owner_id) => owner_id,
        None => return HttpResponse::Unauthorized().json(json!({ "error": "not signed in" })),
    };

    let kind = match AssetKind::parse(&path.into_inner()) {
        Some(kind) => kind,
        None => {
            return HttpResponse::BadRequest()
                .json(json!({ "error": "unknown asset kind" }))
        }
    };

    // 2. Drain the first file field, enforcing the size ceiling while
    //    streaming so an oversize body never reaches the store.
    let mut bytes: Vec<u8> = Vec::new();
    while let Some(field) = payload.next().await {
        let mut field = match field {
            Ok(field) => field,
            Err(err) => {
                return HttpResponse::BadRequest()
                    .json(json!({ "error": format!("malformed upload: {err}") }))
            }
        };
        while let Some(chunk) = field.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    return HttpResponse::BadRequest()
                        .json(json!({ "error": format!("malformed upload: {err}") }))
                }
            };
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return error_response(&AppError::UploadTooLarge {
                    size: bytes.len() + chunk.len(),
                    limit: MAX_UPLOAD_BYTES,
                });
            }
            bytes.extend_from_slice(&chunk);
        }
        break; // single file per request
    }

    if bytes.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "empty upload" }));
    }

    // 3. Store and hand the URL back for the editor's targeted merge.
    match data.store.upload(&owner_id, kind, bytes).await {
        Ok(url) => HttpResponse::Ok().json(json!({ "url": url })),
        Err(err) => error_response(&AppError::UploadFailed(err.to_string())),
    }
}

fn bearer_owner(req: &HttpRequest, auth: &dyn IdentityProvider) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    auth.owner_for_token(token)
}

fn error_response(err: &AppError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        AppError::InvalidName(_) => HttpResponse::UnprocessableEntity().json(body),
        AppError::Conflict(_) => HttpResponse::Conflict().json(body),
        AppError::PermissionDenied => HttpResponse::Forbidden().json(body),
        AppError::NotFound(_) => HttpResponse::NotFound().json(body),
        AppError::UploadTooLarge { .. } => HttpResponse::PayloadTooLarge().json(body),
        AppError::UploadFailed(_) => HttpResponse::BadGateway().json(body),
        AppError::Unavailable(_) => HttpResponse::ServiceUnavailable().json(body),
    }
}
