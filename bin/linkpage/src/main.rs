//! # Linkpage Binary
//!
//! The entry point that assembles the application based on compile-time
//! features: a document store, a blob store, and an identity provider
//! behind the core ports, wired into the actix router.

use actix_web::{web, App, HttpServer};
use lp_api::handlers::AppState;
use lp_core::names::NameRegistry;

#[cfg(feature = "db-sqlite")]
use lp_db_sqlite::SqliteProfileRepo;

#[cfg(feature = "storage-local")]
use lp_storage_local::LocalBlobStore;

#[cfg(feature = "auth-simple")]
use lp_auth_simple::SimpleIdentityProvider;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let bind = env_or("LINKPAGE_BIND", "127.0.0.1:8080");
    let upload_dir = env_or("LINKPAGE_UPLOAD_DIR", "./data/uploads");
    let url_prefix = env_or("LINKPAGE_URL_PREFIX", "/static/uploads");

    // 1. Document store
    #[cfg(feature = "db-sqlite")]
    let repo = {
        let db_url = env_or("LINKPAGE_DB", "sqlite:linkpage.db?mode=rwc");
        Box::new(
            SqliteProfileRepo::new(&db_url)
                .await
                .expect("Failed to init SQLite"),
        ) as Box<dyn lp_core::traits::ProfileRepo>
    };
    #[cfg(not(feature = "db-sqlite"))]
    let repo = Box::new(lp_core::memory::MemoryProfileRepo::new())
        as Box<dyn lp_core::traits::ProfileRepo>;

    // 2. Blob store
    #[cfg(feature = "storage-local")]
    let store = {
        if let Err(err) = std::fs::create_dir_all(&upload_dir) {
            log::warn!("could not create upload dir {upload_dir}: {err}");
        }
        LocalBlobStore::new(upload_dir.clone().into(), url_prefix)
    };

    // 3. Identity provider
    #[cfg(feature = "auth-simple")]
    let auth = {
        let secret = match std::env::var("LINKPAGE_SESSION_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                log::warn!("LINKPAGE_SESSION_SECRET not set; using a dev-only secret");
                "linkpage-dev-secret".to_string()
            }
        };
        SimpleIdentityProvider::new(&secret)
    };

    // Dev affordance: print a usable bearer token for a chosen owner id.
    #[cfg(feature = "auth-simple")]
    if let Ok(owner_id) = std::env::var("LINKPAGE_DEV_OWNER") {
        use lp_core::traits::IdentityProvider as _;
        log::info!("dev token for {owner_id}: {}", auth.issue_token(&owner_id));
    }

    // 4. Shared state (dynamic dispatch keeps the router plugin-agnostic)
    let state = web::Data::new(AppState {
        repo,
        store: Box::new(store),
        auth: Box::new(auth),
        registry: NameRegistry::new(),
    });

    log::info!("🚀 Linkpage starting on http://{bind}");

    HttpServer::new(move || {
        App::new()
            .wrap(lp_api::middleware::standard_middleware())
            .wrap(lp_api::middleware::cors_policy())
            .app_data(state.clone())
            .service(actix_files::Files::new("/static/uploads", upload_dir.clone()))
            .configure(lp_api::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
