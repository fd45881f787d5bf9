use std::time::Duration;

use actix_web::{
    dev::{Server, Service},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
};
use futures::future::{ok, Either};
use log::{error, info};
use website_order_engine::{events::EventProducers, payments::PaymentEventProcessor, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    helpers::{get_remote_ip, is_whitelisted},
    notifications::create_notification_handlers,
    routes::{health, payment_webhook_preflight, PaymentWebhookRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Database migrations failed. {e}")))?;
    info!("🚀️ Database is ready at {}", db.url());
    if config.stripe.webhook_secret.is_unset() {
        error!("🚀️ No webhook signing secret is configured. Every payment webhook delivery will be rejected.");
    }
    let handlers = create_notification_handlers();
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let verifier = config.stripe.signature_verifier();
        let processor = PaymentEventProcessor::new(db.clone(), verifier, producers.clone());
        let use_x_forwarded_for = config.use_x_forwarded_for;
        let use_forwarded = config.use_forwarded;
        let whitelist = config.stripe.whitelist.clone();
        let webhook_scope = web::scope("/webhook")
            .wrap_fn(move |req, srv| {
                let peer_ip = get_remote_ip(req.request(), use_x_forwarded_for, use_forwarded);
                let whitelisted = is_whitelisted(peer_ip, whitelist.as_deref());
                if whitelisted {
                    Either::Left(srv.call(req))
                } else {
                    Either::Right(ok(req.error_response(ServerError::ForbiddenPeer)))
                }
            })
            .service(PaymentWebhookRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("wop::access_log"))
            .app_data(web::Data::new(processor))
            .service(health)
            .service(payment_webhook_preflight)
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
