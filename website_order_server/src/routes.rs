//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! etc.) should be expressed as futures or asynchronous functions. The payment webhook in particular must answer
//! quickly, so it only ever touches the database; follow-up work goes through the engine's event hooks.
use actix_web::{get, options, web, HttpRequest, HttpResponse, Responder};
use log::*;
use serde_json::json;
use website_order_engine::{
    payments::{PaymentEventProcessor, SIGNATURE_HEADER},
    traits::PaymentManagement,
};

use crate::errors::ServerError;

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(payment_webhook => Post "/stripe" impl PaymentManagement);
/// Route handler for payment provider webhook deliveries. Mounted under the `/webhook` scope.
///
/// The body is taken as raw bytes: the signature in the `Stripe-Signature` header covers the exact bytes that were
/// sent, so nothing may parse or re-serialize the body before it is verified.
///
/// Every authentic delivery that was handled, including replays, unknown event types and events for unknown payment
/// intents, is acknowledged with `200 {"received": true}`. Anything else gets a `400 {"error": ...}` so that the
/// provider redelivers it later.
pub async fn payment_webhook<B>(
    req: HttpRequest,
    body: web::Bytes,
    processor: web::Data<PaymentEventProcessor<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentManagement,
{
    trace!("💻️ Received payment webhook delivery ({} bytes)", body.len());
    let signature = req.headers().get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let outcome = processor.process(&body, signature).await.map_err(|e| {
        warn!("💻️ Payment webhook delivery rejected. {e}");
        ServerError::WebhookRejected(e)
    })?;
    debug!("💻️ Payment webhook delivery handled: {outcome}");
    Ok(HttpResponse::Ok().json(json!({"received": true})))
}

/// CORS preflight for the webhook endpoint. Nothing is read or written. Registered outside the `/webhook` scope so
/// that the provider IP whitelist does not apply to it.
#[options("/webhook/stripe")]
pub async fn payment_webhook_preflight() -> impl Responder {
    trace!("💻️ Received CORS preflight for the payment webhook");
    HttpResponse::Ok()
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .insert_header(("Access-Control-Allow-Headers", format!("Content-Type, {SIGNATURE_HEADER}")))
        .finish()
}
