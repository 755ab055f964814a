//! Per-client throttling for abuse-prone routes such as login.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue, RETRY_AFTER},
};
use futures::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use sova_core::ports::RateLimiter;
use sova_shared::ErrorResponse;

const REMAINING: &str = "x-ratelimit-remaining";

/// Wraps a route or scope with a [`RateLimiter`], keyed by client address.
///
/// Limiter failures let the request through.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}

/// Client address as reported by the proxy headers, else the peer address.
fn client_key(req: &ServiceRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

fn too_many_requests(reset_after: Duration) -> HttpResponse {
    let retry_after = reset_after.as_secs().max(1);

    HttpResponse::TooManyRequests()
        .insert_header((REMAINING, "0"))
        .insert_header((RETRY_AFTER, retry_after.to_string()))
        .json(
            ErrorResponse::new(429, "Too Many Requests")
                .with_detail(format!("Try again in {retry_after} seconds.")),
        )
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = Arc::clone(&self.limiter);
        let key = client_key(&req);

        Box::pin(async move {
            let remaining = match limiter.check(&key).await {
                Ok(verdict) if verdict.allowed => Some(verdict.remaining),
                Ok(verdict) => {
                    tracing::warn!(client = %key, path = %req.path(), "Rate limit exceeded");
                    let response = too_many_requests(verdict.reset_after);
                    return Ok(req.into_response(response).map_into_right_body());
                }
                Err(e) => {
                    tracing::error!(error = %e, "Rate limiter unavailable, letting request through");
                    None
                }
            };

            let mut res = service.call(req).await?;
            if let Some(remaining) = remaining {
                res.headers_mut().insert(
                    HeaderName::from_static(REMAINING),
                    HeaderValue::from(remaining),
                );
            }
            Ok(res.map_into_left_body())
        })
    }
}
