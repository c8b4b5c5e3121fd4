/// HTTP middleware for gallery-service
///
/// `ServerErrors` is the last-resort handler for 500s: a panicking handler
/// is turned into the generic 500 JSON response instead of a dropped
/// connection, and in development mode internal error details are echoed
/// in the body.
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use crate::error::{internal_error_response, AppError};
use crate::AppState;

pub struct ServerErrors;

impl<S, B> Transform<S, ServiceRequest> for ServerErrors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ServerErrorsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ServerErrorsService {
            service: Rc::new(service),
        }))
    }
}

pub struct ServerErrorsService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ServerErrorsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let http_req = req.request().clone();
            let expose = expose_internal_errors(&http_req);

            let res = match AssertUnwindSafe(service.call(req)).catch_unwind().await {
                Ok(result) => result?,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(
                        method = %http_req.method(),
                        path = %http_req.path(),
                        panic = %message,
                        "Handler panicked"
                    );
                    let detail = format!("handler panicked: {}", message);
                    let response = internal_error_response(expose.then_some(detail.as_str()));
                    return Ok(ServiceResponse::new(http_req, response).map_into_right_body());
                }
            };

            if !expose {
                return Ok(res.map_into_left_body());
            }

            let detail = res
                .response()
                .error()
                .and_then(|err| err.as_error::<AppError>())
                .filter(|err| err.is_internal())
                .map(|err| err.to_string());

            match detail {
                Some(detail) => {
                    let (http_req, _) = res.into_parts();
                    let response = internal_error_response(Some(&detail));
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                None => Ok(res.map_into_left_body()),
            }
        })
    }
}

/// Development deployments echo internal error details to the caller.
fn expose_internal_errors(req: &HttpRequest) -> bool {
    req.app_data::<web::Data<AppState>>()
        .map_or(false, |state| state.config.app.is_development())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
