use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::context::AppContext;
use crate::models::Identity;
use crate::utils::AppError;

/// Bearer-token gate. On success the verified `Identity` is stored in the
/// request extensions for `web::ReqData<Identity>`; role checks are left
/// to the handlers. Rejections are answered here as `{message}` responses
/// so outer middleware (CORS, security headers) still runs on them.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header = header.ok_or_else(|| AppError::unauthenticated("Access denied. No token provided."))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthenticated("Invalid token format"))?
        .trim();

    if token.is_empty() {
        return Err(AppError::unauthenticated("Access denied. No token provided."));
    }
    Ok(token)
}

impl<S> AuthMiddlewareService<S> {
    fn authenticate(req: &ServiceRequest) -> Result<Identity, AppError> {
        let ctx = req
            .app_data::<web::Data<AppContext>>()
            .ok_or_else(|| AppError::unexpected("AppContext not registered"))?;

        let header = req.headers().get(AUTHORIZATION).map(|v| v.to_str());
        let header = match header {
            Some(Ok(value)) => Some(value),
            Some(Err(_)) => return Err(AppError::unauthenticated("Invalid token format")),
            None => None,
        };

        ctx.tokens.verify(bearer_token(header)?)
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match Self::authenticate(&req) {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(e) => {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                let res = req.into_response(e.error_response()).map_into_right_body();
                Box::pin(async move { Ok(res) })
            }
        }
    }
}
