use std::sync::Arc;

use tonic::Request;
use tonic::Response;
use tonic::Status;

use super::handlers::authorize;
use super::handlers::verify_access_token;
use crate::domain::account::ports::AuthServicePort;
use crate::proto::auth_service_server::AuthService as AuthServiceProto;
use crate::proto::AuthorizeRequest;
use crate::proto::AuthorizeResponse;
use crate::proto::VerifyAccessTokenRequest;
use crate::proto::VerifyAccessTokenResponse;

pub struct AuthGrpcService<S: AuthServicePort> {
    service: Arc<S>,
}

impl<S: AuthServicePort> AuthGrpcService<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl<S: AuthServicePort> AuthServiceProto for AuthGrpcService<S> {
    async fn verify_access_token(
        &self,
        request: Request<VerifyAccessTokenRequest>,
    ) -> Result<Response<VerifyAccessTokenResponse>, Status> {
        let response =
            verify_access_token::verify_access_token(self.service.as_ref(), request.into_inner())
                .await?;
        Ok(Response::new(response))
    }

    async fn authorize(
        &self,
        request: Request<AuthorizeRequest>,
    ) -> Result<Response<AuthorizeResponse>, Status> {
        let response = authorize::authorize(self.service.as_ref(), request.into_inner()).await?;
        Ok(Response::new(response))
    }
}
