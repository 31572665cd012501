use tonic::Status;

use crate::domain::account::errors::AuthError;
use crate::domain::account::ports::AuthServicePort;
use crate::domain::policy::models::Action;
use crate::domain::subject::models::SubjectId;
use crate::proto::AuthorizeRequest;
use crate::proto::AuthorizeResponse;

pub async fn authorize<S: AuthServicePort>(
    service: &S,
    request: AuthorizeRequest,
) -> Result<AuthorizeResponse, Status> {
    let action = request
        .action
        .parse::<Action>()
        .map_err(|e| Status::invalid_argument(e.to_string()))?;
    let owner = SubjectId::from_string(&request.resource_owner_id)
        .map_err(|e| Status::invalid_argument(format!("Invalid resource owner ID: {}", e)))?;

    let principal = match service.verify_access_token(&request.token).await {
        Ok(principal) => principal,
        Err(e) => return Ok(denied(e.to_string())),
    };

    match service.authorize(&principal, action, &owner) {
        Ok(()) => Ok(AuthorizeResponse {
            allowed: true,
            reason: String::new(),
        }),
        Err(AuthError::Authorization(reason)) => Ok(denied(reason)),
        Err(e) => Err(Status::internal(e.to_string())),
    }
}

fn denied(reason: String) -> AuthorizeResponse {
    AuthorizeResponse {
        allowed: false,
        reason,
    }
}
