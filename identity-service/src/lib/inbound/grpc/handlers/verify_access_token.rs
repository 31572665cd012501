use tonic::Status;

use crate::domain::account::ports::AuthServicePort;
use crate::proto::verify_access_token_response::Result as VerifyResult;
use crate::proto::VerifyAccessTokenRequest;
use crate::proto::VerifyAccessTokenResponse;

/// Token failures are reported in the response body; `Status` is reserved
/// for transport level problems.
pub async fn verify_access_token<S: AuthServicePort>(
    service: &S,
    request: VerifyAccessTokenRequest,
) -> Result<VerifyAccessTokenResponse, Status> {
    let result = match service.verify_access_token(&request.token).await {
        Ok(principal) => VerifyResult::Principal(principal.into()),
        Err(e) => VerifyResult::Error(e.to_string()),
    };

    Ok(VerifyAccessTokenResponse {
        result: Some(result),
    })
}
