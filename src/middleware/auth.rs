use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use crate::auth::{AuthError, Claims, JwksClient};
use crate::config;
use crate::error::ApiError;

/// Authenticated caller identity extracted from a verified bearer token.
///
/// The subject is the sole scoping key for all data access; it is never taken
/// from a request payload.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub subject: String,
}

/// JWT authentication middleware that validates tokens and injects the caller
/// identity into the request extensions
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers)?;
    let claims = validate_token(&token).await?;

    request.extensions_mut().insert(AuthUser {
        subject: claims.sub,
    });

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(AuthError::MissingCredentials)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = auth_str.split_whitespace();
    let (scheme, token) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) => (scheme, token),
        _ => return Err(AuthError::MalformedHeader),
    };

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token.to_string())
}

/// Verify signature, expiry, issuer and audience against the provider's
/// published key set, and return the claim set
async fn validate_token(token: &str) -> Result<Claims, AuthError> {
    let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    let kid = header
        .kid
        .ok_or_else(|| AuthError::InvalidToken("token has no key id".to_string()))?;

    let decoding_key = JwksClient::shared().decoding_key(&kid).await?;

    let auth = &config::config().auth;
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[&auth.audience]);
    validation.set_issuer(&[auth.issuer_url()]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_missing_credentials() {
        let err = extract_bearer(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[test]
    fn scheme_mismatch_is_malformed() {
        let err = extract_bearer(&headers_with("Token abc")).unwrap_err();
        assert!(matches!(err, AuthError::MalformedHeader));
    }

    #[test]
    fn bearer_without_token_is_malformed() {
        let err = extract_bearer(&headers_with("Bearer")).unwrap_err();
        assert!(matches!(err, AuthError::MalformedHeader));
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        let err = extract_bearer(&headers_with("Bearer abc def")).unwrap_err();
        assert!(matches!(err, AuthError::MalformedHeader));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let token = extract_bearer(&headers_with("bearer abc.def.ghi")).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn well_formed_header_yields_token() {
        let token = extract_bearer(&headers_with("Bearer eyJx.eyJy.sig")).unwrap();
        assert_eq!(token, "eyJx.eyJy.sig");
    }

    #[tokio::test]
    async fn garbage_token_fails_before_any_key_lookup() {
        // Not even JWT-shaped, so header decoding rejects it offline
        let err = validate_token("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }
}
