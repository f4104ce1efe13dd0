use std::sync::OnceLock;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AuthError;
use crate::config;

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Fetches and caches the identity provider's published key set.
///
/// Keys are resolved by the `kid` of the inbound token. The cached set is
/// refreshed after `ttl` elapses, and once eagerly when an unknown `kid`
/// shows up (covers provider-side key rotation between refreshes).
pub struct JwksClient {
    http: reqwest::Client,
    jwks_url: String,
    ttl: Duration,
    cached: RwLock<Option<CachedKeys>>,
}

impl JwksClient {
    pub fn new(jwks_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            jwks_url: jwks_url.into(),
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Process-wide client configured from the identity-provider settings
    pub fn shared() -> &'static JwksClient {
        static INSTANCE: OnceLock<JwksClient> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let auth = &config::config().auth;
            JwksClient::new(auth.jwks_url(), Duration::from_secs(auth.jwks_ttl_secs))
        })
    }

    /// Resolve the decoding key for a token's `kid`
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        // Fast path: fresh cache already holds the key
        {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.fetched_at.elapsed() < self.ttl {
                    if let Some(jwk) = find_key(&entry.keys, kid) {
                        return decode_jwk(jwk);
                    }
                }
            }
        }

        // Stale cache or unknown kid: refetch once, then decide
        self.refresh().await?;

        let cached = self.cached.read().await;
        let entry = cached
            .as_ref()
            .ok_or_else(|| AuthError::KeyLookup("key set unavailable".to_string()))?;

        match find_key(&entry.keys, kid) {
            Some(jwk) => decode_jwk(jwk),
            // The provider does not publish this kid, so the token cannot be
            // trusted: a credential problem, not an infra one
            None => Err(AuthError::InvalidToken(format!("unknown key id: {}", kid))),
        }
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        let keys: JwkSet = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyLookup(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::KeyLookup(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::KeyLookup(e.to_string()))?;

        info!("Refreshed JWKS key set: {} keys", keys.keys.len());

        let mut cached = self.cached.write().await;
        *cached = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }
}

fn find_key<'a>(set: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    set.find(kid)
}

fn decode_jwk(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    DecodingKey::from_jwk(jwk).map_err(|e| AuthError::KeyLookup(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // RSA public key material from RFC 7517's example set
    const SAMPLE_JWKS: &str = r#"{
        "keys": [
            {
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": "key-2024-a",
                "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
                "e": "AQAB"
            }
        ]
    }"#;

    #[test]
    fn jwks_document_parses_and_resolves_by_kid() {
        let set: JwkSet = serde_json::from_str(SAMPLE_JWKS).expect("valid JWKS document");
        assert_eq!(set.keys.len(), 1);

        let jwk = find_key(&set, "key-2024-a").expect("known kid resolves");
        assert!(decode_jwk(jwk).is_ok());
    }

    #[test]
    fn unknown_kid_resolves_to_none() {
        let set: JwkSet = serde_json::from_str(SAMPLE_JWKS).expect("valid JWKS document");
        assert!(find_key(&set, "key-2019-retired").is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_key_lookup_error() {
        // Port 1 on loopback refuses immediately
        let client = JwksClient::new(
            "http://127.0.0.1:1/.well-known/jwks.json",
            Duration::from_secs(60),
        );
        let result = client.decoding_key("any").await;
        assert!(matches!(result, Err(AuthError::KeyLookup(_))));
    }
}
