//! Stateless access tokens: HS256 JWTs signed with the service secret.
//!
//! Tokens are bearer credentials; the claims carry the account id, its role,
//! and the linked customer id so handlers can authorize without a database
//! round trip for the common cases.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use favoritos_core::{AccountId, CustomerId, Role};

type HmacSha256 = Hmac<Sha256>;

/// Fixed header for every token this service issues.
const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token subject is missing or not an account id")]
    MissingSubject,

    /// Valid token, insufficient role.
    #[error("admin privileges required")]
    Forbidden,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id, stringified.
    pub sub: String,
    pub role: Role,
    pub customer_id: Option<CustomerId>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
}

impl Claims {
    /// Parses the subject back into an account id.
    pub fn account_id(&self) -> Result<AccountId, TokenError> {
        self.sub.parse().map_err(|_| TokenError::MissingSubject)
    }

    /// Errors unless the token belongs to an admin.
    pub const fn require_admin(&self) -> Result<(), TokenError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(TokenError::Forbidden)
        }
    }
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: SecretString,
    ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub const fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Signs a token for the given account, expiring after the configured ttl.
    pub fn issue(
        &self,
        account_id: AccountId,
        role: Role,
        customer_id: Option<CustomerId>,
    ) -> Result<String, TokenError> {
        self.issue_at(Utc::now(), account_id, role, customer_id)
    }

    fn issue_at(
        &self,
        now: DateTime<Utc>,
        account_id: AccountId,
        role: Role,
        customer_id: Option<CustomerId>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: account_id.to_string(),
            role,
            customer_id,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| TokenError::Malformed)?;

        let header_b64 = URL_SAFE_NO_PAD.encode(HEADER.as_bytes());
        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload);
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature_b64 = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(Utc::now(), token)
    }

    fn verify_at(&self, now: DateTime<Utc>, token: &str) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| TokenError::Malformed)?;
        let header: TokenHeader =
            serde_json::from_slice(&header).map_err(|_| TokenError::Malformed)?;
        if header.alg != "HS256" {
            return Err(TokenError::InvalidSignature);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let signing_input = format!("{header_b64}.{payload_b64}");
        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(input);
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC can take a key of any size.
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size")
    }
}

#[derive(Debug, Deserialize)]
struct TokenHeader {
    alg: String,
}

/// Verifies that a payload was signed by a collaborator sharing `secret`.
///
/// Gates the social-login endpoint: the OAuth gateway completes the provider
/// exchange, then signs the request body it forwards here. A request without
/// a valid signature never reaches the identity service.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Constant-time check of a base64url-encoded HMAC-SHA256 signature.
    #[must_use]
    pub fn verify(&self, payload: &[u8], signature_b64: &str) -> bool {
        let Ok(signature) = URL_SAFE_NO_PAD.decode(signature_b64) else {
            return false;
        };
        let mut mac = self.mac();
        mac.update(payload);
        mac.verify_slice(&signature).is_ok()
    }

    /// Signature for a payload; what the sending side attaches.
    #[must_use]
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac = self.mac();
        mac.update(payload);
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC can take a key of any size.
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size")
    }
}
