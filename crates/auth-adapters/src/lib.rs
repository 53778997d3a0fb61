//! # auth-adapters
//!
//! HMAC-SHA256 implementation of `SessionVerifier`.
//!
//! Session issuance (login, password checks) belongs to the identity
//! collaborator outside this service; what crosses our boundary is a
//! signed bearer token of the form `<user_id>.<role>.<signature>`. The
//! signature covers the id and role, so a client cannot upgrade its own
//! role string — the server-verified session replaces any client-trusted
//! role claim.

use domains::error::{DomainError, Result};
use domains::models::{Role, Session};
use domains::ports::SessionVerifier;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub struct HmacSessionVerifier {
    secret: Vec<u8>,
}

impl HmacSessionVerifier {
    /// Accepts the shared signing secret (e.g. from configuration).
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    fn signature(&self, user_id: Uuid, role: Role) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(user_id.to_string().as_bytes());
        mac.update(b".");
        mac.update(role.as_str().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Mints a token for the given identity. Used by the seed tool and
    /// tests; production tokens come from the identity collaborator
    /// holding the same secret.
    pub fn issue(&self, user_id: Uuid, role: Role) -> String {
        format!("{}.{}.{}", user_id, role.as_str(), self.signature(user_id, role))
    }
}

impl SessionVerifier for HmacSessionVerifier {
    fn verify(&self, token: &str) -> Result<Session> {
        let mut parts = token.splitn(3, '.');
        let (id_part, role_part, sig_part) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), Some(c)) => (a, b, c),
            _ => return Err(DomainError::Permission("malformed session token".into())),
        };

        let user_id = Uuid::parse_str(id_part)
            .map_err(|_| DomainError::Permission("malformed session token".into()))?;
        let role = Role::from_str(role_part)
            .ok_or_else(|| DomainError::Permission("malformed session token".into()))?;

        let given = hex::decode(sig_part)
            .map_err(|_| DomainError::Permission("malformed session token".into()))?;
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(user_id.to_string().as_bytes());
        mac.update(b".");
        mac.update(role.as_str().as_bytes());
        // Constant-time comparison via the Mac verifier.
        mac.verify_slice(&given)
            .map_err(|_| DomainError::Permission("invalid session token".into()))?;

        Ok(Session { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify() {
        let verifier = HmacSessionVerifier::new(b"test-secret");
        let user_id = Uuid::now_v7();
        let token = verifier.issue(user_id, Role::Faculty);
        let session = verifier.verify(&token).unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.role, Role::Faculty);
    }

    #[test]
    fn role_tampering_is_rejected() {
        let verifier = HmacSessionVerifier::new(b"test-secret");
        let user_id = Uuid::now_v7();
        let token = verifier.issue(user_id, Role::Student);
        let forged = token.replacen("student", "admin", 1);
        assert!(verifier.verify(&forged).is_err());
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let issuer = HmacSessionVerifier::new(b"secret-a");
        let verifier = HmacSessionVerifier::new(b"secret-b");
        let token = issuer.issue(Uuid::now_v7(), Role::Admin);
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let verifier = HmacSessionVerifier::new(b"test-secret");
        assert!(verifier.verify("not-a-token").is_err());
        assert!(verifier.verify("a.b.c").is_err());
        assert!(verifier.verify("").is_err());
    }
}
