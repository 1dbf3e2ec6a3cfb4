//! Shared-secret activation gate.
//!
//! One static secret unlocks mutation for whichever session supplies it last.
//! The check is advisory: the secret and the whole document are visible to
//! any holder, and a client can claim any session id on the wire. There is
//! no revocation, expiry, or multi-holder state.

use crate::types::{ServerState, SessionId};

/// Activation configuration
#[derive(Debug, Clone)]
pub struct ActivationGate {
    /// Shared secret (None = gate closed, every attempt fails)
    secret: Option<String>,
}

impl ActivationGate {
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self {
            secret: (!secret.is_empty()).then_some(secret),
        }
    }

    /// A gate nobody can open
    pub fn closed() -> Self {
        Self { secret: None }
    }

    /// Load the secret from ACTIVATION_SECRET
    pub fn from_env() -> Self {
        let secret = std::env::var("ACTIVATION_SECRET")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        match secret {
            Some(secret) => {
                tracing::info!("Activation secret configured");
                Self {
                    secret: Some(secret),
                }
            }
            None => {
                tracing::warn!(
                    "ACTIVATION_SECRET not set - nobody can activate, the list is read-only"
                );
                Self::closed()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Exact, case-sensitive comparison against the shared secret
    pub fn validate(&self, attempt: &str) -> bool {
        match &self.secret {
            Some(secret) => constant_time_eq(secret.as_bytes(), attempt.as_bytes()),
            None => false,
        }
    }

    /// Record `session_id` as the activator if `attempt` matches.
    ///
    /// Overwrites any previous activator. On mismatch the document is untouched.
    pub fn activate(&self, doc: &mut ServerState, attempt: &str, session_id: &str) -> bool {
        if !self.validate(attempt) {
            return false;
        }
        doc.activated_by = Some(session_id.to_string());
        true
    }
}

/// Whether `session_id` is the session currently allowed to mutate
pub fn is_activator(doc: &ServerState, session_id: &str) -> bool {
    doc.activated_by.as_deref() == Some(session_id)
}

/// Current activator, if any
pub fn activator(doc: &ServerState) -> Option<&SessionId> {
    doc.activated_by.as_ref()
}

/// Constant-time byte comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_activate_with_correct_secret() {
        let gate = ActivationGate::new("open sesame");
        let mut doc = ServerState::default();

        assert!(gate.activate(&mut doc, "open sesame", "session-1"));
        assert_eq!(doc.activated_by.as_deref(), Some("session-1"));
        assert!(is_activator(&doc, "session-1"));
        assert!(!is_activator(&doc, "session-2"));
    }

    #[test]
    fn test_activate_with_wrong_secret_leaves_state() {
        let gate = ActivationGate::new("open sesame");
        let mut doc = ServerState {
            activated_by: Some("session-1".to_string()),
            ..Default::default()
        };
        let before = doc.clone();

        assert!(!gate.activate(&mut doc, "Open Sesame", "session-2"));
        assert!(!gate.activate(&mut doc, "open sesame ", "session-2"));
        assert!(!gate.activate(&mut doc, "", "session-2"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_reactivation_overwrites_holder() {
        let gate = ActivationGate::new("pw");
        let mut doc = ServerState::default();

        assert!(gate.activate(&mut doc, "pw", "first"));
        assert!(gate.activate(&mut doc, "pw", "second"));
        assert_eq!(activator(&doc).map(String::as_str), Some("second"));
        assert!(!is_activator(&doc, "first"));
    }

    #[test]
    fn test_nobody_is_activator_by_default() {
        let doc = ServerState::default();
        assert!(!is_activator(&doc, ""));
        assert!(!is_activator(&doc, "anyone"));
    }

    #[test]
    fn test_closed_gate_rejects_everything() {
        let gate = ActivationGate::closed();
        assert!(!gate.is_enabled());
        assert!(!gate.validate(""));

        let gate = ActivationGate::new("");
        assert!(!gate.is_enabled());
        assert!(!gate.validate(""));
    }

    #[test]
    #[serial]
    fn test_from_env_trims_secret() {
        std::env::set_var("ACTIVATION_SECRET", "  hunter2 \n");
        let gate = ActivationGate::from_env();
        std::env::remove_var("ACTIVATION_SECRET");

        assert!(gate.is_enabled());
        assert!(gate.validate("hunter2"));
    }

    #[test]
    #[serial]
    fn test_from_env_missing_secret() {
        std::env::remove_var("ACTIVATION_SECRET");
        let gate = ActivationGate::from_env();
        assert!(!gate.is_enabled());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
        assert!(constant_time_eq(b"", b""));
    }
}
