//! Credential storage and the authentication gate.

pub mod token;

pub use token::TokenStore;

/// True iff the store holds a non-empty credential.
///
/// Side-effect-free predicate; route protection redirects on it in both
/// directions (unauthenticated access to the task list, authenticated
/// access to sign-in).
pub fn is_authenticated(store: &TokenStore) -> bool {
    store.get().is_some()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    /// The gate flips with credential presence.
    #[test]
    fn test_gate_follows_stored_credential() {
        let dir = tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("credentials.json"));

        assert!(!is_authenticated(&store));

        store.save("tok1").unwrap();
        assert!(is_authenticated(&store));

        store.clear().unwrap();
        assert!(!is_authenticated(&store));
    }
}
