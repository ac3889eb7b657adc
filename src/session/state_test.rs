use super::*;

// =============================================================
// SessionSnapshot defaults
// =============================================================

#[test]
fn default_is_bootstrapping_and_loading() {
    let state = SessionSnapshot::default();
    assert_eq!(state.phase, SessionPhase::Bootstrapping);
    assert!(state.loading);
    assert!(state.user.is_none());
    assert!(!state.is_authenticated());
}

// =============================================================
// settled
// =============================================================

#[test]
fn settled_with_user_is_authenticated() {
    let user = User { username: "ana".into(), ..User::default() };
    let state = SessionSnapshot::settled(Some(user));
    assert_eq!(state.phase, SessionPhase::Authenticated);
    assert!(!state.loading);
    assert!(state.is_authenticated());
}

#[test]
fn settled_without_user_is_anonymous() {
    let state = SessionSnapshot::settled(None);
    assert_eq!(state.phase, SessionPhase::Anonymous);
    assert!(!state.loading);
    assert!(!state.is_authenticated());
}
