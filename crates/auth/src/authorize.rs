use serde::Serialize;

use fineease_core::{DomainError, DomainResult};

use crate::{Access, Action, Caller, Principal, Role};

/// Whether `role` is granted `action`.
///
/// Exhaustive over [`Role`]: adding a role is a compile error here until its
/// grants are written down.
fn grants(role: Role, action: Action) -> bool {
    if action.is_public() {
        return true;
    }

    match role {
        Role::Admin => matches!(
            action,
            Action::WhoAmI
                | Action::CreateNgo
                | Action::ApproveNgo
                | Action::RejectNgo
                | Action::ListAllNgos
                | Action::GetNgo
                | Action::ListOwnNgos
                | Action::ViewStatistics
        ),
        Role::NgoOwner => matches!(
            action,
            Action::WhoAmI | Action::CreateNgo | Action::ListOwnNgos | Action::ViewStatistics
        ),
        Role::Donor => matches!(
            action,
            Action::WhoAmI
                | Action::CreateDonation
                | Action::ListOwnDonations
                | Action::ListOwnNgos
                | Action::ViewStatistics
        ),
    }
}

/// The guard's single decision function.
///
/// `None` is an anonymous caller, which only reaches public actions.
///
/// - No IO
/// - No panics
pub fn can_access(role: Option<Role>, action: Action) -> bool {
    match role {
        None => action.is_public(),
        Some(role) => grants(role, action),
    }
}

/// Authorize `caller` for `action`.
///
/// Denial never depends on the target resource: this runs before any lookup.
pub fn authorize(caller: &Caller, action: Action) -> DomainResult<()> {
    if can_access(caller.role(), action) {
        return Ok(());
    }
    match caller {
        Caller::Anonymous => Err(DomainError::AuthenticationRequired),
        Caller::Authenticated(_) => Err(DomainError::Forbidden),
    }
}

/// Authorize a non-public action and hand back the authenticated principal.
pub fn require(caller: &Caller, action: Action) -> DomainResult<&Principal> {
    authorize(caller, action)?;
    caller.principal().ok_or(DomainError::AuthenticationRequired)
}

/// Roles that are granted `action`, in declaration order.
pub fn allowed_roles(action: Action) -> Vec<Role> {
    Role::ALL
        .into_iter()
        .filter(|r| grants(*r, action))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub action: Action,
    pub access: Access,
    pub granted: bool,
    /// `None` for an anonymous caller.
    pub role: Option<Role>,
    pub allowed_roles: Vec<Role>,
    pub reason: String,
}

/// Explain why an authorization decision was made (or would be made).
pub fn explain_authorization(caller: &Caller, action: Action) -> AuthorizationExplanation {
    let role = caller.role();
    let granted = can_access(role, action);
    let allowed = allowed_roles(action);

    let reason = match (granted, role) {
        (true, _) if action.is_public() => format!("'{action}' is public"),
        (true, Some(r)) => format!("role '{r}' is granted '{action}'"),
        (true, None) => format!("'{action}' is reachable anonymously"),
        (false, None) => format!("'{action}' requires an authenticated session"),
        (false, Some(r)) => format!(
            "role '{r}' is not granted '{action}' (allowed: {})",
            allowed
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };

    AuthorizationExplanation {
        action,
        access: action.access(),
        granted,
        role,
        allowed_roles: allowed,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Identity;
    use fineease_core::UserId;
    use proptest::prelude::*;

    fn caller(role: Role) -> Caller {
        Caller::Authenticated(Principal {
            user_id: UserId::new(),
            identity: Identity::parse("someone@example.org").unwrap(),
            role,
        })
    }

    #[test]
    fn moderation_is_admin_only() {
        for action in [Action::ApproveNgo, Action::RejectNgo, Action::ListAllNgos, Action::GetNgo] {
            assert!(can_access(Some(Role::Admin), action));
            assert!(!can_access(Some(Role::NgoOwner), action));
            assert!(!can_access(Some(Role::Donor), action));
            assert!(!can_access(None, action));
        }
    }

    #[test]
    fn ngo_creation_is_owner_or_admin() {
        assert_eq!(allowed_roles(Action::CreateNgo), vec![Role::NgoOwner, Role::Admin]);
    }

    #[test]
    fn donations_are_donor_only() {
        assert_eq!(allowed_roles(Action::CreateDonation), vec![Role::Donor]);
        assert_eq!(allowed_roles(Action::ListOwnDonations), vec![Role::Donor]);
    }

    #[test]
    fn public_actions_need_no_session() {
        for action in [Action::RegisterUser, Action::Authenticate, Action::ListApprovedNgos, Action::Health] {
            assert!(authorize(&Caller::Anonymous, action).is_ok());
        }
    }

    #[test]
    fn anonymous_and_wrong_role_fail_differently() {
        assert_eq!(
            authorize(&Caller::Anonymous, Action::ApproveNgo),
            Err(DomainError::AuthenticationRequired)
        );
        assert_eq!(
            authorize(&caller(Role::Donor), Action::ApproveNgo),
            Err(DomainError::Forbidden)
        );
    }

    #[test]
    fn require_returns_the_principal() {
        let c = caller(Role::NgoOwner);
        let p = require(&c, Action::CreateNgo).unwrap();
        assert_eq!(p.role, Role::NgoOwner);
    }

    #[test]
    fn explanation_lists_allowed_roles_on_denial() {
        let e = explain_authorization(&caller(Role::NgoOwner), Action::RejectNgo);
        assert!(!e.granted);
        assert_eq!(e.allowed_roles, vec![Role::Admin]);
        assert!(e.reason.contains("ngo_owner"));
        assert!(e.reason.contains("admin"));
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            .. ProptestConfig::default()
        })]

        #[test]
        fn only_admin_moderates(role in any_role()) {
            let granted = can_access(Some(role), Action::ApproveNgo)
                || can_access(Some(role), Action::RejectNgo);
            prop_assert_eq!(granted, role == Role::Admin);
        }

        #[test]
        fn anything_anonymous_can_do_every_role_can_do(role in any_role(), action in any_action()) {
            if can_access(None, action) {
                prop_assert!(can_access(Some(role), action));
            }
        }

        #[test]
        fn explanation_agrees_with_decision(role in proptest::option::of(any_role()), action in any_action()) {
            let c = match role {
                None => Caller::Anonymous,
                Some(r) => caller(r),
            };
            let e = explain_authorization(&c, action);
            prop_assert_eq!(e.granted, authorize(&c, action).is_ok());
        }
    }
}
