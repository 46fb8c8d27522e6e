//! Permission provider: builds the per-session permission snapshot.
//!
//! The bundle is derived entirely from the user's role on the server side.
//! It is rebuilt on every permission refresh and replaced wholesale; nothing
//! here mutates an existing bundle.

use serde_json::json;

use super::permission::{Condition, PermissionBundle, PermissionRule, WILDCARD_SUBJECT};
use crate::db::{Role, User};

/// Build the permission bundle for a user.
pub fn bundle_for_user(user: &User) -> PermissionBundle {
    match user.role {
        Role::Client => client_bundle(user),
        Role::Supplier => supplier_bundle(user),
        Role::Admin => admin_bundle(),
    }
}

/// Clients browse active services, create contracts, and manage their own
/// contracts and profile.
fn client_bundle(user: &User) -> PermissionBundle {
    PermissionBundle {
        can_create_contracts: true,
        rules: vec![
            PermissionRule::new("read", "services")
                .when(Condition::one_of("status", vec![json!("ACTIVE")])),
            PermissionRule::new("create", "contracts"),
            PermissionRule::for_actions(&["read", "cancel"], "contracts")
                .when(Condition::equals("clientId", user.id)),
            PermissionRule::for_actions(&["read", "update"], "profile")
                .when(Condition::equals("userId", user.id)),
        ],
        ..PermissionBundle::empty(Role::Client)
    }
}

/// Suppliers manage their own service listings, see and complete their own
/// contracts, and manage their own profile.
fn supplier_bundle(user: &User) -> PermissionBundle {
    PermissionBundle {
        rules: vec![
            PermissionRule::new("create", "services"),
            PermissionRule::for_actions(&["read", "update", "delete"], "services")
                .when(Condition::equals("supplierId", user.id)),
            PermissionRule::for_actions(&["read", "complete"], "contracts")
                .when(Condition::equals("supplierId", user.id)),
            PermissionRule::for_actions(&["read", "update"], "profile")
                .when(Condition::equals("userId", user.id)),
        ],
        ..PermissionBundle::empty(Role::Supplier)
    }
}

/// Admins bypass rule evaluation entirely; the flags and the manage-all
/// rule exist for UI gating, which never sees `is_admin` short-circuiting.
fn admin_bundle() -> PermissionBundle {
    PermissionBundle {
        is_admin: true,
        can_approve_suppliers: true,
        can_approve_services: true,
        can_create_contracts: true,
        can_view_reports: true,
        rules: vec![PermissionRule::new("manage", WILDCARD_SUBJECT)],
        ..PermissionBundle::empty(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::can;
    use serde_json::{Map, Value};

    fn user_with_role(id: i64, role: Role) -> User {
        User {
            id,
            email: format!("user{}@example.com", id),
            password: "hash".to_string(),
            display_name: "Test".to_string(),
            role,
            company: None,
            created_at: "2026-01-01 00:00:00".to_string(),
            last_login: None,
            is_active: true,
        }
    }

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_client_browses_active_services_only() {
        let bundle = bundle_for_user(&user_with_role(1, Role::Client));
        let active = data(serde_json::json!({"status": "ACTIVE"}));
        let pending = data(serde_json::json!({"status": "PENDING_APPROVAL"}));
        assert!(can(Some(&bundle), "read", "services", Some(&active)));
        assert!(!can(Some(&bundle), "read", "services", Some(&pending)));
    }

    #[test]
    fn test_client_owns_contracts() {
        let bundle = bundle_for_user(&user_with_role(1, Role::Client));
        assert!(can(Some(&bundle), "create", "contracts", None));

        let own = data(serde_json::json!({"clientId": 1}));
        let other = data(serde_json::json!({"clientId": 2}));
        assert!(can(Some(&bundle), "cancel", "contracts", Some(&own)));
        assert!(!can(Some(&bundle), "cancel", "contracts", Some(&other)));
    }

    #[test]
    fn test_client_cannot_approve() {
        let bundle = bundle_for_user(&user_with_role(1, Role::Client));
        assert!(!can(Some(&bundle), "approve", "suppliers", None));
        assert!(!can(Some(&bundle), "approve", "services", None));
        assert!(!can(Some(&bundle), "view", "reports", None));
    }

    #[test]
    fn test_supplier_owns_services() {
        let bundle = bundle_for_user(&user_with_role(5, Role::Supplier));
        assert!(can(Some(&bundle), "create", "services", None));

        let own = data(serde_json::json!({"supplierId": 5}));
        let other = data(serde_json::json!({"supplierId": 6}));
        assert!(can(Some(&bundle), "update", "services", Some(&own)));
        assert!(can(Some(&bundle), "delete", "services", Some(&own)));
        assert!(!can(Some(&bundle), "update", "services", Some(&other)));
    }

    #[test]
    fn test_supplier_completes_own_contracts() {
        let bundle = bundle_for_user(&user_with_role(5, Role::Supplier));
        let own = data(serde_json::json!({"supplierId": 5}));
        let other = data(serde_json::json!({"supplierId": 9}));
        assert!(can(Some(&bundle), "complete", "contracts", Some(&own)));
        assert!(!can(Some(&bundle), "complete", "contracts", Some(&other)));
    }

    #[test]
    fn test_supplier_cannot_create_contracts() {
        let bundle = bundle_for_user(&user_with_role(5, Role::Supplier));
        assert!(!bundle.can_create_contracts);
        assert!(!can(Some(&bundle), "create", "contracts", None));
    }

    #[test]
    fn test_admin_bundle_grants_everything() {
        let bundle = bundle_for_user(&user_with_role(99, Role::Admin));
        assert!(bundle.is_admin);
        assert!(bundle.can_approve_suppliers);
        assert!(bundle.can_approve_services);
        assert!(bundle.can_view_reports);
        assert!(can(Some(&bundle), "approve", "suppliers", None));
        assert!(can(Some(&bundle), "anything", "at-all", None));
    }

    #[test]
    fn test_bundles_differ_per_user_identity() {
        let a = bundle_for_user(&user_with_role(1, Role::Client));
        let b = bundle_for_user(&user_with_role(2, Role::Client));
        let contract = data(serde_json::json!({"clientId": 1}));
        assert!(can(Some(&a), "read", "contracts", Some(&contract)));
        assert!(!can(Some(&b), "read", "contracts", Some(&contract)));
    }
}
