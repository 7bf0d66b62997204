//! # Access Policy
//!
//! One declarative table decides which roles may perform which action on
//! which resource. Every HTTP handler asks [`authorize`] and nothing else.
//!
//! ## Policy Table
//! ```text
//! ┌──────────────────┬────────────┬─────────────────────────────────────┐
//! │ Resource         │ Action     │ Allowed (admin is always allowed)   │
//! ├──────────────────┼────────────┼─────────────────────────────────────┤
//! │ products         │ read       │ any authenticated                   │
//! │                  │ create/upd │ inventory                           │
//! │ customers        │ read       │ any authenticated                   │
//! │                  │ create/upd │ sales                               │
//! │ suppliers        │ read       │ any authenticated                   │
//! │                  │ create/upd │ purchase                            │
//! │ sales orders     │ read       │ any authenticated                   │
//! │                  │ create/upd │ sales                               │
//! │ purchase orders  │ read       │ any authenticated                   │
//! │                  │ create/upd │ purchase                            │
//! │ goods receipts   │ read       │ any authenticated                   │
//! │                  │ create     │ inventory, purchase                 │
//! │ invoices         │ read       │ any authenticated                   │
//! │                  │ create     │ sales                               │
//! │ reports          │ read       │ inventory                           │
//! │ users            │ *          │ (admin only)                        │
//! │ anything else    │ delete ... │ (admin only)                        │
//! └──────────────────┴────────────┴─────────────────────────────────────┘
//! ```
//! A (resource, action) pair missing from the table is admin-only.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Role;

// =============================================================================
// Resource / Action
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Users,
    Products,
    Customers,
    Suppliers,
    SalesOrders,
    PurchaseOrders,
    GoodsReceipts,
    Invoices,
    Reports,
}

impl Resource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Products => "products",
            Resource::Customers => "customers",
            Resource::Suppliers => "suppliers",
            Resource::SalesOrders => "sales orders",
            Resource::PurchaseOrders => "purchase orders",
            Resource::GoodsReceipts => "goods receipts",
            Resource::Invoices => "invoices",
            Resource::Reports => "reports",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Policy Table
// =============================================================================

/// Who, besides admin, may perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allow {
    /// Any authenticated user.
    Anyone,
    /// Only the listed roles.
    Roles(&'static [Role]),
}

struct Rule {
    resource: Resource,
    action: Action,
    allow: Allow,
}

const fn rule(resource: Resource, action: Action, allow: Allow) -> Rule {
    Rule {
        resource,
        action,
        allow,
    }
}

const INVENTORY: &[Role] = &[Role::Inventory];
const SALES: &[Role] = &[Role::Sales];
const PURCHASE: &[Role] = &[Role::Purchase];
const RECEIVING: &[Role] = &[Role::Inventory, Role::Purchase];

static POLICY: &[Rule] = &[
    rule(Resource::Products, Action::Read, Allow::Anyone),
    rule(Resource::Products, Action::Create, Allow::Roles(INVENTORY)),
    rule(Resource::Products, Action::Update, Allow::Roles(INVENTORY)),
    rule(Resource::Customers, Action::Read, Allow::Anyone),
    rule(Resource::Customers, Action::Create, Allow::Roles(SALES)),
    rule(Resource::Customers, Action::Update, Allow::Roles(SALES)),
    rule(Resource::Suppliers, Action::Read, Allow::Anyone),
    rule(Resource::Suppliers, Action::Create, Allow::Roles(PURCHASE)),
    rule(Resource::Suppliers, Action::Update, Allow::Roles(PURCHASE)),
    rule(Resource::SalesOrders, Action::Read, Allow::Anyone),
    rule(Resource::SalesOrders, Action::Create, Allow::Roles(SALES)),
    rule(Resource::SalesOrders, Action::Update, Allow::Roles(SALES)),
    rule(Resource::PurchaseOrders, Action::Read, Allow::Anyone),
    rule(Resource::PurchaseOrders, Action::Create, Allow::Roles(PURCHASE)),
    rule(Resource::PurchaseOrders, Action::Update, Allow::Roles(PURCHASE)),
    rule(Resource::GoodsReceipts, Action::Read, Allow::Anyone),
    rule(Resource::GoodsReceipts, Action::Create, Allow::Roles(RECEIVING)),
    rule(Resource::Invoices, Action::Read, Allow::Anyone),
    rule(Resource::Invoices, Action::Create, Allow::Roles(SALES)),
    rule(Resource::Reports, Action::Read, Allow::Roles(INVENTORY)),
];

/// Looks up the table entry for a (resource, action) pair.
///
/// ## Returns
/// * `Some(Allow)` - the pair is listed
/// * `None` - not listed, so only admin may do it
pub fn policy_for(resource: Resource, action: Action) -> Option<Allow> {
    POLICY
        .iter()
        .find(|r| r.resource == resource && r.action == action)
        .map(|r| r.allow)
}

/// Checks whether `role` may perform `action` on `resource`.
pub fn is_allowed(role: Role, resource: Resource, action: Action) -> bool {
    if role == Role::Admin {
        return true;
    }

    match policy_for(resource, action) {
        Some(Allow::Anyone) => true,
        Some(Allow::Roles(roles)) => roles.contains(&role),
        None => false,
    }
}

/// The single authorization check used by every protected route.
///
/// ## Example
/// ```rust
/// use kestrel_core::access::authorize;
/// use kestrel_core::{Action, Resource, Role};
///
/// assert!(authorize(Role::Sales, Resource::SalesOrders, Action::Create).is_ok());
/// assert!(authorize(Role::Sales, Resource::Products, Action::Delete).is_err());
/// ```
pub fn authorize(role: Role, resource: Resource, action: Action) -> CoreResult<()> {
    if is_allowed(role, resource, action) {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            role,
            resource,
            action,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 5] = [
        Role::Admin,
        Role::Sales,
        Role::Purchase,
        Role::Inventory,
        Role::Viewer,
    ];

    const ALL_RESOURCES: [Resource; 9] = [
        Resource::Users,
        Resource::Products,
        Resource::Customers,
        Resource::Suppliers,
        Resource::SalesOrders,
        Resource::PurchaseOrders,
        Resource::GoodsReceipts,
        Resource::Invoices,
        Resource::Reports,
    ];

    #[test]
    fn test_admin_is_always_allowed() {
        for resource in ALL_RESOURCES {
            for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
                assert!(is_allowed(Role::Admin, resource, action));
            }
        }
    }

    #[test]
    fn test_only_admin_deletes() {
        for role in ALL_ROLES.into_iter().filter(|r| *r != Role::Admin) {
            for resource in ALL_RESOURCES {
                assert!(
                    !is_allowed(role, resource, Action::Delete),
                    "{role} must not delete {resource}"
                );
            }
        }
    }

    #[test]
    fn test_mutation_gates_follow_department() {
        assert!(is_allowed(Role::Inventory, Resource::Products, Action::Create));
        assert!(!is_allowed(Role::Sales, Resource::Products, Action::Update));

        assert!(is_allowed(Role::Sales, Resource::Customers, Action::Update));
        assert!(is_allowed(Role::Sales, Resource::Invoices, Action::Create));
        assert!(!is_allowed(Role::Purchase, Resource::SalesOrders, Action::Create));

        assert!(is_allowed(Role::Purchase, Resource::Suppliers, Action::Create));
        assert!(is_allowed(Role::Purchase, Resource::PurchaseOrders, Action::Update));
        assert!(is_allowed(Role::Purchase, Resource::GoodsReceipts, Action::Create));
        assert!(is_allowed(Role::Inventory, Resource::GoodsReceipts, Action::Create));
        assert!(!is_allowed(Role::Sales, Resource::GoodsReceipts, Action::Create));
    }

    #[test]
    fn test_viewer_reads_but_never_writes() {
        assert!(is_allowed(Role::Viewer, Resource::Products, Action::Read));
        assert!(is_allowed(Role::Viewer, Resource::Invoices, Action::Read));
        for resource in ALL_RESOURCES {
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert!(!is_allowed(Role::Viewer, resource, action));
            }
        }
    }

    #[test]
    fn test_reports_and_users_are_restricted() {
        assert!(is_allowed(Role::Inventory, Resource::Reports, Action::Read));
        assert!(!is_allowed(Role::Sales, Resource::Reports, Action::Read));
        assert!(!is_allowed(Role::Viewer, Resource::Users, Action::Read));
        assert!(policy_for(Resource::Users, Action::Read).is_none());
    }

    #[test]
    fn test_authorize_reports_forbidden() {
        let err = authorize(Role::Viewer, Resource::Products, Action::Create).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Forbidden {
                role: Role::Viewer,
                resource: Resource::Products,
                action: Action::Create,
            }
        ));
    }
}
