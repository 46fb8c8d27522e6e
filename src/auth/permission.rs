//! Rule-based permission evaluation.
//!
//! The engine is a pure function over an immutable [`PermissionBundle`]
//! snapshot: no I/O, no side effects, no suspension. Bundles are built by
//! the provider, replaced wholesale on refresh, and never mutated in place.
//!
//! Evaluation order: no bundle denies, admin bypasses, quick-check flags
//! short-circuit, then the ordered rule list is scanned and the first
//! (action, subject) match decides. No match at all denies.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::Role;

/// Subject that matches any requested subject.
pub const WILDCARD_SUBJECT: &str = "all";

/// A single condition on a rule, keyed by a field of the target data.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The data field must equal the value exactly.
    Equals { field: String, value: Value },
    /// The data field must appear in the value set.
    In { field: String, values: Vec<Value> },
}

impl Condition {
    /// Exact-equality condition.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Set-membership condition.
    pub fn one_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In {
            field: field.into(),
            values,
        }
    }

    /// The data field this condition inspects.
    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. } | Self::In { field, .. } => field,
        }
    }

    /// Check this condition against the target data.
    ///
    /// A field absent from the data never satisfies the condition.
    fn satisfied_by(&self, data: &Map<String, Value>) -> bool {
        match self {
            Self::Equals { field, value } => data.get(field) == Some(value),
            Self::In { field, values } => {
                data.get(field).is_some_and(|v| values.contains(v))
            }
        }
    }
}

/// An ordered authorization rule.
///
/// Rules are derived server-side from the user's role and are immutable for
/// the lifetime of one session snapshot. The first rule whose action and
/// subject match the request decides the outcome; later rules are never
/// consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionRule {
    /// Actions this rule covers (one or more).
    pub actions: Vec<String>,
    /// Subject this rule covers, or [`WILDCARD_SUBJECT`].
    pub subject: String,
    /// Conditions on the target data; empty means unconditional.
    pub conditions: Vec<Condition>,
    /// Invert the condition outcome (deny-if-match rules).
    pub inverted: bool,
}

impl PermissionRule {
    /// Unconditional rule for a single action.
    pub fn new(action: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            actions: vec![action.into()],
            subject: subject.into(),
            conditions: Vec::new(),
            inverted: false,
        }
    }

    /// Unconditional rule covering several actions.
    pub fn for_actions(actions: &[&str], subject: impl Into<String>) -> Self {
        Self {
            actions: actions.iter().map(|a| a.to_string()).collect(),
            subject: subject.into(),
            conditions: Vec::new(),
            inverted: false,
        }
    }

    /// Attach a condition.
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Invert the rule.
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    /// Whether this rule covers the requested (action, subject) pair.
    pub fn matches(&self, action: &str, subject: &str) -> bool {
        self.actions.iter().any(|a| a == action)
            && (self.subject == subject || self.subject == WILDCARD_SUBJECT)
    }

    /// Evaluate the matched rule against the target data.
    ///
    /// With no data the conditions cannot be checked and count as
    /// satisfied. The satisfied outcome is XOR'd with `inverted`.
    pub fn evaluate(&self, data: Option<&Map<String, Value>>) -> bool {
        let satisfied = match data {
            Some(data) if !self.conditions.is_empty() => {
                self.conditions.iter().all(|c| c.satisfied_by(data))
            }
            _ => true,
        };
        satisfied != self.inverted
    }
}

// Wire shape: {"action": "read" | ["read","update"], "subject": "...",
// "conditions": {"field": value, "field": {"$in": [...]}}, "inverted": true}
// with conditions/inverted omitted when empty/false.
impl Serialize for PermissionRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if self.actions.len() == 1 {
            map.serialize_entry("action", &self.actions[0])?;
        } else {
            map.serialize_entry("action", &self.actions)?;
        }
        map.serialize_entry("subject", &self.subject)?;
        if !self.conditions.is_empty() {
            let mut conditions = Map::new();
            for condition in &self.conditions {
                let value = match condition {
                    Condition::Equals { value, .. } => value.clone(),
                    Condition::In { values, .. } => {
                        let mut wrapper = Map::new();
                        wrapper.insert("$in".to_string(), Value::Array(values.clone()));
                        Value::Object(wrapper)
                    }
                };
                conditions.insert(condition.field().to_string(), value);
            }
            map.serialize_entry("conditions", &conditions)?;
        }
        if self.inverted {
            map.serialize_entry("inverted", &true)?;
        }
        map.end()
    }
}

/// Immutable per-session permission snapshot: resolved role, quick-check
/// flags, and the ordered rule list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionBundle {
    /// Resolved role.
    pub role: Role,
    /// Admin bypass: every check passes.
    pub is_admin: bool,
    /// Quick flag for (approve, suppliers).
    pub can_approve_suppliers: bool,
    /// Quick flag for (approve, services).
    pub can_approve_services: bool,
    /// Quick flag for (create, contracts).
    pub can_create_contracts: bool,
    /// Quick flag for (view, reports).
    pub can_view_reports: bool,
    /// Ordered rule list, scanned after the quick checks.
    pub rules: Vec<PermissionRule>,
}

impl PermissionBundle {
    /// Empty bundle for a role: no flags, no rules.
    pub fn empty(role: Role) -> Self {
        Self {
            role,
            is_admin: false,
            can_approve_suppliers: false,
            can_approve_services: false,
            can_create_contracts: false,
            can_view_reports: false,
            rules: Vec::new(),
        }
    }

    /// Look up the quick-check flag for an (action, subject) pair.
    ///
    /// Returns `None` for pairs outside the fixed table. A `false` flag
    /// does not deny; the caller falls through to the rule scan.
    pub fn quick_check(&self, action: &str, subject: &str) -> Option<bool> {
        match (action, subject) {
            ("approve", "suppliers") => Some(self.can_approve_suppliers),
            ("approve", "services") => Some(self.can_approve_services),
            ("create", "contracts") => Some(self.can_create_contracts),
            ("view", "reports") => Some(self.can_view_reports),
            _ => None,
        }
    }
}

/// Decide whether the caller may perform `action` on `subject`.
///
/// Pure function; never raises. A `false` result is turned into a denial
/// by the calling endpoint, not here.
pub fn can(
    bundle: Option<&PermissionBundle>,
    action: &str,
    subject: &str,
    data: Option<&Map<String, Value>>,
) -> bool {
    let Some(bundle) = bundle else {
        return false;
    };

    if bundle.is_admin {
        return true;
    }

    // Quick-check wins over the rule list when its flag is set; a false
    // flag falls through to the rules rather than denying.
    if bundle.quick_check(action, subject) == Some(true) {
        return true;
    }

    for rule in &bundle.rules {
        if rule.matches(action, subject) {
            return rule.evaluate(data);
        }
    }

    false
}
