use std::{collections::BTreeMap, convert::TryFrom, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::Attributes;

/// A role rule that is not of the form `attribute=value`
#[derive(Debug, Error)]
#[error("invalid role rule {rule:?}: expected `attribute=value`")]
pub struct InvalidRoleRule {
    rule: String,
}

/// A condition on a raw user attribute granting a role
///
/// The rule matches when the attribute equals the value, or when the
/// attribute is an array holding the value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoleRuleDto")]
pub struct RoleRule {
    attribute: String,
    value: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoleRuleDto {
    Short(String),
    Full { attribute: String, value: Value },
}

impl TryFrom<RoleRuleDto> for RoleRule {
    type Error = InvalidRoleRule;

    fn try_from(dto: RoleRuleDto) -> Result<Self, Self::Error> {
        match dto {
            RoleRuleDto::Short(rule) => rule.parse(),
            RoleRuleDto::Full { attribute, value } => Ok(Self::new(attribute, value)),
        }
    }
}

impl RoleRule {
    /// Constructs a rule matching `attribute` against `value`
    pub fn new(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Checks the rule against the raw attributes of a user
    pub fn matches(&self, raw: &Attributes) -> bool {
        match raw.get(&self.attribute) {
            Some(Value::Array(items)) => items.contains(&self.value),
            Some(value) => *value == self.value,
            None => false,
        }
    }
}

impl FromStr for RoleRule {
    type Err = InvalidRoleRule;

    /// Parses the short `attribute=value` form, where the value is a string
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((attribute, value)) if !attribute.trim().is_empty() => {
                Ok(Self::new(attribute.trim(), value.trim()))
            }
            _ => Err(InvalidRoleRule { rule: s.to_owned() }),
        }
    }
}

impl fmt::Display for RoleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(value) => write!(f, "{}={}", self.attribute, value),
            value => write!(f, "{}={}", self.attribute, value),
        }
    }
}

/// Assigns roles to a user from its raw identity-store attributes
///
/// Each role is granted when any one of its rules matches.
///
/// ```
/// use warrant_identity::RoleMapper;
///
/// # fn main() -> Result<(), serde_json::Error> {
/// let mapper: RoleMapper = serde_json::from_str(r#"{
///     "admin": ["username=root", { "attribute": "groups", "value": "wheel" }],
///     "auditor": ["department=compliance"]
/// }"#)?;
///
/// let raw = serde_json::json!({ "username": "jdoe", "groups": ["staff", "wheel"] });
/// let roles = mapper.apply(raw.as_object().unwrap());
/// assert_eq!(roles, vec!["admin".to_owned()]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMapper {
    roles: BTreeMap<String, Vec<RoleRule>>,
}

impl RoleMapper {
    /// Constructs a mapper assigning no roles
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `role` to users matching `rule`
    pub fn grant(mut self, role: impl Into<String>, rule: RoleRule) -> Self {
        self.roles.entry(role.into()).or_default().push(rule);
        self
    }

    /// The roles granted to a user, sorted and without duplicates
    pub fn apply(&self, raw: &Attributes) -> Vec<String> {
        self.roles
            .iter()
            .filter(|(_, rules)| rules.iter().any(|rule| rule.matches(raw)))
            .map(|(role, _)| role.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn parses_short_rule() {
        let rule: RoleRule = "department = engineering".parse().unwrap();
        assert_eq!(rule, RoleRule::new("department", "engineering"));
        assert_eq!(rule.to_string(), "department=engineering");
    }

    #[test]
    fn rejects_rule_without_attribute() {
        assert!("=engineering".parse::<RoleRule>().is_err());
        assert!("engineering".parse::<RoleRule>().is_err());
    }

    #[test]
    fn matches_scalar_and_array_attributes() {
        let user = raw(json!({ "level": 3, "groups": ["dev", "ops"] }));

        assert!(RoleRule::new("level", 3).matches(&user));
        assert!(!RoleRule::new("level", "3").matches(&user));
        assert!(RoleRule::new("groups", "ops").matches(&user));
        assert!(!RoleRule::new("groups", "sec").matches(&user));
        assert!(!RoleRule::new("missing", "x").matches(&user));
    }

    #[test]
    fn grants_each_role_once_in_order() {
        let mapper = RoleMapper::new()
            .grant("writer", RoleRule::new("groups", "dev"))
            .grant("writer", RoleRule::new("groups", "ops"))
            .grant("admin", RoleRule::new("username", "root"))
            .grant("reader", RoleRule::new("groups", "ops"));

        let roles = mapper.apply(&raw(json!({ "username": "jdoe", "groups": ["dev", "ops"] })));
        assert_eq!(roles, vec!["reader".to_owned(), "writer".to_owned()]);
    }

    #[test]
    fn invalid_configured_rule_is_rejected() {
        let mapper = serde_json::from_value::<RoleMapper>(json!({ "admin": ["root"] }));
        assert!(mapper.is_err());
    }
}
