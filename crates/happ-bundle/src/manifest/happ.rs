//! hApp manifest: named roles, each bound to one bundled DNA.

use super::{Extra, Nullable, OriginTime};
use rmpv::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HappManifest {
    pub manifest_version: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub description: Nullable<String>,
    pub roles: Vec<RoleManifest>,
    #[serde(flatten, default)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub provisioning: Nullable<CellProvisioning>,
    pub dna: RoleDnaManifest,
    #[serde(flatten, default)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDnaManifest {
    pub bundled: String,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub modifiers: Nullable<DnaModifiers>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub installed_hash: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub clone_limit: Nullable<u32>,
    #[serde(flatten, default)]
    pub extra: Extra,
}

impl RoleDnaManifest {
    /// Clone limit, 0 when not declared.
    pub fn clone_limit(&self) -> u32 {
        self.clone_limit.get().copied().unwrap_or(0)
    }
}

/// Overrides applied to a DNA when a role is instantiated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnaModifiers {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub network_seed: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub properties: Nullable<Value>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub origin_time: Nullable<OriginTime>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub quantum_time: Nullable<Value>,
    #[serde(flatten, default)]
    pub extra: Extra,
}

/// How the cell for a role is created at install time.
///
/// Encoded as a map tagged by `strategy`. Anything that is not exactly a
/// canonical `create` or `clone_only` map is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellProvisioning {
    Create { deferred: bool },
    CloneOnly,
    Other(Value),
}

impl Default for CellProvisioning {
    fn default() -> Self {
        Self::Create { deferred: false }
    }
}

impl CellProvisioning {
    /// The `strategy` tag, if the value carries one.
    pub fn strategy(&self) -> Option<&str> {
        match self {
            Self::Create { .. } => Some("create"),
            Self::CloneOnly => Some("clone_only"),
            Self::Other(value) => field(value, "strategy").and_then(Value::as_str),
        }
    }

    pub fn to_value(&self) -> Value {
        let strategy = (
            Value::from("strategy"),
            Value::from(self.strategy().unwrap_or_default()),
        );
        match self {
            Self::Create { deferred } => Value::Map(vec![
                strategy,
                (Value::from("deferred"), Value::Boolean(*deferred)),
            ]),
            Self::CloneOnly => Value::Map(vec![strategy]),
            Self::Other(value) => value.clone(),
        }
    }

    /// Classify a raw provisioning value; the typed form is used only
    /// when it encodes back to the same value.
    pub fn from_value(value: Value) -> Self {
        let known = match field(&value, "strategy").and_then(Value::as_str) {
            Some("create") => field(&value, "deferred")
                .and_then(Value::as_bool)
                .map(|deferred| Self::Create { deferred }),
            Some("clone_only") => Some(Self::CloneOnly),
            _ => None,
        };
        match known {
            Some(provisioning) if provisioning.to_value() == value => provisioning,
            _ => Self::Other(value),
        }
    }
}

fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .as_map()?
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}

impl Serialize for CellProvisioning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellProvisioning {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Value::from(k), v))
                .collect(),
        )
    }

    #[test]
    fn test_provisioning_known_strategies() {
        let create = map(vec![
            ("strategy", Value::from("create")),
            ("deferred", Value::Boolean(true)),
        ]);
        assert_eq!(
            CellProvisioning::from_value(create.clone()),
            CellProvisioning::Create { deferred: true }
        );
        assert_eq!(CellProvisioning::Create { deferred: true }.to_value(), create);

        let clone_only = map(vec![("strategy", Value::from("clone_only"))]);
        assert_eq!(
            CellProvisioning::from_value(clone_only),
            CellProvisioning::CloneOnly
        );
    }

    #[test]
    fn test_provisioning_unknown_strategy_kept() {
        let value = map(vec![
            ("strategy", Value::from("use_existing")),
            ("protected", Value::Boolean(true)),
        ]);
        let provisioning = CellProvisioning::from_value(value.clone());
        assert_eq!(provisioning.strategy(), Some("use_existing"));
        assert_eq!(provisioning.to_value(), value);
    }

    #[test]
    fn test_provisioning_create_with_extra_fields_kept() {
        // Missing `deferred` or extra keys: not canonical, so kept verbatim.
        let bare = map(vec![("strategy", Value::from("create"))]);
        assert_eq!(
            CellProvisioning::from_value(bare.clone()),
            CellProvisioning::Other(bare)
        );

        let extended = map(vec![
            ("strategy", Value::from("create")),
            ("deferred", Value::Boolean(false)),
            ("note", Value::from("x")),
        ]);
        let provisioning = CellProvisioning::from_value(extended.clone());
        assert_eq!(provisioning.strategy(), Some("create"));
        assert_eq!(provisioning.to_value(), extended);
    }

    #[test]
    fn test_clone_limit_defaults_to_zero() {
        let dna = RoleDnaManifest {
            bundled: "r.dna".into(),
            modifiers: Nullable::Absent,
            installed_hash: Nullable::Nil,
            clone_limit: Nullable::Absent,
            extra: Extra::new(),
        };
        assert_eq!(dna.clone_limit(), 0);
    }
}
