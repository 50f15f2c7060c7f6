//! [crate::properties] holds the descriptor types the remote management agent supplies for each
//! managed object, in the shape of a Jolokia `list` response, plus the invoke-rights resolution
//! over them.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Domain name -> raw property list -> descriptor.
pub type Catalog = BTreeMap<String, BTreeMap<String, MBeanInfo>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInfo {
    #[serde(default, rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default)]
    pub rw: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationInfo {
    #[serde(default)]
    pub args: Vec<ArgInfo>,
    #[serde(default)]
    pub ret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(
        default,
        rename = "canInvoke",
        skip_serializing_if = "Option::is_none"
    )]
    pub can_invoke: Option<bool>,
}

impl OperationInfo {
    pub fn invokable(&self) -> bool {
        self.can_invoke.unwrap_or(true)
    }

    /// `name(type1,type2)`, the key format of [MBeanInfo::op_by_string].
    pub fn signature(&self, name: &str) -> String {
        let args = self
            .args
            .iter()
            .map(|arg| arg.type_name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        format!("{name}({args})")
    }
}

/// An operation name maps either to one descriptor or, when overloaded, to a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationEntry {
    Overloaded(Vec<OperationInfo>),
    Single(OperationInfo),
}

impl OperationEntry {
    /// A set of overloads is invokable only if every overload is.
    pub fn invokable(&self) -> bool {
        match self {
            OperationEntry::Single(op) => op.invokable(),
            OperationEntry::Overloaded(ops) => ops.iter().all(OperationInfo::invokable),
        }
    }

    pub fn overloads(&self) -> &[OperationInfo] {
        match self {
            OperationEntry::Single(op) => std::slice::from_ref(op),
            OperationEntry::Overloaded(ops) => ops,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MBeanInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default)]
    pub attr: BTreeMap<String, AttributeInfo>,
    #[serde(default)]
    pub op: BTreeMap<String, OperationEntry>,
    #[serde(
        default,
        rename = "canInvoke",
        skip_serializing_if = "Option::is_none"
    )]
    pub can_invoke: Option<bool>,
    /// RBAC decoration keyed by exact signature, e.g. `"stop()"` or `"start(int)"`.
    #[serde(
        default,
        rename = "opByString",
        skip_serializing_if = "Option::is_none"
    )]
    pub op_by_string: Option<BTreeMap<String, OperationInfo>>,
}

impl MBeanInfo {
    pub fn has_operations<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|name| self.op.contains_key(name.as_ref()))
    }

    /// The descriptor for an exact signature: the `opByString` entry when the agent sent one,
    /// otherwise the overload in `op` whose argument types spell out the same signature.
    pub fn operation_by_signature(&self, signature: &str) -> Option<&OperationInfo> {
        if let Some(op) = self.op_by_string.as_ref().and_then(|ops| ops.get(signature)) {
            return Some(op);
        }
        let (name, _) = signature.split_once('(')?;
        self.op
            .get(name)?
            .overloads()
            .iter()
            .find(|op| op.signature(name) == signature)
    }

    /// Resolve whether every method in `methods` may be invoked.
    ///
    /// Methods are identified either by simple name (`"stop"`) or by exact signature
    /// (`"start(int)"`). Unset flags and operations that cannot be found count as invokable.
    pub fn can_invoke_all<S: AsRef<str>>(&self, methods: &[S]) -> bool {
        if !self.can_invoke.unwrap_or(true) {
            return false;
        }
        methods.iter().all(|method| {
            let method = method.as_ref();
            if method.contains('(') {
                match self.operation_by_signature(method) {
                    Some(op) => op.invokable(),
                    None => {
                        tracing::trace!("No operation with signature {method}, allowing");
                        true
                    }
                }
            } else {
                match self.op.get(method) {
                    Some(entry) => entry.invokable(),
                    None => {
                        tracing::trace!("No operation named {method}, allowing");
                        true
                    }
                }
            }
        })
    }
}

/// The remote object a tree node stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIdentity {
    /// `domain:property-list`, exactly as the agent named it.
    pub object_name: String,
    pub info: MBeanInfo,
}

impl RemoteIdentity {
    pub fn new(object_name: impl Into<String>, info: MBeanInfo) -> Self {
        RemoteIdentity {
            object_name: object_name.into(),
            info,
        }
    }

    pub fn domain(&self) -> &str {
        self.object_name
            .split_once(':')
            .map(|(domain, _)| domain)
            .unwrap_or(&self.object_name)
    }

    /// Explicitly denied, as opposed to unknown.
    pub fn is_locked(&self) -> bool {
        self.info.can_invoke == Some(false)
    }
}
