/// Output record structures for converted rules
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Typed value of a single rule option.
///
/// Snort option values are heterogeneous: a bare flag (`nocase;`) carries no
/// value, `sid:17152` is numeric, `window:0.5` fractional, and everything else
/// is text. Coercion is a total function of the raw string: integer parse
/// first, then float, then the de-quoted string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl OptionValue {
    /// Coerce a raw (already de-quoted) option value to its typed form.
    pub fn coerce(raw: &str) -> OptionValue {
        if let Ok(n) = raw.parse::<i64>() {
            OptionValue::Int(n)
        } else if let Ok(f) = raw.parse::<f64>() {
            OptionValue::Float(f)
        } else {
            OptionValue::Str(raw.to_string())
        }
    }

    /// Integer view used by metadata extraction: integers pass through,
    /// strings go through a decimal parse, everything else is ignored.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            OptionValue::Str(s) => s.parse::<i64>().ok(),
            _ => None,
        }
    }

    /// String view: only genuine string values, no number formatting.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Float(x) => write!(f, "{}", x),
            OptionValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Option map for one rule. BTreeMap keeps serialization deterministic;
/// duplicate keys in the source collapse last-write-wins.
pub type OptionMap = BTreeMap<String, OptionValue>;

/// Port lists derived from the source/destination port fields.
///
/// Tokens stay textual: a range like `139:445` or a variable like
/// `$HTTP_PORTS` is carried as-is, not expanded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortInfo {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub destination_ports: Vec<String>,
}

impl PortInfo {
    /// Derive port lists from the raw port fields of a rule.
    ///
    /// A field that is literally `any` contributes nothing. Returns `None`
    /// when both sides end up empty, so the record serializes with the key
    /// absent rather than present-but-empty.
    pub fn from_fields(source_port: &str, dest_port: &str) -> Option<PortInfo> {
        let mut info = PortInfo::default();

        if source_port != "any" {
            info.source_ports = split_port_list(source_port);
        }
        if dest_port != "any" {
            info.destination_ports = split_port_list(dest_port);
        }

        if info.source_ports.is_empty() && info.destination_ports.is_empty() {
            None
        } else {
            Some(info)
        }
    }
}

/// Split a port field into its textual tokens: strip one enclosing bracket
/// pair, split on commas, trim each token.
fn split_port_list(field: &str) -> Vec<String> {
    let inner = field
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(field);

    inner.split(',').map(|p| p.trim().to_string()).collect()
}

/// Metadata extracted from well-known options (sid, rev, reference,
/// classtype). Zero/empty fields are omitted from the JSON output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleMetadata {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cves: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub sid: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub revision: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub severity: String,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl RuleMetadata {
    /// Derive metadata from the typed option map. Returns `None` when no
    /// field ends up populated.
    pub fn from_options(options: &OptionMap) -> Option<RuleMetadata> {
        let mut metadata = RuleMetadata::default();

        if let Some(sid) = options.get("sid").and_then(OptionValue::as_int) {
            metadata.sid = sid;
        }

        if let Some(rev) = options.get("rev").and_then(OptionValue::as_int) {
            metadata.revision = rev;
        }

        if let Some(reference) = options.get("reference").and_then(OptionValue::as_str) {
            if let Some(cve) = reference.strip_prefix("cve,") {
                metadata.cves.push(cve.to_string());
            }
            metadata.references.push(reference.to_string());
        }

        if let Some(classtype) = options.get("classtype").and_then(OptionValue::as_str) {
            metadata.severity = classtype.to_string();
        }

        if metadata == RuleMetadata::default() {
            None
        } else {
            Some(metadata)
        }
    }
}

/// One converted rule, serialized as a single NDJSON line.
///
/// The seven addressing fields are verbatim copies of the source tokens:
/// variables (`$HOME_NET`), CIDR blocks and `[...]` lists pass through
/// unmodified. `parsed_ports` and `metadata` are derived views and are
/// omitted entirely (not `null`) when they would carry no information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleRecord {
    pub action: String,
    pub protocol: String,
    pub source_ip: String,
    pub source_port: String,
    pub direction: String,
    pub dest_ip: String,
    pub dest_port: String,
    pub options: OptionMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_ports: Option<PortInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RuleMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_rule: Option<String>,
}

impl RuleRecord {
    /// Signature ID, when one was extracted.
    pub fn sid(&self) -> Option<i64> {
        self.metadata.as_ref().map(|m| m.sid)
    }
}
