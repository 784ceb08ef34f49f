//! Well-known deployment variables and values computed from them.
//!
//! Responsibilities:
//! - Detect which deployment product produced the environment.
//! - List the default variable names recorded for each product.
//! - Compute `TaskSequenceName`, `DeploymentProduct` and `DeploymentUser`.
//!
//! Invariants:
//! - The product is ConfigMgr exactly when `_SMSTSMP` is present and non-empty.
//! - A computed value, when available, replaces the source value of the
//!   same name.

use std::fmt;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Serialize;

use crate::names::sort_names;
use crate::source::VariableSource;

/// Variable whose presence marks a ConfigMgr task sequence.
pub const PRODUCT_MARKER: &str = "_SMSTSMP";

/// Variable holding the task sequence XML.
pub const TASK_SEQUENCE_XML: &str = "_SMSTSTaskSequence";

/// Variables recorded for ConfigMgr task sequences.
pub const CONFIGMGR_NAMES: &[&str] = &[
    "_SMSTSAdvertID",
    "_SMSTSBootImageID",
    "_SMSTSBootUEFI",
    "_SMSTSClientGUID",
    "_SMSTSLaunchMode",
    "_SMSTSMachineName",
    "_SMSTSMediaType",
    "_SMSTSMP",
    "_SMSTSPackageID",
    "_SMSTSPackageName",
    "_SMSTSSiteCode",
    "_SMSTSUserStarted",
    "OSDComputerName",
];

/// Variables recorded for MDT Lite Touch deployments.
pub const MDT_NAMES: &[&str] = &[
    "Architecture",
    "AssetTag",
    "BuildID",
    "BuildName",
    "BuildVersion",
    "DeploymentMethod",
    "DeploymentType",
    "DeployRoot",
    "IsDesktop",
    "IsLaptop",
    "IsServer",
    "IsVM",
    "Make",
    "Model",
    "OSCurrentBuild",
    "OSCurrentVersion",
    "OSDComputerName",
    "Product",
    "SerialNumber",
    "TaskSequenceID",
    "TaskSequenceName",
    "TaskSequenceVersion",
    "UUID",
];

/// Names whose values are derived rather than read.
pub const COMPUTED_NAMES: &[&str] = &["DeploymentProduct", "DeploymentUser", "TaskSequenceName"];

static SEQUENCE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<sequence\b[^>]*?\bname\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("pattern is a compile-time constant with valid syntax")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#x([0-9a-fA-F]+)|#([0-9]+)|(amp|lt|gt|quot|apos));")
        .expect("pattern is a compile-time constant with valid syntax")
});

/// The deployment product driving the task sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeploymentProduct {
    ConfigMgr,
    Mdt,
}

impl DeploymentProduct {
    /// Detect the product from the marker variable.
    pub fn detect(source: &dyn VariableSource) -> Self {
        match source.get(PRODUCT_MARKER) {
            Some(value) if !value.trim().is_empty() => DeploymentProduct::ConfigMgr,
            _ => DeploymentProduct::Mdt,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeploymentProduct::ConfigMgr => "ConfigMgr",
            DeploymentProduct::Mdt => "MDT",
        }
    }

    /// Product variables plus computed names, sorted and deduplicated.
    pub fn default_names(self) -> Vec<String> {
        let product_names = match self {
            DeploymentProduct::ConfigMgr => CONFIGMGR_NAMES,
            DeploymentProduct::Mdt => MDT_NAMES,
        };
        let mut names: Vec<String> = product_names
            .iter()
            .chain(COMPUTED_NAMES)
            .map(|name| (*name).to_string())
            .collect();
        sort_names(&mut names);
        names
    }
}

impl fmt::Display for DeploymentProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Value of a computed name, or `None` when it cannot be derived.
pub fn computed_value(
    name: &str,
    product: DeploymentProduct,
    source: &dyn VariableSource,
) -> Option<String> {
    match name {
        "DeploymentProduct" => Some(product.label().to_string()),
        "DeploymentUser" => deployment_user(source),
        "TaskSequenceName" => source
            .get(TASK_SEQUENCE_XML)
            .and_then(|xml| task_sequence_name(&xml)),
        _ => None,
    }
}

/// Name attribute of the root `<sequence>` element, entities decoded.
pub fn task_sequence_name(xml: &str) -> Option<String> {
    let captures = SEQUENCE_NAME_RE.captures(xml)?;
    let raw = captures.get(1).or_else(|| captures.get(2))?.as_str();
    Some(decode_entities(raw))
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let code_point = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse::<u32>().ok()
            } else {
                None
            };

            if let Some(code_point) = code_point {
                return char::from_u32(code_point)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string());
            }

            match caps.get(3).map(|m| m.as_str()) {
                Some("amp") => "&".to_string(),
                Some("lt") => "<".to_string(),
                Some("gt") => ">".to_string(),
                Some("quot") => "\"".to_string(),
                Some("apos") => "'".to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// `DOMAIN\user` assembled from the base64 `UserDomain` and `UserID` values.
fn deployment_user(source: &dyn VariableSource) -> Option<String> {
    let user = decode_base64_var(source, "UserID")?;
    match decode_base64_var(source, "UserDomain") {
        Some(domain) => Some(format!("{domain}\\{user}")),
        None => Some(user),
    }
}

fn decode_base64_var(source: &dyn VariableSource, name: &str) -> Option<String> {
    let encoded = source.get(name)?;
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return None;
    }
    match STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    {
        Some(decoded) if !decoded.trim().is_empty() => Some(decoded.trim().to_string()),
        Some(_) => None,
        None => {
            tracing::debug!(name = %name, "Variable is not valid base64 text; ignoring");
            None
        }
    }
}
