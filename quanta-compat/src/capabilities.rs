//! Optional capability descriptor
//!
//! Which optional backends a build can use is decided once, at startup,
//! and carried around as a plain `Capabilities` value. Nothing here is
//! global: callers hand the descriptor to whatever needs it.

use std::env;
use std::sync::Once;

use quanta_core::Value;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::version::{normalize_version, version_at_least};

/// Array backend compiled in with the `array` feature
pub const ARRAY_BACKEND: &str = "ndarray";

/// Pinned to the workspace dependency
pub const ARRAY_BACKEND_VERSION: &str = "0.15.6";

/// First locale backend release that can format units
const LOCALE_MIN_VERSION: (u64, u64) = (2, 6);

/// Tabular interop is only known to work against this release line
const TABULAR_PINNED_PREFIX: &str = "0.25";

/// Logged once per process when array dispatch is on
pub const BEHAVIOR_CHANGE_NOTICE: &str = "\
Array operations on quantities now dispatch through the array protocol. \
Operations without a unit-aware implementation fail instead of making \
assumptions about units, and joining functions such as concatenate return \
quantities where they used to return bare arrays. \
Set QUANTA_ARRAY_DISPATCH=0 to opt out.";

static BEHAVIOR_NOTICE: Once = Once::new();

/// Environment variables read by [`Capabilities::from_env`]
pub mod vars {
    pub const ARRAY: &str = "QUANTA_ARRAY";
    pub const ARRAY_DISPATCH: &str = "QUANTA_ARRAY_DISPATCH";
    pub const LOCALE_VERSION: &str = "QUANTA_LOCALE_VERSION";
    pub const TABULAR_VERSION: &str = "QUANTA_TABULAR_VERSION";
    pub const UNCERTAINTY: &str = "QUANTA_UNCERTAINTY";
    pub const TEST_FRAMEWORK: &str = "QUANTA_TEST_FRAMEWORK";
}

/// A named backend at a specific version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    pub name: String,
    pub version: String,
}

impl Backend {
    /// Create a backend, normalizing development versions
    pub fn new(name: impl Into<String>, version: &str) -> Self {
        Backend { name: name.into(), version: normalize_version(version) }
    }

    /// The array backend this build carries
    pub fn compiled_array() -> Option<Self> {
        if cfg!(feature = "array") {
            Some(Backend::new(ARRAY_BACKEND, ARRAY_BACKEND_VERSION))
        } else {
            None
        }
    }
}

/// Presence of an optional backend that may be installed at an unusable version
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Support {
    #[default]
    Missing,
    /// Present, but too old (or too new) to be used
    Incompatible { version: String },
    Available { version: String },
}

impl Support {
    /// Present at any version
    pub fn is_present(&self) -> bool {
        !matches!(self, Support::Missing)
    }

    /// Present at a usable version
    pub fn is_available(&self) -> bool {
        matches!(self, Support::Available { .. })
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Support::Missing => None,
            Support::Incompatible { version } | Support::Available { version } => Some(version),
        }
    }

    fn classify(version: Option<&str>, usable: impl Fn(&str) -> bool) -> Self {
        match version.map(normalize_version) {
            None => Support::Missing,
            Some(version) if usable(&version) => Support::Available { version },
            Some(version) => Support::Incompatible { version },
        }
    }
}

/// Kinds of value that count as numeric for a given descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericKind {
    Int,
    Float,
    Decimal,
    Array,
}

const SCALAR_KINDS: [NumericKind; 3] = [NumericKind::Int, NumericKind::Float, NumericKind::Decimal];
const ARRAY_KINDS: [NumericKind; 4] = [
    NumericKind::Int,
    NumericKind::Float,
    NumericKind::Decimal,
    NumericKind::Array,
];

/// Optional capabilities available to this process
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    array: Option<Backend>,
    array_dispatch: bool,
    locale: Support,
    uncertainty: bool,
    tabular: Support,
    test_framework: bool,
}

impl Capabilities {
    /// Nothing optional is available
    pub fn none() -> Self {
        Self::default()
    }

    /// What this build carries: the array backend when compiled in, with
    /// array dispatch on whenever arrays are.
    pub fn compiled() -> Self {
        let array = Backend::compiled_array();
        let array_dispatch = array.is_some();
        Self { array, array_dispatch, ..Self::default() }
    }

    /// Compiled capabilities with environment overrides, resolved.
    /// Call once at startup and pass the result along.
    pub fn detect() -> Self {
        Self::from_env(Self::compiled()).resolve()
    }

    // ========== Builders ==========

    pub fn with_array(mut self, backend: Option<Backend>) -> Self {
        if backend.is_none() {
            self.array_dispatch = false;
        }
        self.array = backend;
        self
    }

    pub fn without_array(self) -> Self {
        self.with_array(None)
    }

    /// Dispatch needs an array backend; without one this stays off
    pub fn with_array_dispatch(mut self, enabled: bool) -> Self {
        self.array_dispatch = enabled && self.array.is_some();
        self
    }

    /// Declare the installed locale backend version, if any
    pub fn with_locale(mut self, version: Option<&str>) -> Self {
        let (major, minor) = LOCALE_MIN_VERSION;
        self.locale = Support::classify(version, |v| version_at_least(v, major, minor));
        self
    }

    /// Declare the installed tabular backend version, if any
    pub fn with_tabular(mut self, version: Option<&str>) -> Self {
        self.tabular = Support::classify(version, |v| v.starts_with(TABULAR_PINNED_PREFIX));
        self
    }

    pub fn with_uncertainty(mut self, enabled: bool) -> Self {
        self.uncertainty = enabled;
        self
    }

    pub fn with_test_framework(mut self, enabled: bool) -> Self {
        self.test_framework = enabled;
        self
    }

    // ========== Configuration ==========

    /// Apply `QUANTA_*` overrides from the process environment
    pub fn from_env(base: Capabilities) -> Self {
        Self::from_lookup(base, |key| env::var(key).ok())
    }

    /// Apply `QUANTA_*` overrides read through `lookup`.
    /// Unset variables leave `base` untouched.
    pub fn from_lookup<F>(base: Capabilities, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).and_then(|raw| parse_flag(key, &raw));
        let mut caps = base;

        match flag(vars::ARRAY) {
            Some(false) => caps = caps.without_array(),
            Some(true) if caps.array.is_none() => match Backend::compiled_array() {
                Some(backend) => caps = caps.with_array(Some(backend)),
                None => warn!("{}=1 ignored: array support is not compiled in", vars::ARRAY),
            },
            _ => {}
        }

        if let Some(enabled) = flag(vars::ARRAY_DISPATCH) {
            caps = caps.with_array_dispatch(enabled);
        }
        if let Some(version) = lookup(vars::LOCALE_VERSION) {
            caps = caps.with_locale(Some(&version));
        }
        if let Some(version) = lookup(vars::TABULAR_VERSION) {
            caps = caps.with_tabular(Some(&version));
        }
        if let Some(enabled) = flag(vars::UNCERTAINTY) {
            caps = caps.with_uncertainty(enabled);
        }
        if let Some(enabled) = flag(vars::TEST_FRAMEWORK) {
            caps = caps.with_test_framework(enabled);
        }

        caps
    }

    /// Finalize the descriptor: log it, and announce array dispatch once
    pub fn resolve(self) -> Self {
        match serde_json::to_string(&self) {
            Ok(json) => debug!(capabilities = %json, "resolved capabilities"),
            Err(e) => debug!(error = %e, "resolved capabilities (unserializable)"),
        }
        self.announce_dispatch(&BEHAVIOR_NOTICE);
        self
    }

    fn announce_dispatch(&self, notice: &Once) {
        if self.array_dispatch {
            notice.call_once(|| warn!("{}", BEHAVIOR_CHANGE_NOTICE));
        }
    }

    // ========== Queries ==========

    pub fn has_array(&self) -> bool {
        self.array.is_some()
    }

    pub fn array_backend(&self) -> Option<&Backend> {
        self.array.as_ref()
    }

    pub fn array_dispatch(&self) -> bool {
        self.array_dispatch
    }

    pub fn locale(&self) -> &Support {
        &self.locale
    }

    pub fn has_locale(&self) -> bool {
        self.locale.is_present()
    }

    pub fn has_proper_locale(&self) -> bool {
        self.locale.is_available()
    }

    pub fn tabular(&self) -> &Support {
        &self.tabular
    }

    pub fn has_tabular(&self) -> bool {
        self.tabular.is_present()
    }

    pub fn has_proper_tabular(&self) -> bool {
        self.tabular.is_available()
    }

    pub fn has_uncertainty(&self) -> bool {
        self.uncertainty
    }

    pub fn has_test_framework(&self) -> bool {
        self.test_framework
    }

    /// Value kinds accepted as numeric
    pub fn numeric_kinds(&self) -> &'static [NumericKind] {
        if self.has_array() {
            &ARRAY_KINDS
        } else {
            &SCALAR_KINDS
        }
    }

    pub fn is_numeric(&self, value: &Value) -> bool {
        let kind = match value {
            Value::Int(_) => NumericKind::Int,
            Value::Float(_) => NumericKind::Float,
            Value::Decimal(_) => NumericKind::Decimal,
            #[cfg(feature = "array")]
            Value::Array(_) => NumericKind::Array,
            _ => return false,
        };
        self.numeric_kinds().contains(&kind)
    }
}

/// Parse a boolean configuration value; anything unrecognized is ignored
fn parse_flag(key: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        other => {
            warn!("ignoring {}={:?}: expected a boolean", key, other);
            None
        }
    }
}
