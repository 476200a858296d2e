//! Provider options.

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::internal::MAX_DEPTH;

/// Resolution policy of a built provider.
///
/// The root provider self-binds unregistered concrete types by default;
/// scopes do not, so a scope only answers for types that have a
/// registration.
///
/// ```
/// use ferrous_activator::ProviderOptions;
///
/// let options = ProviderOptions::default()
///     .allow_self_binding_in_scope(true)
///     .max_depth(64);
/// assert!(options.self_binding_in_root);
/// assert!(options.self_binding_in_scope);
/// assert_eq!(options.max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ProviderOptions {
    /// Construct unregistered concrete types requested from the root.
    pub self_binding_in_root: bool,
    /// Construct unregistered concrete types requested from a scope.
    pub self_binding_in_scope: bool,
    /// Deepest allowed construction stack.
    pub max_depth: usize,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            self_binding_in_root: true,
            self_binding_in_scope: false,
            max_depth: MAX_DEPTH,
        }
    }
}

impl ProviderOptions {
    pub fn allow_self_binding_in_root(mut self, allow: bool) -> Self {
        self.self_binding_in_root = allow;
        self
    }

    pub fn allow_self_binding_in_scope(mut self, allow: bool) -> Self {
        self.self_binding_in_scope = allow;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Reads options from JSON. Missing fields keep their defaults.
    ///
    /// ```
    /// # #[cfg(feature = "config")]
    /// # {
    /// use ferrous_activator::ProviderOptions;
    ///
    /// let options = ProviderOptions::from_json_str(r#"{ "self_binding_in_scope": true }"#).unwrap();
    /// assert!(options.self_binding_in_root);
    /// assert!(options.self_binding_in_scope);
    /// # }
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
