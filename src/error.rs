//! Error types for the dependency injection container.

use std::fmt::Write as _;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error accepted from fallible constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared error cause carried by [`DiError::Construction`].
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// One line of an unsatisfiable-constructor report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorReport {
    /// Rendered signature, e.g. `Greeter(Clock, Config)`.
    pub signature: String,
    /// Parameter types that could not be resolved.
    pub missing: Vec<&'static str>,
}

/// Dependency injection errors.
///
/// Every variant is local to the failing call: nothing is retried and no
/// cache keeps a partial entry, so a later resolution may try again.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{DiError, ServiceCollection, Resolver};
///
/// struct Unregistered;
///
/// let provider = ServiceCollection::new().build().unwrap();
/// match provider.get_required::<Unregistered>() {
///     Err(DiError::NotFound(name)) => assert!(name.ends_with("Unregistered")),
///     _ => unreachable!(),
/// }
///
/// let circular = DiError::Circular(vec!["A", "B", "A"]);
/// assert_eq!(circular.to_string(), "Circular dependency: A -> B -> A");
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// No descriptor matches and the type may not be self-bound here.
    #[error("Service not found: {0}")]
    NotFound(&'static str),

    /// Two or more unrelated produced types compete for one request.
    #[error(
        "Ambiguous assignment for {requested}. Candidates produce: {}",
        .candidates.join(", ")
    )]
    Ambiguous {
        requested: &'static str,
        candidates: Vec<&'static str>,
    },

    /// A type was requested while already under construction (includes path).
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),

    /// No constructor can be satisfied and there is no zero-argument one.
    #[error("No resolvable constructor for {type_name}.{}", render_reports(.constructors))]
    Unsatisfiable {
        type_name: &'static str,
        constructors: Vec<ConstructorReport>,
    },

    /// A scoped service was resolved outside of a scope.
    #[error("Lifetime error: cannot resolve scoped service {service} from the root provider")]
    WrongLifetime { service: &'static str },

    /// The chosen constructor or factory failed.
    #[error("Failed to construct {type_name}: {source}")]
    Construction {
        type_name: &'static str,
        #[source]
        source: SharedError,
    },

    /// Abstract types and trait objects are never instantiated.
    #[error("Cannot instantiate abstract type: {0}")]
    AbstractType(&'static str),

    /// Type downcast failed.
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),

    /// Construction stack exceeded the configured depth.
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),

    /// Resolution was attempted on a scope that has already been closed.
    #[error("Scope is closed; cannot resolve {0}")]
    ScopeClosed(&'static str),

    /// Resolution was attempted after `ServiceProvider::dispose_all`.
    #[error("Service provider is disposed; cannot resolve {0}")]
    ProviderDisposed(&'static str),

    /// Rejected while building the provider.
    #[error("Invalid registration for {service}: {reason}")]
    InvalidRegistration {
        service: &'static str,
        reason: String,
    },
}

impl DiError {
    /// Wraps a constructor or factory failure.
    pub fn construction(type_name: &'static str, source: impl Into<BoxError>) -> Self {
        DiError::Construction {
            type_name,
            source: Arc::from(source.into()),
        }
    }
}

fn render_reports(reports: &[ConstructorReport]) -> String {
    if reports.is_empty() {
        return " No constructors are declared.".to_string();
    }
    let mut s = String::from(" Constructors and missing parameters:");
    for r in reports {
        if r.missing.is_empty() {
            let _ = write!(s, "\n  - {}  (not chosen)", r.signature);
        } else {
            let _ = write!(s, "\n  - {}  missing: [{}]", r.signature, r.missing.join(", "));
        }
    }
    s
}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
