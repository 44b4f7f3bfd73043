//! The [`Provider`] trait and load results.

use crate::lifetime::Lifetime;
use async_trait::async_trait;
use core::any::{Any, TypeId};
use core::future::Future;
use core::pin::Pin;
use std::sync::Arc;

/// Message carried by the canonical "not found" result.
pub const NOT_FOUND_ERROR: &str = "Game Resource Not Found";

/// Message carried by results of loads interrupted by their lifetime.
pub const CANCELLED_ERROR: &str = "load cancelled";

/// A loaded asset, type-erased.
pub type Asset = Arc<dyn Any + Send + Sync>;

/// Runtime description of the type a caller wants to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetType {
    id: TypeId,
    name: &'static str,
}

impl AssetType {
    /// Describes `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// The type id.
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name, for diagnostics only.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns whether this describes `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

/// Unexpected failure inside a provider.
///
/// Faults are captured into [`LoadResult::fault`] rather than returned as
/// errors, so callers on hot paths always receive a result value.
#[derive(Debug, thiserror::Error)]
pub enum ProviderFault {
    /// I/O failure while reading the resource.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The resource was read but could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// The stored asset does not have the requested type.
    #[error("resource '{key}' is not a {expected}")]
    TypeMismatch {
        /// The requested type name.
        expected: &'static str,
        /// The resource key.
        key: String,
    },

    /// The load was interrupted because its lifetime ended.
    #[error("load cancelled")]
    Cancelled,

    /// Any other provider-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Outcome of a provider load.
///
/// A result is either complete (carrying an asset) or failed (carrying an
/// error message and, for unexpected failures, a [`ProviderFault`]).
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// The key the load was issued for.
    pub id: String,
    /// The loaded asset, if any.
    pub asset: Option<Asset>,
    /// Whether the load succeeded.
    pub complete: bool,
    /// Human-readable error, empty on success.
    pub error: String,
    /// Unexpected failure captured from the provider.
    pub fault: Option<Arc<ProviderFault>>,
}

impl LoadResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(id: impl Into<String>, asset: Asset) -> Self {
        Self {
            id: id.into(),
            asset: Some(asset),
            complete: true,
            error: String::new(),
            fault: None,
        }
    }

    /// Creates a failed result with an error message.
    #[must_use]
    pub fn failure(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            asset: None,
            complete: false,
            error: error.into(),
            fault: None,
        }
    }

    /// Creates a failed result carrying a fault.
    #[must_use]
    pub fn fault(id: impl Into<String>, fault: ProviderFault) -> Self {
        Self {
            id: id.into(),
            asset: None,
            complete: false,
            error: fault.to_string(),
            fault: Some(Arc::new(fault)),
        }
    }

    /// Creates the canonical "not found" result.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::failure(id, NOT_FOUND_ERROR)
    }

    /// Creates the result of a load interrupted by its lifetime.
    #[must_use]
    pub fn cancelled(id: impl Into<String>) -> Self {
        let mut result = Self::fault(id, ProviderFault::Cancelled);
        result.error = CANCELLED_ERROR.to_string();
        result
    }

    /// Returns whether the load succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns whether this is the canonical "not found" result.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        !self.complete && self.fault.is_none() && self.error == NOT_FOUND_ERROR
    }

    /// Returns the asset downcast to `T`.
    #[must_use]
    pub fn asset<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.asset
            .as_ref()
            .and_then(|asset| Arc::clone(asset).downcast::<T>().ok())
    }

    /// Returns the captured fault, if any.
    #[must_use]
    pub fn fault_ref(&self) -> Option<&ProviderFault> {
        self.fault.as_deref()
    }
}

/// Strategy that loads typed assets by key.
///
/// Providers are stateless with respect to the database: they only answer
/// capability checks and perform loads. Several categories may share one
/// provider instance.
///
/// # Failure policy
///
/// A provider that cannot find a resource returns a failed [`LoadResult`]
/// (see [`LoadResult::not_found`]). Unexpected conditions such as I/O
/// faults are reported through [`LoadResult::fault`]. Loads never panic
/// for missing resources.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use gamedb_core::{AssetType, Lifetime, LoadResult, Provider};
/// use std::sync::Arc;
///
/// struct Greeting;
///
/// #[async_trait]
/// impl Provider for Greeting {
///     fn name(&self) -> &str {
///         "greeting"
///     }
///
///     fn supports(&self, key: &str, asset_type: AssetType) -> bool {
///         !key.is_empty() && asset_type.is::<String>()
///     }
///
///     async fn load(&self, key: &str, _: AssetType, _: &Lifetime) -> LoadResult {
///         LoadResult::success(key, Arc::new(format!("hello {key}")))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Returns whether this provider can service `key` as `asset_type`.
    ///
    /// Must be a pure check with no I/O.
    fn supports(&self, key: &str, asset_type: AssetType) -> bool;

    /// Loads `key` as `asset_type`.
    async fn load(&self, key: &str, asset_type: AssetType, lifetime: &Lifetime) -> LoadResult;
}

/// Typed conveniences over [`Provider`].
pub trait ProviderExt: Provider {
    /// Returns whether this provider can service `key` as `T`.
    fn supports_type<T: Any>(&self, key: &str) -> bool {
        self.supports(key, AssetType::of::<T>())
    }

    /// Loads `key` as `T`.
    fn load_as<'a, T: Any>(
        &'a self,
        key: &'a str,
        lifetime: &'a Lifetime,
    ) -> Pin<Box<dyn Future<Output = LoadResult> + Send + 'a>> {
        self.load(key, AssetType::of::<T>(), lifetime)
    }
}

impl<P: Provider + ?Sized> ProviderExt for P {}
