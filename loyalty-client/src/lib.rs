//! Loyalty Client - HTTP client for the loyalty backend
//!
//! Provides the [`LoyaltyApi`] seam consumed by the session engine, its
//! reqwest implementation, and the bearer credential store that every call
//! reads its token from.

pub mod api;
pub mod config;
pub mod convert;
pub mod credential;
pub mod error;
pub mod http;

pub use api::{CodeLookup, LoyaltyApi, RestaurantLookup};
pub use config::ClientConfig;
pub use credential::{Credential, CredentialError, CredentialStorage, MemoryTokenStore, TokenStore};
pub use error::{ClientError, ClientResult};
pub use http::LoyaltyHttpClient;

// Re-export shared wire types for convenience
pub use shared::client::{CreateOrderRequest, ForgotPasswordRequest, SignInRequest};
