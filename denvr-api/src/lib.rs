//! denvr-api client library
//!
//! Typed access to the Denvr Cloud control plane: virtual servers and
//! applications. The [`ServerApi`] and [`ApplicationApi`] traits are the seam
//! the lifecycle core is written against; [`HttpClient`] implements both over
//! the REST API.
//!
//! # Example
//! ```ignore
//! use denvr_api::{ApplicationApi, ApplicationKey, DenvrConfig, HttpClient};
//!
//! let client = HttpClient::new(DenvrConfig::load()?)?;
//! let details = client
//!     .get_application_details(&ApplicationKey::new("my-app", "Msc1"))
//!     .await?;
//! ```

pub mod applications;
pub mod config;
mod error;
mod http;
pub mod servers;

pub use applications::{
    ApplicationApi, ApplicationCommandResult, ApplicationDetails, ApplicationKey,
    ApplicationOverview, CreateCatalogApplicationRequest, CreateCustomApplicationRequest,
    ImageRepository, InstanceDetails, SecurityContext,
};
pub use config::{ConfigError, Credentials, DenvrConfig};
pub use error::{ClientError, Result};
pub use http::HttpClient;
pub use servers::{CreateServerRequest, ServerApi, ServerInfo, ServerKey};
