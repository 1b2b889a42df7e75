//! Podlift - layered deployment and lifecycle for multi-pod applications.
//!
//! This crate deploys "applications" (bundles of pod manifest templates)
//! onto a pluggable container runtime and operates them afterwards.
//!
//! # Architecture
//!
//! Everything above the runtime seam is backend-agnostic:
//!
//! - **[`runtime`]** - the [`RuntimeBackend`](runtime::RuntimeBackend)
//!   capability set with two implementations: a local Podman engine
//!   (libpod REST API) and a Kubernetes-style cluster. Selected once via a
//!   configuration-keyed factory.
//! - **[`deploy`]** - the layered rollout engine. Templates inside a layer
//!   deploy concurrently and join at a barrier; a layer only starts after
//!   every pod of the previous layer passed readiness verification.
//! - **[`lifecycle`]** - start/stop/list operations tolerating partial
//!   failure: per-pod errors are aggregated, never dropped, and never
//!   abort the remaining pods.
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with environment overrides
//! - [`templates`] - application template bundles and their metadata
//! - [`validate`] - host precondition checks run before deployment
//! - [`auth`] - token revocation list shared with the catalog API service
//! - [`error`] - error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use podlift::config::Config;
//! use podlift::deploy::Deployer;
//! use podlift::runtime::create_backend;
//!
//! # async fn run() -> podlift::error::Result<()> {
//! let config = Config::load("podlift.toml")?;
//! let backend = create_backend(&config)?;
//! let (templates, plan) =
//!     podlift::templates::load_bundle("applications".as_ref(), "rag")?;
//! Deployer::new(backend).run("infer1", &plan, &templates).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod error;
pub mod lifecycle;
pub mod runtime;
pub mod templates;
pub mod validate;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
