//! Dynamics 365 Web API Module
//!
//! The organization service used by the import tool: a trait describing the handful of
//! SDK messages the tool needs, and a Web API client implementing it.

pub mod client;
pub mod constants;
pub mod models;
pub mod service;

pub use client::DynamicsClient;
pub use models::{EntityReference, ImportJob, ImportSolutionRequest, WhoAmIResponse};
pub use service::OrganizationService;
