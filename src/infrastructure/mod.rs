//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., ChatProvider, PullRequestService).

pub mod fortune;
pub mod matrix;
pub mod pr_service;
