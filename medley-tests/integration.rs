//! Integration tests for Medley
//!
//! These tests drive the search engine through its public surface: the
//! service, the debounced session and the HTTP provider clients, with
//! scripted sources or a local stub server standing in for real providers.

#[path = "integration/support.rs"]
mod support;

#[path = "integration/search_scenarios.rs"]
mod search_scenarios;

#[path = "integration/session_flow.rs"]
mod session_flow;

#[path = "integration/library_annotation.rs"]
mod library_annotation;

#[path = "integration/provider_http.rs"]
mod provider_http;
