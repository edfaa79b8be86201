//! One `impl VolleyClient` block per API resource.
//!
//! Every operation is a fixed composition of the pipeline in
//! [`crate::client`]: a path (with interpolated ids), a method, an optional
//! payload, and the envelope the server wraps the result in.

mod connections;
mod delivery_attempts;
mod destinations;
mod events;
mod organizations;
mod projects;
mod sources;
mod webhooks;

pub use webhooks::IngestionAuth;
