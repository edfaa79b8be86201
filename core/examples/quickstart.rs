//! Walk an account: organizations, projects, sources and recent events.
//!
//! ```text
//! VOLLEY_API_TOKEN=... cargo run -p volley-core --example quickstart
//! ```
//!
//! Point `VOLLEY_BASE_URL` at a running mock-server to try it locally.
//! `RUST_LOG=volley_core=debug` shows each request.

use tracing_subscriber::EnvFilter;
use volley_core::{ListEventsOptions, VolleyClient};

fn main() -> volley_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut client = VolleyClient::from_env()?;

    println!("=== Organizations ===");
    let orgs = client.list_organizations()?;
    for org in &orgs {
        println!("  - {} (ID: {}, Role: {})", org.name, org.id, org.role);
    }
    let Some(org) = orgs.first() else {
        println!("  No organizations found");
        return Ok(());
    };

    client.set_organization_id(org.id);
    println!("\n=== Using Organization: {} (ID: {}) ===", org.name, org.id);

    println!("\n=== Projects ===");
    let projects = client.list_projects()?;
    for project in &projects {
        let marker = if project.is_default { ", Default" } else { "" };
        println!("  - {} (ID: {}{marker})", project.name, project.id);
    }
    let Some(project) = projects.first() else {
        println!("  No projects found");
        return Ok(());
    };

    println!("\n=== Sources for {} ===", project.name);
    for source in client.list_sources(project.id)? {
        println!(
            "  - {} (ID: {}, Ingestion ID: {}, Type: {})",
            source.slug, source.id, source.ingestion_id, source.kind
        );
    }

    println!("\n=== Recent Events for {} ===", project.name);
    let events = client.list_events(
        project.id,
        &ListEventsOptions {
            limit: Some(10),
            ..Default::default()
        },
    )?;
    println!("Total events: {}", events.pagination.total);
    for event in events.requests.iter().take(5) {
        println!("  - Event ID: {}, Status: {}", event.event_id, event.status);
    }

    Ok(())
}
