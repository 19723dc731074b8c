//! Preview server for the build output.
//!
//! A lightweight HTTP server built on `tiny_http` that serves the output
//! directory the way the static host does:
//!
//! - Static file serving with `index.html` resolution for directories
//! - Prerendered message pages for `/message/{slug}`
//! - Client-side routing fallback to the root `index.html`
//! - Graceful shutdown on Ctrl+C
//!
//! # Route resolution
//!
//! ```text
//! /assets/app.js          → assets/app.js
//! /about/                 → about/index.html
//! /message/{slug}         → message/{slug}/index.html or message/{slug}.html
//! /data/missing.json      → 404
//! /sitemap.xml (missing)  → 404
//! /anything/else          → index.html
//! ```

use crate::{
    config::{MESSAGE_ROUTE, SiteConfig},
    log,
};
use anyhow::{Context, Result};
use std::{
    fs,
    io::Cursor,
    net::{IpAddr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Paths that must never fall back to the application shell.
const NO_FALLBACK_FILES: &[&str] = &["sitemap.xml", "news-sitemap.xml", "robots.txt"];

/// Extensions of data files; a missing one is a 404, not a page.
const DATA_EXTENSIONS: &[&str] = &["json", "csv", "xml", "txt"];

// ============================================================================
// Server Entry Point
// ============================================================================

/// Serve `config.build.output` until Ctrl+C.
///
/// Binds to the configured interface and port, retrying on the next ports
/// when one is taken.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface address: {}", config.serve.interface))?;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Outcome of resolving a request path against the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    File(PathBuf),
    NotFound,
}

fn handle_request(request: Request, config: &SiteConfig) -> Result<()> {
    // Decode URL-encoded characters (e.g., %20 → space)
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    // Strip query string and fragment before resolving
    let path = url_path.split(['?', '#']).next().unwrap_or_default();

    match resolve_route(&config.build.output, &config.build.data_url, path) {
        Route::File(file) => serve_file(request, &file),
        Route::NotFound => serve_not_found(request),
    }
}

/// Map a decoded request path to a file under `root`.
///
/// Order: exact file, directory `index.html`, prerendered message page,
/// 404 for missing data files and crawler files, then the root
/// `index.html` for client-side routes.
pub fn resolve_route(root: &Path, data_url: &str, request_path: &str) -> Route {
    let rel = request_path.trim_matches('/');
    let rel_path = Path::new(rel);

    // Reject traversal out of the output directory.
    if rel_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Route::NotFound;
    }

    let local = root.join(rel_path);
    if local.is_file() {
        return Route::File(local);
    }

    let dir_index = local.join("index.html");
    if local.is_dir() && dir_index.is_file() {
        return Route::File(dir_index);
    }

    if let Some(slug) = message_slug(rel) {
        let flat = root.join(MESSAGE_ROUTE).join(format!("{slug}.html"));
        if flat.is_file() {
            return Route::File(flat);
        }
    }

    if is_data_request(rel, data_url) {
        return Route::NotFound;
    }

    let shell = root.join("index.html");
    if shell.is_file() {
        Route::File(shell)
    } else {
        Route::NotFound
    }
}

/// `message/{slug}` with a single non-empty segment after the route.
fn message_slug(rel: &str) -> Option<&str> {
    let slug = rel.strip_prefix(MESSAGE_ROUTE)?.strip_prefix('/')?;
    (!slug.is_empty() && !slug.contains('/')).then_some(slug)
}

fn is_data_request(rel: &str, data_url: &str) -> bool {
    let data_url = data_url.trim_matches('/');
    if !data_url.is_empty() && (rel == data_url || rel.starts_with(&format!("{data_url}/"))) {
        return true;
    }
    if NO_FALLBACK_FILES.contains(&rel) {
        return true;
    }
    Path::new(rel)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DATA_EXTENSIONS.contains(&ext))
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response = Response::from_data(content).with_header(content_type_header(guess_content_type(path))?);
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let body = "404 Not Found";
    let response = Response::new(
        StatusCode(404),
        vec![content_type_header("text/plain; charset=utf-8")?],
        Cursor::new(body),
        Some(body.len()),
        None,
    );
    request.respond(response)?;
    Ok(())
}

fn content_type_header(value: &'static str) -> Result<Header> {
    Header::from_bytes("Content-Type", value)
        .map_err(|()| anyhow::anyhow!("Invalid Content-Type header: {value}"))
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("webmanifest") => "application/manifest+json",
        Some("xml") => "application/xml; charset=utf-8",
        Some("xsl") => "text/xsl; charset=utf-8",
        Some("csv") => "text/csv; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        Some("txt") => "text/plain; charset=utf-8",

        // Default binary
        _ => "application/octet-stream",
    }
}
