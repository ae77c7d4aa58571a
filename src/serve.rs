//! HTTP server for the interactive dashboard
//!
//! `hiclens serve` → loads the dataset once, opens the browser, and re-renders on
//! every slider or view change. Renders are memoized per (percentile, view) for
//! the life of the server, so moving the slider back and forth is free.

use crate::config::{Percentile, ViewMode};
use crate::error::{Error, Result};
use crate::interaction::ViewportPolicy;
use crate::render::{html, Pipeline, RenderedGraph};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;
use tiny_http::{Header, Method, Request, Response, Server};

// Embed the UI directly in the binary
const DASHBOARD_HTML: &str = include_str!("dashboard.html");

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(message: String) -> Self {
        Self { ok: false, data: None, error: Some(message) }
    }
}

/// Query parameters accepted by `/graph` and `/api/graph`
#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct GraphParams {
    #[serde(default)]
    pub percentile: Option<Percentile>,
    #[serde(default)]
    pub view: Option<ViewMode>,
}

/// Values the dashboard starts with
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults {
    pub percentile: Percentile,
    pub view: ViewMode,
}

impl GraphParams {
    fn resolve(&self, defaults: Defaults) -> (Percentile, ViewMode) {
        (
            self.percentile.unwrap_or(defaults.percentile),
            self.view.unwrap_or(defaults.view),
        )
    }
}

/// Start server, optionally open the browser, serve until killed
pub fn start(port: u16, mut pipeline: Pipeline, defaults: Defaults, open_browser: bool) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| Error::Server(e.to_string()))?;

    let url = format!("http://localhost:{}", port);
    eprintln!("\n\x1b[1;32mhiclens\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   {} nodes loaded\n", pipeline.dataset().node_count());

    if open_browser {
        if let Err(e) = open::that(&url) {
            log::warn!("Could not open browser: {}. Please open {} manually.", e, url);
        }
    }

    // One request at a time; the pipeline cache is owned by this loop
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &mut pipeline, defaults) {
            log::error!("Request failed: {}", e);
        }
    }

    Ok(())
}

/// Status, content type and body of one response
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn json(status: u16, body: String) -> Self {
        Self { status, content_type: "application/json", body }
    }

    fn failure(status: u16, message: String) -> Self {
        match serde_json::to_string(&ApiResponse::failure(message)) {
            Ok(body) => Self::json(status, body),
            Err(e) => Self {
                status: 500,
                content_type: "text/plain; charset=utf-8",
                body: e.to_string(),
            },
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain; charset=utf-8",
            body: "Not found".to_string(),
        }
    }
}

fn handle_request(request: Request, pipeline: &mut Pipeline, defaults: Defaults) -> std::io::Result<()> {
    let url = request.url().to_string();
    let method = request.method().clone();
    log::debug!("{} {}", method, url);

    let reply = route(&method, &url, pipeline, defaults);
    if reply.status >= 400 {
        log::debug!("{} {} -> {}", method, url, reply.status);
    }
    let response = with_content_type(Response::from_string(reply.body), reply.content_type)
        .with_status_code(reply.status);
    request.respond(response)
}

/// Map one request onto the pipeline; parameters are validated before anything renders
pub fn route(method: &Method, url: &str, pipeline: &mut Pipeline, defaults: Defaults) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    match (method, path) {
        (&Method::Get, "/") => Reply::html(dashboard_html(defaults, pipeline.dataset().node_count())),

        // Full rendered document, loaded into the dashboard's iframe
        (&Method::Get, "/graph") => match parse_params(query) {
            Ok(params) => {
                let rendered = render_for(pipeline, &params, defaults);
                match html::build_document(&rendered, &ViewportPolicy::default()) {
                    Ok(doc) => Reply::html(doc),
                    Err(e) => Reply::failure(500, e.to_string()),
                }
            }
            Err(e) => Reply::failure(400, e.to_string()),
        },

        (&Method::Get, "/api/graph") => match parse_params(query) {
            Ok(params) => {
                let rendered = render_for(pipeline, &params, defaults);
                match serde_json::to_string(&ApiResponse::success(&*rendered)) {
                    Ok(body) => Reply::json(200, body),
                    Err(e) => Reply::failure(500, e.to_string()),
                }
            }
            Err(e) => Reply::failure(400, e.to_string()),
        },

        _ => Reply::not_found(),
    }
}

fn render_for(pipeline: &mut Pipeline, params: &GraphParams, defaults: Defaults) -> Arc<RenderedGraph> {
    let (percentile, view) = params.resolve(defaults);
    pipeline.render(percentile, view)
}

pub fn parse_params(query: &str) -> Result<GraphParams> {
    if query.is_empty() {
        return Ok(GraphParams::default());
    }
    serde_urlencoded::from_str::<GraphParams>(query)
        .map_err(|e| Error::InvalidParameter(e.to_string()))
}

fn dashboard_html(defaults: Defaults, node_count: usize) -> String {
    DASHBOARD_HTML
        .replace("{{DEFAULT_PERCENTILE}}", &defaults.percentile.to_string())
        .replace("{{DEFAULT_VIEW}}", &defaults.view.to_string())
        .replace("{{MIN_PERCENTILE}}", &Percentile::MIN.to_string())
        .replace("{{MAX_PERCENTILE}}", &Percentile::MAX.to_string())
        .replace("{{STEP_PERCENTILE}}", &Percentile::STEP.to_string())
        .replace("{{NODE_COUNT}}", &node_count.to_string())
}

fn with_content_type<R: Read>(response: Response<R>, value: &str) -> Response<R> {
    match Header::from_bytes(&b"Content-Type"[..], value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
