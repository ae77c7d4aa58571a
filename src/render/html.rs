//! Interactive HTML output backed by vis-network
//!
//! The document is self-contained apart from the vis-network script. Graph data,
//! palette and viewport limits are injected into `graph.html` as JSON. The
//! per-node focus table from [`crate::interaction::Interaction::table`] rides along
//! as `GRAPH.focus`: click a node to keep only the edges and neighbours listed
//! there, click empty canvas to restore, and the focus survives reloads via
//! `sessionStorage`.

use super::{RenderedGraph, EDGE_OPACITY, NODE_SIZE};
use crate::interaction::{ViewportPolicy, SESSION_KEY};
use serde_json::json;
use std::io::{self, Write};

const GRAPH_TEMPLATE: &str = include_str!("graph.html");

/// Interval between attempts to find the network instance
const SETUP_RETRY_MS: u32 = 50;
/// Give up attaching listeners after this many attempts
const SETUP_MAX_ATTEMPTS: u32 = 100;

pub fn write<W: Write>(writer: &mut W, rendered: &RenderedGraph) -> io::Result<()> {
    let html = build_document(rendered, &ViewportPolicy::default())?;
    writer.write_all(html.as_bytes())?;
    writer.flush()
}

/// Fill the page template for one rendered graph
pub fn build_document(rendered: &RenderedGraph, policy: &ViewportPolicy) -> io::Result<String> {
    let data = script_safe(serde_json::to_string(&vis_data(rendered))?);
    let config = script_safe(serde_json::to_string(&json!({
        "sessionKey": SESSION_KEY,
        "dimColor": rendered.palette.dimmed,
        "viewport": {
            "maxZoomIn": policy.max_zoom_in,
            "driftThresholdPx": policy.drift_threshold_px,
            "recenterMs": policy.recenter_ms,
        },
        "setupRetryMs": SETUP_RETRY_MS,
        "setupMaxAttempts": SETUP_MAX_ATTEMPTS,
    }))?);

    let subtitle = format!(
        "{} · p{} cutoff {:.2} · {} nodes · {} edges",
        rendered.view.label(),
        rendered.percentile,
        rendered.summary.cutoff,
        rendered.summary.nodes,
        rendered.summary.edges
    );

    Ok(GRAPH_TEMPLATE
        .replace("{{SUBTITLE}}", &html_escape(&subtitle))
        .replace("{{GENERATED}}", &chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
        .replace("{{BACKGROUND}}", &html_escape(&rendered.palette.background))
        .replace("{{CONFIG}}", &config)
        .replace("{{GRAPH_DATA}}", &data))
}

/// Nodes and edges in the shape vis-network's DataSet expects
fn vis_data(rendered: &RenderedGraph) -> serde_json::Value {
    let nodes: Vec<serde_json::Value> = rendered
        .nodes
        .iter()
        .map(|n| {
            json!({
                "id": n.id,
                "label": n.label,
                "title": n.title,
                "size": NODE_SIZE,
                "color": { "background": n.color, "border": n.color },
                "x": n.x,
                "y": n.y,
            })
        })
        .collect();

    let edges: Vec<serde_json::Value> = rendered
        .edges
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "from": e.from,
                "to": e.to,
                "value": e.width,
                "title": e.title,
                "color": { "color": rendered.palette.edge, "opacity": EDGE_OPACITY },
                "smooth": false,
            })
        })
        .collect();

    let interaction = rendered.interaction();
    json!({ "nodes": nodes, "edges": edges, "focus": interaction.table() })
}

/// Keep JSON from closing the surrounding <script> element
fn script_safe(json: String) -> String {
    json.replace("</", "<\\/")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
