//! JSON output for rendered graphs

use super::RenderedGraph;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated: String,
    #[serde(flatten)]
    graph: &'a RenderedGraph,
}

pub fn write<W: Write>(writer: &mut W, rendered: &RenderedGraph) -> io::Result<()> {
    let report = JsonReport {
        generated: chrono::Local::now().to_rfc3339(),
        graph: rendered,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    writer.flush()
}
