//! Tracing helpers for timing and mesh-state logging.
//!
//! [`OperationTimer`] logs the wall-clock duration of an operation when it
//! is dropped, so early returns and error paths are timed for free.

use std::time::Instant;
use tracing::{debug, info, span, Level, Span};

use crate::Mesh;

/// Times an operation and logs the duration on drop.
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Start timing a named operation.
    pub fn new(name: &'static str) -> Self {
        let span = span!(Level::INFO, "operation", name = name);
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Start timing with face and vertex counts attached to the span.
    pub fn with_context(name: &'static str, face_count: usize, vertex_count: usize) -> Self {
        let span = span!(
            Level::INFO,
            "operation",
            name = name,
            faces = face_count,
            vertices = vertex_count
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The span associated with this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let _guard = self.span.enter();
        info!(
            target: "mesh_facet::timing",
            operation = self.name,
            elapsed_ms = self.elapsed_ms(),
            "operation complete"
        );
    }
}

/// Log a snapshot of mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    let (extent_x, extent_y, extent_z) = match mesh.bounds() {
        Some((min, max)) => (max.x - min.x, max.y - min.y, max.z - min.z),
        None => (0.0, 0.0, 0.0),
    };
    debug!(
        target: "mesh_facet::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        extent_x = extent_x,
        extent_y = extent_y,
        extent_z = extent_z,
        "mesh state"
    );
}
