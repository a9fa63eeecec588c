//! Plain-text rendering of a resolved catalog.

use modelgate_catalog::Resolution;
use modelgate_core::ModelDescriptor;

/// One line per model: id, context, output, capability flags.
pub fn model_line(model: &ModelDescriptor) -> String {
    let mut flags = Vec::new();
    if model.capabilities.tool_calling {
        flags.push("tools");
    }
    if model.capabilities.image_input {
        flags.push("vision");
    }
    format!(
        "{:<48} {:>9} ctx {:>7} out  {}",
        model.id,
        model.context_length,
        model.max_output_tokens,
        flags.join(",")
    )
}

/// The full listing, followed by a summary line.
pub fn listing(resolution: &Resolution) -> String {
    let mut out: Vec<String> = resolution.descriptors.iter().map(model_line).collect();
    let mut summary = format!(
        "{} models from the {} catalog",
        resolution.descriptors.len(),
        resolution.origin
    );
    if resolution.degraded_count() > 0 {
        summary.push_str(&format!(" ({} degraded)", resolution.degraded_count()));
    }
    out.push(summary);
    out.join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
