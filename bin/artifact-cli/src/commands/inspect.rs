// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `artifact inspect` command: display stored artifacts.
//!
//! Loads `model.json` + `weights.bin` through the codec and prints the
//! provenance fields, a per-weight table, and whether the weight buffer
//! length agrees with what the specs imply.

use super::human_bytes;
use artifact_codec::{HandlerConfig, IoHandler};

pub async fn execute(config: HandlerConfig) -> anyhow::Result<()> {
    let handler = config.build_fs_handler();
    let artifacts = handler.load().await.map_err(|e| {
        anyhow::anyhow!(
            "failed to load artifacts from '{}' under '{}': {e}",
            config.base_path,
            config.root.display(),
        )
    })?;

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            artifact · Artifact Inspector            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Summary ────────────────────────────────────────────────
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    println!("  Location:      {}/{}", config.root.display(), config.base_path);
    println!("  Format:        {}", or_dash(&artifacts.format));
    println!("  Generated by:  {}", or_dash(&artifacts.generated_by));
    println!("  Converted by:  {}", or_dash(&artifacts.converted_by));
    println!(
        "  Topology:      {}",
        match &artifacts.model_topology {
            Some(t) => human_bytes(serde_json::to_string(t)?.len()),
            None => "absent".to_string(),
        }
    );
    println!(
        "  Training cfg:  {}",
        if artifacts.training_config.is_some() { "present" } else { "absent" }
    );
    println!(
        "  User metadata: {}",
        if artifacts.user_defined_metadata.is_some() { "present" } else { "absent" }
    );
    println!();

    // ── Per-Weight Detail ──────────────────────────────────────
    let specs = artifacts.weight_specs.as_deref().unwrap_or_default();
    println!(
        "  {:<4} {:<36} {:<10} {:<18} {:>12}",
        "Idx", "Name", "DType", "Shape", "Bytes",
    );
    println!("  {}", "-".repeat(84));

    for (i, spec) in specs.iter().enumerate() {
        let dtype = match &spec.quantization {
            Some(q) => format!("{}>{}", spec.dtype, q.dtype),
            None => spec.dtype.clone(),
        };
        let bytes = spec
            .byte_size()
            .map_or_else(|| "variable".to_string(), human_bytes);
        println!(
            "  {:<4} {:<36} {:<10} {:<18} {:>12}",
            i,
            truncate(&spec.name, 36),
            dtype,
            format!("{:?}", spec.shape),
            bytes,
        );
    }
    println!();

    // ── Buffer Accounting ──────────────────────────────────────
    let actual = artifacts.weight_data_len();
    println!("  Weight specs:  {}", specs.len());
    println!("  Weight data:   {}", human_bytes(actual));
    match artifacts.expected_weight_bytes() {
        Some(expected) if expected == actual => {
            println!("  Consistency:   OK (specs account for every byte)");
        }
        Some(expected) => {
            println!(
                "  Consistency:   MISMATCH (specs imply {expected} bytes, buffer holds {actual})"
            );
        }
        None => println!("  Consistency:   unknown (variable-size dtypes or no specs)"),
    }
    println!();

    Ok(())
}

/// Truncates a string to `max_len` characters with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}
