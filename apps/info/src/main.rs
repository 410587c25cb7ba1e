// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BRep-Lite Info - loads an entity stream and reports assembly bounds.
//!
//! ```text
//! brep-info [FILE]
//! ```
//!
//! The input file may also be given through `BREP_FILE`. For every
//! assembly the bounding-box center and volume are printed.

use anyhow::{bail, Context};
use brep_lite_store::BrepStore;

mod config;

use config::Config;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,brep_lite_store=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().with_args(std::env::args().skip(1));
    let Some(file) = config.file.clone() else {
        bail!("usage: brep-info <FILE> (or set BREP_FILE)");
    };

    tracing::info!(
        file = %file.display(),
        max_record_mb = config.max_record_mb,
        "Loading entity stream"
    );

    let mut store = BrepStore::new();
    let report = store
        .load_file_with(&file, &config.stream_config())
        .with_context(|| format!("failed to load {}", file.display()))?;

    tracing::info!(
        records = report.records,
        assemblies = report.counts.assemblies,
        parts = report.counts.parts,
        bodies = report.counts.bodies,
        faces = report.counts.faces,
        edges = report.counts.edges,
        vertices = report.counts.vertices,
        failures = report.failures.len(),
        "Store ready"
    );

    let mut assemblies: Vec<_> = store.assemblies().collect();
    assemblies.sort();
    for assembly in assemblies {
        let bbox = store.bounding_box(assembly);
        match bbox.center() {
            Some(c) => println!(
                "assembly {assembly}: center ({:.6}, {:.6}, {:.6}) volume {:.6}",
                c.x,
                c.y,
                c.z,
                bbox.volume()
            ),
            None => println!("assembly {assembly}: empty"),
        }
    }

    if !report.is_success() {
        bail!("{} records could not be ingested", report.failures.len());
    }
    Ok(())
}
