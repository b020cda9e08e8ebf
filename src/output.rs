use anyhow::Result;
use crate::agent::Agent;
use cryo_cell_common::{OutputConfig, Snapshot};
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Snapshot serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Bincode,
    MessagePack,
}

impl SnapshotFormat {
    /// Parses the configured format name; unknown names fall back to JSON.
    pub fn from_config(name: Option<&str>) -> Self {
        match name.unwrap_or("json") {
            "json" => SnapshotFormat::Json,
            "bincode" => SnapshotFormat::Bincode,
            "messagepack" => SnapshotFormat::MessagePack,
            other => {
                error!("Unknown output format: {}. Using JSON instead.", other);
                SnapshotFormat::Json
            }
        }
    }

    fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Bincode => "bin",
            SnapshotFormat::MessagePack => "msgpack",
        }
    }
}

/// Path the snapshots of `output` are written to, relative to `dir`.
pub fn snapshot_path(dir: &Path, output: &OutputConfig) -> PathBuf {
    let format = SnapshotFormat::from_config(output.format.as_deref());
    dir.join(format!("{}_snapshots.{}", output.base_filename, format.extension()))
}

/// Writes all snapshots in the configured format. Returns the file written.
pub fn write_snapshots(
    dir: &Path,
    output: &OutputConfig,
    snapshots: &[Snapshot],
) -> Result<PathBuf> {
    let format = SnapshotFormat::from_config(output.format.as_deref());
    let path = snapshot_path(dir, output);
    let file = File::create(&path)
        .map_err(|e| anyhow::anyhow!("Error creating snapshot file '{}': {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);

    match format {
        SnapshotFormat::Json => serde_json::to_writer(&mut writer, snapshots)
            .map_err(|e| anyhow::anyhow!("Error serializing snapshots to JSON: {}", e))?,
        SnapshotFormat::Bincode => bincode::serialize_into(&mut writer, snapshots)
            .map_err(|e| anyhow::anyhow!("Error serializing snapshots to bincode: {}", e))?,
        SnapshotFormat::MessagePack => rmp_serde::encode::write(&mut writer, snapshots)
            .map_err(|e| anyhow::anyhow!("Error serializing snapshots to MessagePack: {}", e))?,
    }
    writer.flush()?;

    info!("{} snapshots saved to {} ({:?} format)", snapshots.len(), path.display(), format);
    Ok(path)
}

/// Writes one CSV row per agent with its final state.
pub fn write_final_state(dir: &Path, output: &OutputConfig, agents: &[Agent]) -> Result<PathBuf> {
    let path = dir.join(format!("{}_final_state.csv", output.base_filename));
    let mut writer = csv::Writer::from_path(&path)
        .map_err(|e| anyhow::anyhow!("Error creating CSV file '{}': {}", path.display(), e))?;

    writer.write_record([
        "x", "y", "z", "diameter", "volume", "growth_rate", "temperature", "permeability",
    ])?;
    for agent in agents {
        let thermal = agent.thermal();
        writer.write_record(&[
            format!("{:.4}", agent.position.x),
            format!("{:.4}", agent.position.y),
            format!("{:.4}", agent.position.z),
            format!("{:.6}", agent.diameter()),
            format!("{:.6}", agent.volume()),
            format!("{:.6}", agent.growth().growth_rate),
            thermal.map(|t| format!("{:.4}", t.temperature)).unwrap_or_default(),
            thermal.map(|t| format!("{:.6}", t.permeability)).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;

    info!("Final state of {} agents saved to {}", agents.len(), path.display());
    Ok(path)
}
