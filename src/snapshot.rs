use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

/// 把中间结果落盘为 JSON 快照，便于排查与离线复跑
pub fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    tracing::info!("快照已保存: {}", path.display());
    Ok(())
}
