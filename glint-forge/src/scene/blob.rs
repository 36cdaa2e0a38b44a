use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::SceneError;

use super::Scene;

pub const SCENE_MAGIC: [u8; 4] = *b"GSCN";
pub const SCENE_VERSION: u32 = 1;

/// Serialize the whole scene into a conditioned-scene blob.
pub fn write_scene(scene: &Scene) -> Result<Vec<u8>, SceneError> {
    let mut blob = Vec::new();
    write_scene_into(scene, &mut blob)?;
    Ok(blob)
}

pub fn write_scene_to_file(scene: &Scene, path: &Path) -> Result<(), SceneError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(1 << 20, file);
    write_scene_into(scene, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_scene_into<W: Write>(scene: &Scene, mut writer: W) -> Result<(), SceneError> {
    writer.write_all(&SCENE_MAGIC)?;
    writer.write_all(&SCENE_VERSION.to_le_bytes())?;
    bincode::serialize_into(&mut writer, scene)?;
    Ok(())
}

pub fn read_scene_from_file(path: &Path) -> Result<Scene, SceneError> {
    let file = File::open(path)?;
    read_scene(BufReader::with_capacity(1 << 20, file))
}

pub fn read_scene<R: Read>(mut reader: R) -> Result<Scene, SceneError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != SCENE_MAGIC {
        return Err(SceneError::MalformedScene(
            "not a conditioned scene file (bad magic)".to_owned(),
        ));
    }
    let mut version = [0u8; 4];
    reader.read_exact(&mut version)?;
    let version = u32::from_le_bytes(version);
    if version != SCENE_VERSION {
        return Err(SceneError::MalformedScene(format!(
            "unsupported scene version {version}"
        )));
    }
    Ok(bincode::deserialize_from(reader)?)
}
