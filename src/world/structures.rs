//! Pre-authored block templates (trees, cacti, buildings) stamped into
//! terrain. Templates are parsed once at startup from plain-text
//! `.structure` files and are read-only afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use rand::{Rng, RngExt};

use crate::constants::STRUCTURE_SENTINEL;
use crate::core::block::{BlockId, ChunkBlock};
use crate::core::chunk::Chunk;
use crate::error::StructureError;

/// An immutable structure template: dimensions plus a flattened block-id
/// grid, y-major, then z, then x.
#[derive(Debug, Clone)]
pub struct Structure {
    pub name: String,
    pub group_id: u32,
    pub dim_x: i32,
    pub dim_y: i32,
    pub dim_z: i32,
    cells: Vec<u8>,
}

impl Structure {
    /// Parses one `.structure` file.
    ///
    /// ```text
    /// Name
    /// <display name>
    /// Id
    /// <integer group id>
    /// Dimensions
    /// <dimX> <dimY> <dimZ>
    /// Layers
    /// <dimX*dimY*dimZ integers>
    /// ```
    pub fn load(path: &Path) -> Result<Structure, StructureError> {
        let text = fs::read_to_string(path).map_err(|source| StructureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Structure, StructureError> {
        let malformed = |reason: &str| StructureError::Malformed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let mut name = None;
        let mut group_id = None;
        let mut dims: Option<(i32, i32, i32)> = None;
        let mut cells: Option<Vec<u8>> = None;

        let mut lines = text.lines();
        while let Some(line) = lines.next() {
            match line.trim() {
                "Name" => {
                    let value = lines.next().ok_or_else(|| malformed("missing name line"))?;
                    name = Some(value.trim().to_string());
                }
                "Id" => {
                    let value = lines.next().ok_or_else(|| malformed("missing id line"))?;
                    let id = value
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| malformed("group id is not an integer"))?;
                    group_id = Some(id);
                }
                "Dimensions" => {
                    let value = lines
                        .next()
                        .ok_or_else(|| malformed("missing dimensions line"))?;
                    let mut parts = value.split_whitespace().map(str::parse::<i32>);
                    let dx = parts.next().and_then(Result::ok);
                    let dy = parts.next().and_then(Result::ok);
                    let dz = parts.next().and_then(Result::ok);
                    match (dx, dy, dz) {
                        (Some(dx), Some(dy), Some(dz)) if dx > 0 && dy > 0 && dz > 0 => {
                            dims = Some((dx, dy, dz));
                        }
                        _ => return Err(malformed("dimensions need three positive integers")),
                    }
                }
                "Layers" => {
                    // The grid spans the remaining lines; whitespace layout
                    // inside them is free-form.
                    let mut grid = Vec::new();
                    for value in lines.by_ref().flat_map(str::split_whitespace) {
                        let raw = value
                            .parse::<u8>()
                            .map_err(|_| malformed("layer cell is not a block id"))?;
                        if raw != STRUCTURE_SENTINEL && BlockId::from_raw(raw).is_none() {
                            return Err(StructureError::UnknownBlock {
                                path: path.to_path_buf(),
                                id: raw,
                            });
                        }
                        grid.push(raw);
                    }
                    cells = Some(grid);
                }
                _ => {}
            }
        }

        let name = name.ok_or_else(|| malformed("missing Name section"))?;
        let group_id = group_id.ok_or_else(|| malformed("missing Id section"))?;
        let (dim_x, dim_y, dim_z) = dims.ok_or_else(|| malformed("missing Dimensions section"))?;
        let cells = cells.ok_or_else(|| malformed("missing Layers section"))?;

        let expected = (dim_x * dim_y * dim_z) as usize;
        if cells.len() != expected {
            return Err(malformed(&format!(
                "layer grid has {} cells, dimensions require {}",
                cells.len(),
                expected
            )));
        }

        Ok(Structure {
            name,
            group_id,
            dim_x,
            dim_y,
            dim_z,
            cells,
        })
    }

    fn cell(&self, x: i32, y: i32, z: i32) -> u8 {
        self.cells[(y * self.dim_x * self.dim_z + z * self.dim_x + x) as usize]
    }

    /// Stamps the template into `chunk`, centered horizontally on the anchor
    /// column with its base at the anchor height. Sentinel cells leave the
    /// existing block untouched, so templates can carve as well as add.
    /// Writes falling outside the chunk are clipped by `Chunk::set_block`.
    pub fn stamp(&self, chunk: &mut Chunk, anchor_x: i32, anchor_y: i32, anchor_z: i32) {
        let base_x = anchor_x - self.dim_x / 2;
        let base_z = anchor_z - self.dim_z / 2;

        for y in 0..self.dim_y {
            for z in 0..self.dim_z {
                for x in 0..self.dim_x {
                    let raw = self.cell(x, y, z);
                    if raw == STRUCTURE_SENTINEL {
                        continue;
                    }
                    // Parse validated every non-sentinel cell.
                    let block = ChunkBlock { id: raw };
                    chunk.set_block(base_x + x, anchor_y + y, base_z + z, block);
                }
            }
        }
    }
}

/// Every structure template, grouped by logical group id. Variants inside a
/// group are ordered by file name, so variant selection is deterministic.
pub struct StructureSet {
    groups: Vec<Vec<Structure>>,
}

impl StructureSet {
    /// Eagerly loads every `.structure` file in `dir`. Any missing or
    /// malformed file is fatal; this data ships with the game and is never
    /// user-supplied at runtime.
    pub fn load_dir(dir: &Path) -> Result<StructureSet, StructureError> {
        let entries = fs::read_dir(dir).map_err(|source| StructureError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "structure"))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(StructureError::EmptyDirectory {
                path: dir.to_path_buf(),
            });
        }

        let mut groups: Vec<Vec<Structure>> = Vec::new();
        for file in &files {
            let structure = Structure::load(file)?;
            let group = structure.group_id as usize;
            if groups.len() <= group {
                groups.resize_with(group + 1, Vec::new);
            }
            tracing::debug!(
                name = %structure.name,
                group,
                dims = ?(structure.dim_x, structure.dim_y, structure.dim_z),
                "loaded structure template"
            );
            groups[group].push(structure);
        }

        tracing::info!(
            files = files.len(),
            groups = groups.iter().filter(|g| !g.is_empty()).count(),
            "structure templates loaded"
        );
        Ok(StructureSet { groups })
    }

    /// Builds a set from already-parsed structures, for tests.
    pub fn from_structures(structures: Vec<Structure>) -> StructureSet {
        let mut groups: Vec<Vec<Structure>> = Vec::new();
        for structure in structures {
            let group = structure.group_id as usize;
            if groups.len() <= group {
                groups.resize_with(group + 1, Vec::new);
            }
            groups[group].push(structure);
        }
        StructureSet { groups }
    }

    /// Picks a variant of the given group, if the group has any.
    pub fn variant<R: Rng>(&self, group: u32, rng: &mut R) -> Option<&Structure> {
        let variants = self.groups.get(group as usize)?;
        if variants.is_empty() {
            return None;
        }
        let pick = rng.random_range(0..variants.len());
        Some(&variants[pick])
    }

    pub fn group_count(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coords::ChunkCoord;

    fn cactus_text() -> &'static str {
        "Name\nTest Cactus\nId\n2\nDimensions\n1 3 1\nLayers\n8\n8\n8\n"
    }

    #[test]
    fn parses_well_formed_file() {
        let s = Structure::parse(cactus_text(), Path::new("cactus.structure")).unwrap();
        assert_eq!(s.name, "Test Cactus");
        assert_eq!(s.group_id, 2);
        assert_eq!((s.dim_x, s.dim_y, s.dim_z), (1, 3, 1));
    }

    #[test]
    fn rejects_wrong_cell_count() {
        let text = "Name\nBroken\nId\n0\nDimensions\n2 2 2\nLayers\n1 1 1\n";
        let err = Structure::parse(text, Path::new("broken.structure")).unwrap_err();
        assert!(matches!(err, StructureError::Malformed { .. }));
    }

    #[test]
    fn rejects_unknown_block_id() {
        let text = "Name\nBad\nId\n0\nDimensions\n1 1 1\nLayers\n99\n";
        let err = Structure::parse(text, Path::new("bad.structure")).unwrap_err();
        assert!(matches!(err, StructureError::UnknownBlock { id: 99, .. }));
    }

    #[test]
    fn rejects_missing_sections() {
        let text = "Name\nNoLayers\nId\n0\nDimensions\n1 1 1\n";
        assert!(Structure::parse(text, Path::new("x.structure")).is_err());
    }

    #[test]
    fn sentinel_preserves_existing_blocks() {
        let text = "Name\nCarver\nId\n0\nDimensions\n3 1 1\nLayers\n3 255 0\n";
        let s = Structure::parse(text, Path::new("carver.structure")).unwrap();

        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        for x in 0..3 {
            chunk.set_block(x, 10, 0, BlockId::Dirt.into());
        }
        // Centered on x=1, so the template covers x in 0..3.
        s.stamp(&mut chunk, 1, 10, 0);

        assert_eq!(chunk.get_block(0, 10, 0).block_id(), BlockId::Stone);
        assert_eq!(chunk.get_block(1, 10, 0).block_id(), BlockId::Dirt); // sentinel
        assert_eq!(chunk.get_block(2, 10, 0).block_id(), BlockId::Air); // carved
    }

    #[test]
    fn stamping_clips_to_chunk_bounds() {
        let s = Structure::parse(cactus_text(), Path::new("cactus.structure")).unwrap();
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        // Anchor outside the chunk: nothing written, nothing panics.
        s.stamp(&mut chunk, -8, 10, 40);
        assert!(chunk.blocks().iter().all(|b| b.is_air()));
    }

    #[test]
    fn shipped_templates_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("res/structures");
        let set = StructureSet::load_dir(&dir).unwrap();
        assert!(set.group_count() >= 4);
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        for group in 0..4 {
            assert!(set.variant(group, &mut rng).is_some(), "group {group} empty");
        }
    }
}
