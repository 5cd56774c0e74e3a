use crate::constants::*;

/// Key of a full-height chunk column on the XZ plane.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// Chunk containing the given world column.
    pub fn of_world(wx: i32, wz: i32) -> Self {
        ChunkCoord {
            x: chunk_of(wx),
            z: chunk_of(wz),
        }
    }

    /// Square-ring distance: `max(|dx|, |dz|)`. This is the metric used for
    /// load radii and eviction, not Manhattan or Euclidean distance.
    pub fn ring_distance(&self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// World coordinate of this chunk's minimum corner.
    pub fn world_base(&self) -> (i32, i32) {
        (self.x * CHUNK_SIZE, self.z * CHUNK_SIZE)
    }

    /// Packs both axes into an `i64` for atomic viewpoint snapshots.
    pub fn pack(&self) -> i64 {
        (((self.x as u32) as i64) << 32) | ((self.z as u32) as i64)
    }

    pub fn unpack(packed: i64) -> Self {
        ChunkCoord {
            x: (packed >> 32) as i32,
            z: packed as i32,
        }
    }
}

/// Chunk index of a world coordinate. The only place (together with
/// [`local_of`]) where this floor arithmetic is performed.
pub fn chunk_of(w: i32) -> i32 {
    w.div_euclid(CHUNK_SIZE)
}

/// In-chunk offset of a world coordinate, always in `0..CHUNK_SIZE`.
pub fn local_of(w: i32) -> i32 {
    w.rem_euclid(CHUNK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_local_round_trip() {
        for w in -1000..1000 {
            let local = local_of(w);
            assert!((0..CHUNK_SIZE).contains(&local), "local out of range for {w}");
            assert_eq!(chunk_of(w) * CHUNK_SIZE + local, w);
        }
    }

    #[test]
    fn negative_coords_floor_toward_negative_infinity() {
        assert_eq!(chunk_of(-1), -1);
        assert_eq!(local_of(-1), CHUNK_SIZE - 1);
        assert_eq!(chunk_of(-CHUNK_SIZE), -1);
        assert_eq!(local_of(-CHUNK_SIZE), 0);
        assert_eq!(chunk_of(0), 0);
        assert_eq!(chunk_of(CHUNK_SIZE), 1);
    }

    #[test]
    fn ring_distance_is_square() {
        let origin = ChunkCoord::new(0, 0);
        assert_eq!(origin.ring_distance(ChunkCoord::new(3, -2)), 3);
        assert_eq!(origin.ring_distance(ChunkCoord::new(-4, 4)), 4);
        assert_eq!(origin.ring_distance(origin), 0);
    }

    #[test]
    fn pack_round_trips_negative_coords() {
        for coord in [
            ChunkCoord::new(0, 0),
            ChunkCoord::new(-1, 1),
            ChunkCoord::new(i32::MIN, i32::MAX),
            ChunkCoord::new(12345, -54321),
        ] {
            assert_eq!(ChunkCoord::unpack(coord.pack()), coord);
        }
    }
}
