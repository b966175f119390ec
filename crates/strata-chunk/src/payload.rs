use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_blocks::BlockId;
use strata_grid::{Grid2, Grid3};
use strata_world::{ChunkCoord, Climate, TerrainOutput};

use crate::{PayloadError, rle};

/// Largest horizontal chunk edge a payload may declare.
pub const MAX_CHUNK_SIZE: usize = 512;
/// Largest chunk height a payload may declare.
pub const MAX_CHUNK_HEIGHT: usize = 4096;

/// Block array as it travels: dense ids or `{ "runs": [[count, id], ...] }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockData {
    Dense(Vec<BlockId>),
    Rle { runs: Vec<(u32, BlockId)> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlockEncoding {
    #[default]
    Dense,
    Rle,
}

impl BlockData {
    pub fn encode(blocks: &[BlockId], encoding: BlockEncoding) -> Self {
        match encoding {
            BlockEncoding::Dense => BlockData::Dense(blocks.to_vec()),
            BlockEncoding::Rle => BlockData::Rle {
                runs: rle::encode(blocks),
            },
        }
    }

    pub fn decode(self, expected: usize) -> Result<Vec<BlockId>, PayloadError> {
        match self {
            BlockData::Dense(v) if v.len() == expected => Ok(v),
            BlockData::Dense(v) => Err(PayloadError::BlockLength {
                expected,
                actual: v.len(),
            }),
            BlockData::Rle { runs } => Ok(rle::decode(&runs, expected)?),
        }
    }
}

/// Per-column climate, `x + z * size` order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimatePayload {
    pub temperature: Vec<u8>,
    pub humidity: Vec<u8>,
}

impl ClimatePayload {
    pub fn from_grid(grid: &Grid2<Climate>) -> Self {
        Self {
            temperature: grid.iter().map(|c| c.temperature).collect(),
            humidity: grid.iter().map(|c| c.humidity).collect(),
        }
    }

    pub fn into_grid(self, size: usize) -> Result<Grid2<Climate>, PayloadError> {
        let expected = size * size;
        if self.temperature.len() != expected || self.humidity.len() != expected {
            return Err(PayloadError::ClimateLength {
                expected,
                temperature: self.temperature.len(),
                humidity: self.humidity.len(),
            });
        }
        let cells = self
            .temperature
            .into_iter()
            .zip(self.humidity)
            .map(|(t, h)| Climate::new(t, h))
            .collect();
        Grid2::from_vec(size, size, cells).ok_or(PayloadError::ClimateLength {
            expected,
            temperature: 0,
            humidity: 0,
        })
    }
}

/// Plain-data chunk crossing the generator boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkPayload {
    pub position: ChunkCoord,
    pub size: usize,
    pub height: usize,
    pub blocks: BlockData,
    #[serde(default)]
    pub dirty_blocks: BTreeMap<u32, BlockId>,
    pub climate: ClimatePayload,
}

impl ChunkPayload {
    pub fn from_terrain(coord: ChunkCoord, out: &TerrainOutput, encoding: BlockEncoding) -> Self {
        let (size, height, _) = out.blocks.dims();
        Self {
            position: coord,
            size,
            height,
            blocks: BlockData::encode(out.blocks.as_slice(), encoding),
            dirty_blocks: BTreeMap::new(),
            climate: ClimatePayload::from_grid(&out.climate),
        }
    }

    /// Number of cells the declared dimensions describe, or `None` when they
    /// are empty or exceed [`MAX_CHUNK_SIZE`] / [`MAX_CHUNK_HEIGHT`].
    pub fn cell_count(&self) -> Option<usize> {
        if !(1..=MAX_CHUNK_SIZE).contains(&self.size) || !(1..=MAX_CHUNK_HEIGHT).contains(&self.height)
        {
            return None;
        }
        self.size.checked_mul(self.size)?.checked_mul(self.height)
    }

    /// Checks that the payload belongs to `coord` in a `size x height` session.
    pub fn check(&self, coord: ChunkCoord, size: usize, height: usize) -> Result<(), PayloadError> {
        if self.position != coord {
            return Err(PayloadError::PositionMismatch {
                expected: coord,
                actual: self.position,
            });
        }
        if self.size != size || self.height != height {
            return Err(PayloadError::DimensionMismatch {
                size,
                height,
                actual_size: self.size,
                actual_height: self.height,
            });
        }
        Ok(())
    }

    /// Decodes blocks (dense or run-length) and applies the dirty delta on top.
    pub(crate) fn decode_blocks(self) -> Result<DecodedPayload, PayloadError> {
        let len = self
            .cell_count()
            .ok_or(PayloadError::DimensionsOutOfRange {
                size: self.size,
                height: self.height,
                max_size: MAX_CHUNK_SIZE,
                max_height: MAX_CHUNK_HEIGHT,
            })?;
        let mut data = self.blocks.decode(len)?;
        for (&cell, &id) in &self.dirty_blocks {
            let slot = data
                .get_mut(cell as usize)
                .ok_or(PayloadError::DirtyOutOfRange { cell, len })?;
            *slot = id;
        }
        let blocks = Grid3::from_vec(self.size, self.height, self.size, data).ok_or(
            PayloadError::BlockLength {
                expected: len,
                actual: 0,
            },
        )?;
        let climate = self.climate.into_grid(self.size)?;
        Ok(DecodedPayload {
            position: self.position,
            blocks,
            climate,
            dirty_blocks: self.dirty_blocks,
        })
    }
}

pub(crate) struct DecodedPayload {
    pub position: ChunkCoord,
    pub blocks: Grid3<BlockId>,
    pub climate: Grid2<Climate>,
    pub dirty_blocks: BTreeMap<u32, BlockId>,
}
