//! Grid persistence (§4.6, §6, §6a.2): a flat `D x D` row-major buffer of
//! IEEE-754 doubles, native endianness, no header or footer. A reader or
//! writer never touches more than the rows it was asked for, which is what
//! lets every DMS peer address the same file concurrently.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::SolverError;

const CELL_BYTES: u64 = 8;

/// Reads and writes row strips of a persisted grid. One concrete
/// implementation backs the binaries (`FileGridStorage`); a second
/// (`MemoryGridStorage`) lets tests exercise the cores without touching disk.
pub trait GridStorage {
    /// Reads `rows` consecutive rows of width `dim` starting at global row
    /// `alloc_start`, returning them as one flat row-major buffer.
    fn read_strip(&self, dim: usize, alloc_start: usize, rows: usize) -> Result<Vec<f64>, SolverError>;

    /// Writes `buffer` (a flat `rows x dim` strip) at global row `alloc_start`.
    fn write_strip(
        &self,
        dim: usize,
        alloc_start: usize,
        rows: usize,
        buffer: &[f64],
    ) -> Result<(), SolverError>;
}

/// A `GridStorage` backed by a single shared file, addressed by byte offset
/// `alloc_start * dim * 8` per §6.
pub struct FileGridStorage {
    path: PathBuf,
}

impl FileGridStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, source: std::io::Error) -> SolverError {
        SolverError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl GridStorage for FileGridStorage {
    fn read_strip(&self, dim: usize, alloc_start: usize, rows: usize) -> Result<Vec<f64>, SolverError> {
        let mut file = File::open(&self.path).map_err(|e| self.io_err(e))?;
        let offset = alloc_start as u64 * dim as u64 * CELL_BYTES;
        file.seek(SeekFrom::Start(offset)).map_err(|e| self.io_err(e))?;

        let mut raw = vec![0u8; rows * dim * CELL_BYTES as usize];
        file.read_exact(&mut raw).map_err(|e| self.io_err(e))?;

        Ok(raw
            .chunks_exact(CELL_BYTES as usize)
            .map(|chunk| f64::from_ne_bytes(chunk.try_into().expect("chunk is 8 bytes")))
            .collect())
    }

    fn write_strip(
        &self,
        dim: usize,
        alloc_start: usize,
        rows: usize,
        buffer: &[f64],
    ) -> Result<(), SolverError> {
        debug_assert_eq!(buffer.len(), rows * dim);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;

        let offset = alloc_start as u64 * dim as u64 * CELL_BYTES;
        file.seek(SeekFrom::Start(offset)).map_err(|e| self.io_err(e))?;

        let mut raw = Vec::with_capacity(buffer.len() * CELL_BYTES as usize);
        for value in buffer {
            raw.extend_from_slice(&value.to_ne_bytes());
        }
        file.write_all(&raw).map_err(|e| self.io_err(e))
    }
}

/// Returns the default input path for a grid of dimension `dim`, per §6a.1's
/// `grids/grid_D.bin` convention.
pub fn default_grid_path(dim: usize) -> PathBuf {
    Path::new("grids").join(format!("grid_{dim}.bin"))
}

/// Returns the default output path for a converged grid, per §6's
/// `grids/grid_D_out.bin` convention.
pub fn default_output_path(dim: usize) -> PathBuf {
    Path::new("grids").join(format!("grid_{dim}_out.bin"))
}

/// An in-memory `GridStorage`, sized for one `dim x dim` grid, for tests that
/// want the real read/write contract without a filesystem.
pub struct MemoryGridStorage {
    dim: usize,
    cells: parking_lot::Mutex<Vec<f64>>,
}

impl MemoryGridStorage {
    pub fn new(dim: usize, cells: Vec<f64>) -> Self {
        assert_eq!(cells.len(), dim * dim, "buffer must be dim x dim");
        Self {
            dim,
            cells: parking_lot::Mutex::new(cells),
        }
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.cells.into_inner()
    }
}

impl GridStorage for MemoryGridStorage {
    fn read_strip(&self, dim: usize, alloc_start: usize, rows: usize) -> Result<Vec<f64>, SolverError> {
        debug_assert_eq!(dim, self.dim);
        let cells = self.cells.lock();
        let start = alloc_start * dim;
        Ok(cells[start..start + rows * dim].to_vec())
    }

    fn write_strip(
        &self,
        dim: usize,
        alloc_start: usize,
        rows: usize,
        buffer: &[f64],
    ) -> Result<(), SolverError> {
        debug_assert_eq!(dim, self.dim);
        debug_assert_eq!(buffer.len(), rows * dim);
        let mut cells = self.cells.lock();
        let start = alloc_start * dim;
        cells[start..start + rows * dim].copy_from_slice(buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_roundtrips_a_strip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.bin");
        let storage = FileGridStorage::new(&path);

        let dim = 4;
        let full = vec![0.0; dim * dim];
        storage.write_strip(dim, 0, dim, &full).unwrap();

        let strip = vec![1.0, 2.0, 3.0, 4.0];
        storage.write_strip(dim, 1, 1, &strip).unwrap();

        let read_back = storage.read_strip(dim, 1, 1).unwrap();
        assert_eq!(read_back, strip);
    }

    #[test]
    fn file_storage_seeks_to_the_right_byte_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.bin");
        let storage = FileGridStorage::new(&path);

        let dim = 3;
        let full: Vec<f64> = (0..dim * dim).map(|i| i as f64).collect();
        storage.write_strip(dim, 0, dim, &full).unwrap();

        let row1 = storage.read_strip(dim, 1, 1).unwrap();
        assert_eq!(row1, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn memory_storage_roundtrips_a_strip() {
        let storage = MemoryGridStorage::new(3, vec![0.0; 9]);
        storage.write_strip(3, 1, 1, &[9.0, 9.0, 9.0]).unwrap();
        assert_eq!(storage.read_strip(3, 1, 1).unwrap(), vec![9.0, 9.0, 9.0]);
        assert_eq!(storage.read_strip(3, 0, 1).unwrap(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn default_paths_follow_the_grids_directory_convention() {
        assert_eq!(default_grid_path(10), Path::new("grids/grid_10.bin"));
        assert_eq!(default_output_path(10), Path::new("grids/grid_10_out.bin"));
    }
}
