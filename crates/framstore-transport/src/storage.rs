use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};

/// Value of a cell that has never been written.
pub const ERASED_BYTE: u8 = 0xFF;

/// Backing cells of a simulated device.
///
/// Offsets passed in are always `< capacity()` and ranges never cross the
/// end; wrap-around is resolved by the caller.
pub trait Storage {
    /// Size of the cell array in bytes.
    fn capacity(&self) -> usize;

    /// Fill `buf` from cells starting at `offset`.
    fn read_at(&mut self, offset: usize, buf: &mut [u8]) -> Result<()>;

    /// Store `data` into cells starting at `offset`.
    fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<()>;
}

/// Volatile cells held in memory.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    cells: Vec<u8>,
}

impl MemoryStorage {
    /// Create `capacity` erased cells.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![ERASED_BYTE; capacity],
        }
    }

    /// Borrow the raw cell array.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl Storage for MemoryStorage {
    fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn read_at(&mut self, offset: usize, buf: &mut [u8]) -> Result<()> {
        buf.copy_from_slice(&self.cells[offset..offset + buf.len()]);
        Ok(())
    }

    fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        self.cells[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }
}

/// Cells persisted in an image file, so contents survive process restarts.
///
/// The file is created on first open and padded with [`ERASED_BYTE`] up to
/// the requested capacity. An existing larger image is left untouched; only
/// the first `capacity` bytes are addressed.
#[derive(Debug)]
pub struct FileStorage {
    file: File,
    path: PathBuf,
    capacity: usize,
}

impl FileStorage {
    /// Open (or create) an image of `capacity` bytes at `path`.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| TransportError::Open {
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(open_err)?;

        let existing = file.metadata().map_err(open_err)?.len() as usize;
        if existing < capacity {
            debug!(?path, existing, capacity, "padding device image");
            file.seek(SeekFrom::Start(existing as u64))
                .map_err(open_err)?;
            file.write_all(&vec![ERASED_BYTE; capacity - existing])
                .map_err(open_err)?;
            file.flush().map_err(open_err)?;
        }

        info!(?path, capacity, "opened device image");

        Ok(Self {
            file,
            path,
            capacity,
        })
    }

    /// Path of the image file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read_at(&mut self, offset: usize, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(data)?;
        self.file.flush()?;
        Ok(())
    }
}
