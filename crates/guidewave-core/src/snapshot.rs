//! End-of-run field snapshots on disk.
//!
//! A [`Snapshot`] pairs the permittivity map with the final $E_z$ field. It is
//! stored as a NumPy `.npz` archive with two members, `eps.npy` and `ez.npy`, each a
//! 2D `f64` array indexed `[x][y]`, so the data can be inspected with any
//! NumPy-compatible tool. Runs write it to [`DEFAULT_SNAPSHOT`] by default.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::Array2;
use ndarray_npy::{NpzReader, NpzWriter, ReadNpzError, WriteNpzError};
use thiserror::Error;

/// File name a run writes its snapshot to unless told otherwise. The
/// content is an `.npz` archive regardless of the extension.
pub const DEFAULT_SNAPSHOT: &str = "output.pckl";

/// Archive member holding the permittivity map.
pub const EPS_ARRAY: &str = "eps";
/// Archive member holding the $E_z$ field.
pub const EZ_ARRAY: &str = "ez";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write snapshot: {0}")]
    Write(#[from] WriteNpzError),

    #[error("Failed to read snapshot: {0}")]
    Read(#[from] ReadNpzError),

    #[error("Snapshot is missing the '{0}' array")]
    MissingArray(&'static str),

    #[error("Snapshot arrays differ in shape: eps is {eps:?}, ez is {ez:?}")]
    ShapeMismatch { eps: (usize, usize), ez: (usize, usize) },
}

/// Permittivity and field arrays captured at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub eps: Array2<f64>,
    pub ez: Array2<f64>,
}

impl Snapshot {
    /// Pair two arrays, checking that they share a shape.
    pub fn new(eps: Array2<f64>, ez: Array2<f64>) -> Result<Self, SnapshotError> {
        if eps.dim() != ez.dim() {
            return Err(SnapshotError::ShapeMismatch {
                eps: eps.dim(),
                ez: ez.dim(),
            });
        }
        Ok(Self { eps, ez })
    }

    /// `(nx, ny)` of both arrays.
    pub fn dim(&self) -> (usize, usize) {
        self.eps.dim()
    }

    /// Write both arrays to an `.npz` archive, replacing any existing file.
    pub fn write_npz(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut npz = NpzWriter::new(BufWriter::new(file));
        npz.add_array(format!("{EPS_ARRAY}.npy"), &self.eps)?;
        npz.add_array(format!("{EZ_ARRAY}.npy"), &self.ez)?;
        npz.finish()?;
        log::debug!("Wrote {}x{} snapshot to {}", self.eps.nrows(), self.eps.ncols(), path.display());
        Ok(())
    }

    /// Read a snapshot written by [`write_npz`](Self::write_npz).
    ///
    /// Members may be named with or without the `.npy` suffix.
    pub fn read_npz(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut npz = NpzReader::new(BufReader::new(file))?;
        let names = npz.names()?;

        let mut fetch = |wanted: &'static str| -> Result<Array2<f64>, SnapshotError> {
            let name = names
                .iter()
                .find(|n| n.as_str() == wanted || n.strip_suffix(".npy") == Some(wanted))
                .ok_or(SnapshotError::MissingArray(wanted))?;
            Ok(npz.by_name(name)?)
        };
        let eps = fetch(EPS_ARRAY)?;
        let ez = fetch(EZ_ARRAY)?;
        Self::new(eps, ez)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("guidewave-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_write_then_read_preserves_arrays() {
        let snapshot = Snapshot::new(
            array![[1.0, 12.0, 1.0], [1.0, 12.0, 1.0]],
            array![[0.0, -0.25, 1e-9], [3.5, f64::MIN_POSITIVE, -7.0]],
        )
        .unwrap();
        let path = scratch_path("roundtrip.npz");
        snapshot.write_npz(&path).unwrap();
        let loaded = Snapshot::read_npz(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.dim(), (2, 3));
    }

    #[test]
    fn test_default_name_holds_an_npz_archive() {
        let snapshot = Snapshot::new(Array2::ones((3, 2)), Array2::zeros((3, 2))).unwrap();
        let dir = scratch_path("default-name");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(DEFAULT_SNAPSHOT);
        snapshot.write_npz(&path).unwrap();
        let names = NpzReader::new(File::open(&path).unwrap()).unwrap().names().unwrap();
        let loaded = Snapshot::read_npz(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(DEFAULT_SNAPSHOT, "output.pckl");
        assert_eq!(names, vec!["eps.npy".to_string(), "ez.npy".to_string()]);
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = Snapshot::new(Array2::zeros((2, 3)), Array2::zeros((3, 2))).unwrap_err();
        assert!(matches!(err, SnapshotError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_missing_array_reported() {
        let path = scratch_path("missing.npz");
        {
            let mut npz = NpzWriter::new(File::create(&path).unwrap());
            npz.add_array("eps", &Array2::<f64>::zeros((2, 2))).unwrap();
            npz.finish().unwrap();
        }
        let err = Snapshot::read_npz(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, SnapshotError::MissingArray("ez")));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Snapshot::read_npz(scratch_path("does-not-exist.npz")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
