//! ## Summary
//! The booking store: an ordered list of bookings mirrored to one JSON file.
//!
//! Records are only ever appended. `persist` rewrites the whole file through
//! a sibling temporary file so readers never observe a half-written list.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use yoyaku_core::types::Booking;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct BookingStore {
    path: PathBuf,
    bookings: Vec<Booking>,
}

impl BookingStore {
    /// Creates an empty store that will persist to `path`. Nothing is read.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bookings: Vec::new(),
        }
    }

    /// ## Summary
    /// Opens the store at `path`, loading any bookings already persisted there.
    ///
    /// ## Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let bookings = load(&path)?;
        Ok(Self { path, bookings })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All bookings in insertion order.
    #[must_use]
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Adds a booking to the in-memory list. No validation, no deduplication.
    pub fn append(&mut self, booking: Booking) -> &Booking {
        tracing::debug!(name = %booking.name, start = %booking.start, "Appending booking");
        let index = self.bookings.len();
        self.bookings.push(booking);
        &self.bookings[index]
    }

    /// ## Summary
    /// Appends a booking and persists the list.
    ///
    /// If persisting fails the booking is dropped again, so the in-memory
    /// list never holds a record the file lacks.
    ///
    /// ## Errors
    /// Returns the error from [`Self::persist`].
    pub fn append_and_persist(&mut self, booking: Booking) -> StoreResult<&Booking> {
        let index = self.bookings.len();
        self.append(booking);

        if let Err(err) = self.persist() {
            self.bookings.truncate(index);
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "Persist failed, append rolled back"
            );
            return Err(err);
        }

        Ok(&self.bookings[index])
    }

    /// ## Summary
    /// Writes the full list to disk, replacing the previous contents.
    ///
    /// ## Errors
    /// Returns an error if serialization, writing the temporary file or the
    /// final rename fails.
    pub fn persist(&self) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(&self.bookings)
            .map_err(|err| StoreError::serialization(&self.path, err))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }

        let staging = staging_path(&self.path);
        fs::write(&staging, json).map_err(|err| StoreError::io(&staging, err))?;
        fs::rename(&staging, &self.path).map_err(|err| StoreError::io(&self.path, err))?;

        tracing::info!(
            path = %self.path.display(),
            count = self.bookings.len(),
            "Persisted bookings"
        );
        Ok(())
    }
}

/// ## Summary
/// Reads the bookings persisted at `path`.
///
/// A missing file is an empty store. Records without a `recurrence` field
/// load as non-recurring.
///
/// ## Errors
/// Returns an error if the file exists but cannot be read or is not a JSON
/// list of bookings.
pub fn load(path: &Path) -> StoreResult<Vec<Booking>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No booking file yet, starting empty");
            return Ok(Vec::new());
        }
        Err(err) => return Err(StoreError::io(path, err)),
    };

    let bookings: Vec<Booking> =
        serde_json::from_str(&raw).map_err(|err| StoreError::serialization(path, err))?;
    tracing::debug!(path = %path.display(), count = bookings.len(), "Loaded bookings");
    Ok(bookings)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
