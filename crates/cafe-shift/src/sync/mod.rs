mod csv_import;
mod loader;
pub mod remote;
pub mod store;

pub use csv_import::{import_csv, import_csv_path, parse_shift_csv, ImportError};
pub use loader::{LoadError, ShiftLoader, ShiftSnapshot, SnapshotSource};
pub use remote::{AppsScriptClient, GetAllShiftsResponse, RemoteError, ShiftSource};
pub use store::{
    last_viewer, read_cached_shifts, remember_viewer, write_cached_shifts, JsonFileStore,
    MemoryStore, SnapshotStore, StoreError,
};
