//! Constructors for backend notifications.

use std::path::Path;

use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind};
use notify::{Event, EventKind};

/// A content modification of `path`.
pub fn write_event(path: impl AsRef<Path>) -> Event {
    Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(path.as_ref().to_path_buf())
}

/// A file creation at `path`.
pub fn create_event(path: impl AsRef<Path>) -> Event {
    Event::new(EventKind::Create(CreateKind::File)).add_path(path.as_ref().to_path_buf())
}

/// An attribute change (e.g. `touch`, `chmod`) of `path`.
pub fn metadata_event(path: impl AsRef<Path>) -> Event {
    Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)))
        .add_path(path.as_ref().to_path_buf())
}
