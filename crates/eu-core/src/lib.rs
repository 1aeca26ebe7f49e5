pub mod anchors;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod persist;
pub mod scene;
pub mod selection;
pub mod share;

pub use anchors::{Anchor, AnchorOwner, closest_anchor, shape_anchors};
pub use error::{ShareError, StorageError};
pub use geometry::BoundingBox;
pub use id::ElementId;
pub use model::*;
pub use persist::{DiagramStorage, FileStorage, MemoryStorage, PersistConfig, STORAGE_KEY};
pub use scene::{PendingConnection, Scene};
pub use selection::Selection;

// Re-export kurbo's point type so downstream crates share one geometry vocabulary
pub use kurbo::{Point, Vec2};
