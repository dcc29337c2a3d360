// Domain models: tracked rows, identities, collector kinds and output media

mod kind;
mod row;

pub use kind::{CollectorKind, Medium};
pub use row::{DefinitionStats, Measurement, SeriesIdent, TrackedRow, VolumeStats};
