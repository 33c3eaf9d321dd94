pub mod data;
pub mod lifecycle;
pub mod lookup;
pub mod source;

pub use data::{BootstrapError, ReferenceCounts, ReferenceData, ReferenceDataBuilder};
pub use lifecycle::{Phase, ReferenceDataLifecycle, ReferenceDataState};
pub use lookup::RegistryItemLookup;
pub use source::{
    DataSet, DataSetPayload, FileSource, HttpSource, MemorySource, ReferenceSource, SourceError,
};
