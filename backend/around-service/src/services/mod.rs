pub mod blob_store;
pub mod document_index;
pub mod ingestion;
pub mod search;
pub mod sweeper;

pub use blob_store::{BlobStore, BlobStoreError, S3BlobStore};
pub use document_index::{DocumentIndex, ElasticsearchIndex, IndexError};
pub use ingestion::IngestionPipeline;
pub use search::ProximitySearch;
pub use sweeper::{OrphanSweeper, SweepReport};
