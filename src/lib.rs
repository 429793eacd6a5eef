pub mod config;
pub mod contract;
pub mod dataset;
pub mod delay_manager;
pub mod error;
pub mod exporter;
pub mod host;
pub mod identifier;
pub mod input_loader;
pub mod logger;
pub mod navigation;
pub mod pipeline;
pub mod result_filter;
pub mod resume_manager;
pub mod search_engine;

// Exporting types for convenience
pub use config::{Readiness, Settings};
pub use contract::HostContract;
pub use dataset::AccumulatedDataset;
pub use error::{PipelineError, Warning};
pub use host::{ElementRef, HostDocument, HostError, TableSnapshot};
pub use identifier::Identifier;
pub use input_loader::IdentifierQueue;
pub use pipeline::{Pipeline, RunReport};
pub use result_filter::DateWindow;
