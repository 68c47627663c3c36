pub mod orchestrator;


pub use orchestrator::{
    run_batches, BatchOptions, BatchReport, CancelFlag, DocumentOutcome, IngestSummary,
};
