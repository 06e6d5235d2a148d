//! paperlens-ingestion — Paper discovery and full-text extraction.
//! - arXiv Atom search (`sources::arxiv`)
//! - PDF download, text extraction, section and figure/table detection (`pdf`)
//! - Word-window chunking of paper text for prompt budgets (`chunker`)

pub mod sources;
pub mod pdf;
pub mod chunker;

pub use pdf::{PdfProcessor, ProcessedPdf};
pub use sources::arxiv::ArxivClient;
pub use sources::LiteratureSource;
