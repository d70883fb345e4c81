//! Document tree maintenance: headings, table-of-contents sections, the root
//! index, cross-reference checks and template-based document generation.

pub mod document;
pub mod error;
pub mod generator;
pub mod heading;
pub mod index;
pub mod reference;
pub mod toc;
pub mod updater;

pub use document::Document;
pub use error::DocsError;
pub use generator::DocumentGenerator;
pub use heading::{Heading, HeadingExtractor};
pub use index::IndexBuilder;
pub use reference::{Issue, ReferenceBatch, ReferenceChecker, ReferenceReport};
pub use toc::{generate_anchor, render, TocSynthesizer};
pub use updater::{BatchReport, Summary, TocUpdater, UpdateResult, UpdateStatus};
