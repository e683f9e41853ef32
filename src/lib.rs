//! sheetsite - Spreadsheet-to-structured-data transformer and sitemap assembler
//!
//! This crate reads the sheets of an Excel workbook (XLSX), turns each one into
//! a JSON and a YAML document, and builds sitemaps that point at the generated
//! files.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sheetsite::{SitemapBuilder, TransformerBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Write schema-files/<category>/<stem>.{json,yaml} under ./site
//!     let transformer = TransformerBuilder::new().with_root("site").build()?;
//!     let report = transformer.transform_path("data/site.xlsx".as_ref())?;
//!     println!("{} sheet(s) written", report.written_count());
//!
//!     // Index everything under site/schema-files in site/ai-sitemap.xml
//!     let summary = SitemapBuilder::new().with_root("site").build()?.assemble()?;
//!     println!("{} URL(s)", summary.url_count());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Sheet Table
//!
//! ```rust,no_run
//! use sheetsite::{SheetLayout, SheetSpec, SheetTable, TransformerBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = SheetTable::new(vec![
//!     SheetSpec::new("About", "schema-files/organization", "main-data", SheetLayout::KeyValue),
//!     SheetSpec::new("Menu", "schema-files/menu", "menu-list", SheetLayout::List),
//! ]);
//!
//! let transformer = TransformerBuilder::new()
//!     .with_sheet_table(table)
//!     .with_site_url_sheet("About")
//!     .build()?;
//! transformer.transform_path("data/site.xlsx".as_ref())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Single-Client Profile
//!
//! ```rust,no_run
//! use sheetsite::ProfileBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // main-data, licenses and services-list from a one-row client sheet
//! let generator = ProfileBuilder::new().with_root("site").build()?;
//! let report = generator.generate_path("data/client-data.xlsx".as_ref())?;
//! println!("{} license(s)", report.profile.licenses.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Client Sitemaps
//!
//! ```rust,no_run
//! use sheetsite::ClientSitemapBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let assembler = ClientSitemapBuilder::new().with_root("site").build()?;
//! let outcome = assembler.run("data/clients.xlsx".as_ref());
//! print!("{}", outcome.report().render());
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod coerce;
mod config;
mod domain;
mod error;
mod formatter;
mod grid;
mod handoff;
mod output;
mod parser;
mod profile;
mod sitemap;
mod types;

// 公開API
pub use api::{OutputFormat, SheetLayout};
pub use builder::{
    HandoffOutcome, SheetOutcome, SheetReport, TransformReport, Transformer, TransformerBuilder,
    DEFAULT_SITE_URL_SHEET, WEBSITE_FIELD,
};
pub use coerce::{coerce_cell, coerce_value, NULL_SENTINELS, SAME_AS_FIELD};
pub use config::{SheetSpec, SheetTable};
pub use domain::{normalize_domain, slugify, DomainRejection, PLACEHOLDER_DOMAINS};
pub use error::SheetSiteError;
pub use formatter::cell_text;
pub use grid::SheetGrid;
pub use handoff::{read_site_url, resolve_base_url, write_site_url, DEFAULT_BASE_URL, HANDOFF_PATH};
pub use output::{write_document_pair, PairOutcome, WriteFailure};
pub use profile::{
    split_licenses, ClientProfile, ProfileBuilder, ProfileGenerator, ProfileOutput, ProfileReport,
    CORE_FIELDS, LICENSES_FIELD, SERVICE_PREFIX,
};
pub use sitemap::{
    format_lastmod, join_url, render_urlset, write_sitemap, ClientRunOutcome,
    ClientSitemapAssembler, ClientSitemapBuilder, RowOutcome, RunReport, SitemapAssembler,
    SitemapBuilder, SitemapEntry, SitemapSummary, SITEMAP_NAMESPACE,
};
pub use types::{CellValue, Document, Record};
