pub mod artifacts;
pub mod builder;
pub mod charts;
pub mod html;
pub mod pages;

pub use builder::{ReportBuilder, ReportContext, ReportError};
