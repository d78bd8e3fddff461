pub mod directives;
pub mod error;
pub mod extract;
pub mod patterns;

pub use directives::{CaseMode, DirectiveResolver, DirectiveScan, SkippedDirective};
pub use error::{Result, ScanError};
pub use extract::{
    Located, extract_endpoints, extract_endpoints_located, extract_redirects,
    extract_redirects_located,
};
pub use patterns::{Capture, Pattern, PatternSet, RawMatch};
