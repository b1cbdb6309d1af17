// ABOUTME: Named, strictly ordered sections of a backup artifact
// ABOUTME: pre-data, data, post-data and their per-run states

use std::fmt;

/// A named partition of a backup artifact, restorable independently.
///
/// Sections carry a strict order: schema objects first, then rows, then
/// indexes and constraints. The derived `Ord` follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    PreData,
    Data,
    PostData,
}

impl Section {
    /// All sections in restore order.
    pub const ALL: [Section; 3] = [Section::PreData, Section::Data, Section::PostData];

    /// The external tool's section name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::PreData => "pre-data",
            Section::Data => "data",
            Section::PostData => "post-data",
        }
    }

    pub fn parse(name: &str) -> Option<Section> {
        match name {
            "pre-data" => Some(Section::PreData),
            "data" => Some(Section::Data),
            "post-data" => Some(Section::PostData),
            _ => None,
        }
    }

    /// The section after this one, if any.
    pub fn next(&self) -> Option<Section> {
        match self {
            Section::PreData => Some(Section::Data),
            Section::Data => Some(Section::PostData),
            Section::PostData => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one section within a restore invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}
