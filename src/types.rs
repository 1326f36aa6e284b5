/// Knobs for a single rewrite pass, resolved from config and CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Emit '/' separators in rewritten paths regardless of platform.
    pub normalize_separators: bool,
    /// Write through a temp file and rename it over the output.
    pub atomic: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            normalize_separators: false,
            atomic: true,
        }
    }
}

/// Counts for one processed report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Total lines in the report.
    pub lines: usize,
    /// `SF:` records seen.
    pub records: usize,
    /// `SF:` records whose path was changed.
    pub rewritten: usize,
    /// Absolute `SF:` paths with no relative form from the base (e.g. another drive).
    pub unrelatable: usize,
}

impl std::fmt::Display for RewriteSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} lines, {} SF records, {} rewritten",
            self.lines, self.records, self.rewritten
        )
    }
}
