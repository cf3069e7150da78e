/// Default row cap applied by the limit transformation when none is given.
pub const DEFAULT_LIMIT: usize = 10;

/// Default name of the single field produced by summarize.
pub const DEFAULT_SUMMARY_FIELD: &str = "summary";

/// Knobs shared by every transformation call.
///
/// Options are plain values; build one with [`TransformOptions::default`] and
/// chain the setters.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub(crate) strict: bool,
    pub(crate) default_limit: usize,
    pub(crate) summary_field: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            strict: false,
            default_limit: DEFAULT_LIMIT,
            summary_field: DEFAULT_SUMMARY_FIELD.to_string(),
        }
    }
}

impl TransformOptions {
    /// Turn silent fallbacks into errors.
    ///
    /// In strict mode a computed column whose length differs from its frame
    /// is rejected instead of dropped, and a column of an unsupported Arrow
    /// type is rejected instead of being bound as an opaque value.
    pub fn strict(self, strict: bool) -> Self {
        TransformOptions { strict, ..self }
    }

    /// Row cap used when a limit transformation asks for zero or fewer rows.
    pub fn default_limit(self, default_limit: usize) -> Self {
        TransformOptions {
            default_limit,
            ..self
        }
    }

    /// Name of the field produced by summarize when no alias is given.
    pub fn summary_field(self, summary_field: impl Into<String>) -> Self {
        TransformOptions {
            summary_field: summary_field.into(),
            ..self
        }
    }

    /// Whether strict mode is on.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// `limit` as a row count, or the default limit when it is not positive.
    pub fn limit_or_default(&self, limit: i64) -> usize {
        if limit <= 0 {
            self.default_limit
        } else {
            usize::try_from(limit).unwrap_or(usize::MAX)
        }
    }
}
