//! Parser configuration

/// How keyword spellings are checked against the declared language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordPolicy {
    /// Both vocabularies are accepted anywhere in any program
    #[default]
    Merged,
    /// Keywords and type names must be spelled in the header's language.
    /// `boolean` is shared by both vocabularies.
    PerLanguage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub keyword_policy: KeywordPolicy,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword_policy(mut self, policy: KeywordPolicy) -> Self {
        self.keyword_policy = policy;
        self
    }
}
