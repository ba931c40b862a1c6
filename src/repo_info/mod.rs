//! Repository information capability
//!
//! Consumers depend on [`RepoInfoProvider`], never on a concrete client. The
//! only implementation shipped here is [`StubRepoInfoProvider`]; a provider
//! backed by a remote API plugs in through the same trait.

/// Repository name and its star count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub name: String,
    pub stars: usize,
}

/// Trait for looking up repository details
///
/// Implementations should be thread-safe (Send + Sync).
pub trait RepoInfoProvider: Send + Sync {
    /// Get details for the named repository
    fn repo(&self, name: &str) -> RepoInfo;
}

/// Stub provider: the star count is the number of characters in the name
///
/// # Example
///
/// ```
/// use gitstars::repo_info::{RepoInfoProvider, StubRepoInfoProvider};
///
/// let info = StubRepoInfoProvider.repo("throw");
/// assert_eq!(info.stars, 5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StubRepoInfoProvider;

impl RepoInfoProvider for StubRepoInfoProvider {
    fn repo(&self, name: &str) -> RepoInfo {
        RepoInfo {
            name: name.to_string(),
            stars: name.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_counts_characters() {
        let provider = StubRepoInfoProvider;
        assert_eq!(
            provider.repo("throw"),
            RepoInfo {
                name: "throw".to_string(),
                stars: 5
            }
        );
        assert_eq!(provider.repo("").stars, 0);
        // Unicode scalar values, not bytes
        assert_eq!(provider.repo("星星").stars, 2);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let provider: std::sync::Arc<dyn RepoInfoProvider> =
            std::sync::Arc::new(StubRepoInfoProvider);
        assert_eq!(provider.repo("gitstars").stars, 8);
    }
}
