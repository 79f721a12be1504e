use crate::error::ShortenerError;
use crate::id::UrlId;
use crate::registry::UrlRecord;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};

type Result<T> = std::result::Result<T, ShortenerError>;

/// Expiration policy for a shortened URL.
///
/// Every record expires; there is no "never" variant because expired ids are
/// what keeps the namespace bounded.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpirationPolicy {
    /// The shortened URL expires after a certain duration from now.
    AfterDuration(SignedDuration),
    /// The shortened URL expires at a specific timestamp.
    AtTimestamp(Timestamp),
}

impl ExpirationPolicy {
    /// Resolves the policy to an absolute deadline relative to `now`.
    ///
    /// Fails unless the deadline lies strictly after `now`.
    pub fn deadline(&self, now: Timestamp) -> Result<Timestamp> {
        let expire_at = match self {
            Self::AfterDuration(duration) => now.checked_add(*duration).map_err(|e| {
                ShortenerError::InvalidExpiration(format!("invalid duration {duration}: {e}"))
            })?,
            Self::AtTimestamp(timestamp) => *timestamp,
        };

        if expire_at <= now {
            return Err(ShortenerError::InvalidExpiration(format!(
                "{expire_at} is not after {now}"
            )));
        }

        Ok(expire_at)
    }
}

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// The expiration policy for the shortened URL.
    pub expiration: ExpirationPolicy,
}

impl ShortenParams {
    pub fn new(original_url: impl Into<String>, expiration: ExpirationPolicy) -> Self {
        Self {
            original_url: original_url.into(),
            expiration,
        }
    }
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Stores a URL under a freshly allocated id and returns the id.
    async fn shorten(&self, params: ShortenParams) -> Result<UrlId>;

    /// Resolves an id to its stored URL record.
    /// Returns `None` if the id does not exist or has expired.
    async fn resolve(&self, id: UrlId) -> Result<Option<UrlRecord>>;

    /// Deletes a shortened URL and frees its id.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, id: UrlId) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_duration_deadline() {
        let now = Timestamp::now();
        let policy = ExpirationPolicy::AfterDuration(SignedDuration::from_secs(30));
        assert_eq!(
            policy.deadline(now).unwrap(),
            now + SignedDuration::from_secs(30)
        );
    }

    #[test]
    fn past_or_present_deadline_is_rejected() {
        let now = Timestamp::now();

        let err = ExpirationPolicy::AtTimestamp(now).deadline(now).unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidExpiration(_)));

        let err = ExpirationPolicy::AfterDuration(SignedDuration::from_secs(-1))
            .deadline(now)
            .unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidExpiration(_)));
    }
}
