//! Extractor trait for pulling records out of the Seqera API

use eyre::Result;

/// Extractor trait for extracting data from a source
///
/// Implementors define how to extract items from sources like:
/// - Paginated API listings
/// - Per-workspace workflow fetches
///
/// # Example
/// ```no_run
/// use seqera_io_usage::etl::Extractor;
/// use eyre::Result;
///
/// struct StaticExtractor {
///     ids: Vec<String>,
/// }
///
/// impl Extractor for StaticExtractor {
///     type Item = String;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         Ok(self.ids.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract items from the source
    ///
    /// # Errors
    /// Returns an error only for failures the source cannot degrade into an
    /// empty result (e.g. an undecodable response body).
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
