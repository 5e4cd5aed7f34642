pub mod error;
pub mod http;
pub mod parents_guide;
pub mod summarizer;
pub mod tmdb;
pub mod traits;
pub mod ultramsg;

pub use error::SourceError;
pub use parents_guide::ParentsGuideClient;
pub use summarizer::ChatSummarizer;
pub use tmdb::TmdbClient;
pub use traits::{CatalogSource, DiscoverQuery, Notifier, SensitivitySource, Summarizer};
pub use ultramsg::UltraMsgNotifier;
