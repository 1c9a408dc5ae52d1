pub mod error;
pub mod models;
pub mod storage;
pub mod text;
pub mod types;

pub use error::Error;
pub use models::{Category, SourceId};
pub use storage::{ArticleFilter, ArticleQuery, ArticleStorage};
pub use types::{ArticleContent, ArticleRecord, ArticleStub, NewArticle};

pub type Result<T> = std::result::Result<T, Error>;
