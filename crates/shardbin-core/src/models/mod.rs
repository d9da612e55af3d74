pub mod catalog;
pub mod session;

pub use catalog::CatalogRecord;
pub use session::{SessionStatus, UploadSession};
