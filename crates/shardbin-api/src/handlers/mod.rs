pub mod chunked_upload;
pub mod health;
