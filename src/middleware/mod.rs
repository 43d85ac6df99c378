pub mod rate_limit;
pub mod request_id;
pub mod viewer;

pub use viewer::Viewer;
