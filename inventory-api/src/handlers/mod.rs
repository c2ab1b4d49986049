pub mod app;
pub mod products;

pub use app::app;
