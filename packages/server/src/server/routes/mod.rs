// HTTP routes
pub mod crawl;
pub mod export;
pub mod health;
pub mod stream;

pub use crawl::*;
pub use export::*;
pub use health::*;
pub use stream::*;
