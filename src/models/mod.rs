pub mod schema;
pub mod stock_level;

pub use schema::*;
pub use stock_level::*;
