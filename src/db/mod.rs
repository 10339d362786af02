pub mod pool;
pub mod schema;
pub mod size;

pub use pool::create_pool;
pub use schema::init_schema;
pub use size::{PgSizeProbe, SizeProbe};
