/// PostgreSQL plumbing
///
/// - `pool`: connection pool with health checks
/// - `migrations`: embedded schema migrations
///
/// Row types and their queries live in `models`; the stores reach them
/// through `repository::postgres`.

pub mod migrations;
pub mod pool;
