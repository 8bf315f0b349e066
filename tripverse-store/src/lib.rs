pub mod app_config;
pub mod redis_repo;
pub mod remote_source;
pub mod supabase;

pub use app_config::{Config, DataMode};
pub use redis_repo::RedisSessionStorage;
pub use remote_source::RemoteSource;
pub use supabase::SupabaseClient;
