mod moka;
mod null;
mod redis;

pub use self::moka::MokaUrlCache;
pub use self::null::NullUrlCache;
pub use self::redis::RedisUrlCache;
