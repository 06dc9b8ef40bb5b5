pub mod headerorder;
pub mod request;
pub mod requestbody;
pub mod response;
pub mod responsebody;
pub mod streamfactory;
pub mod transaction;

// Re-exports for convenience
pub use request::{RequestBuilder, RequestSpec};
pub use requestbody::RequestBody;
pub use response::{RequestEcho, ResponseMeta, ResponseView, TlsVersion};
pub use responsebody::ResponseBody;
pub use transaction::{Transport, TransportBuilder};
