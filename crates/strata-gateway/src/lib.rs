mod config;
mod error;
mod gateway;
mod interceptor;
pub mod mux;
mod route;

pub use config::{DialOptions, GatewayConfig, MuxOptions};
pub use error::{Code, GatewayError, Status};
pub use gateway::{Gateway, RegisterContext};
pub use interceptor::Interceptor;
pub use mux::Mux;
pub use route::{Handler, Metadata, Route, UnaryHandler};
