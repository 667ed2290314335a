pub mod logger_middleware;

pub use logger_middleware::LoggingMiddleware;
