//! Service discovery for Mailgate
//!
//! A [`Directory`] maps a service name to the `host:port` addresses of its
//! live instances. [`DirectoryResolver`] turns that list into one concrete
//! [`ServiceAddress`]. Two directories ship with the crate:
//! - [`ConsulDirectory`]: Consul agent HTTP API
//! - [`StaticDirectory`]: in-process map
//!
//! ```rust
//! use std::sync::Arc;
//! use service_directory::{DirectoryResolver, ServiceAddress, StaticDirectory};
//!
//! # tokio_test_block_on(async {
//! let directory = StaticDirectory::new()
//!     .with_addresses("mail", &[ServiceAddress::new("127.0.0.1", 3030)]);
//! let resolver = DirectoryResolver::new(Arc::new(directory));
//!
//! let address = resolver.resolve_address("mail").await.unwrap();
//! assert_eq!(address.url(), "http://127.0.0.1:3030/");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod address;
pub mod consul;
pub mod directory;
pub mod error;
pub mod resolver;

pub use address::*;
pub use consul::*;
pub use directory::*;
pub use error::*;
pub use resolver::*;
