#![allow(dead_code)]

pub mod entities;
pub mod memory;

#[allow(unused_imports)]
pub use entities::{Order, Product};
#[allow(unused_imports)]
pub use memory::{MemoryHandle, MemorySource};
#[allow(unused_imports)]
pub use repositories::{OrderRepository, ProductRepository};

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per test binary; `RUST_LOG` controls output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
