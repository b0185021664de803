use std::env;

use chunk_stack::{ChunkedStack, StackConfig, StackError};
use chunkalloc::block::MmapAllocator;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,chunk_stack=trace";

fn main() -> Result<(), StackError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Elements per chunk, small so that chunk allocations show up in the log.
    let per_chunk = env::var("CHUNK_STACK_ELEMENTS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(2);

    let config = StackConfig::new(8)
        .with_chunk_elements(per_chunk)
        .with_description("example");
    let mut stack = ChunkedStack::with_config_in(config, MmapAllocator)?;

    for i in 1..=5u64 {
        stack.push(&i.to_le_bytes())?;
        info!(value = i, count = stack.count(), chunks = stack.chunk_count(), "pushed");
    }

    let mut out = [0u8; 8];
    while !stack.is_empty() {
        stack.pop(Some(&mut out))?;
        info!(
            value = u64::from_le_bytes(out),
            count = stack.count(),
            chunks = stack.chunk_count(),
            "popped"
        );
    }

    if let Err(e) = stack.discard() {
        info!(code = e.code(), error = %e, "discard on empty stack");
    }
    Ok(())
}
