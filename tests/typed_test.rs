use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use chunk_stack::*;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct Point {
    x: f64,
    y: f64,
    tag: u64,
}

#[repr(C, align(64))]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Wide([u8; 64]);

#[test]
fn typed_values_come_back_in_reverse() -> Result<()> {
    let mut stack = TypedStack::<Point>::with_chunk_elements(3)?;
    for i in 0..10 {
        stack.push(Point {
            x: i as f64,
            y: -(i as f64),
            tag: i as u64,
        })?;
    }
    assert_eq!(stack.len(), 10);
    assert_eq!(stack.as_bytes().chunk_count(), 4);
    for i in (0..10).rev() {
        let point = stack.pop()?;
        assert_eq!(point.tag, i as u64);
        assert_eq!(point.x, i as f64);
    }
    assert!(stack.is_empty());
    assert_eq!(stack.as_bytes().chunk_count(), 0);
    Ok(())
}

#[test]
fn peek_and_modify_top() -> Result<()> {
    let mut stack = TypedStack::<u64>::new()?;
    assert!(matches!(stack.peek(), Err(StackError::Underflow { .. })));
    stack.push(1)?;
    stack.push(2)?;
    assert_eq!(*stack.peek()?, 2);
    *stack.peek_mut()? += 40;
    assert_eq!(stack.pop()?, 42);
    stack.discard()?;
    assert!(matches!(stack.pop(), Err(StackError::Underflow { .. })));
    Ok(())
}

#[test]
fn typed_pop_n_orders() -> Result<()> {
    let mut stack = TypedStack::<u8>::with_chunk_elements(2)?;
    for c in b"abc" {
        stack.push(*c)?;
    }
    assert_eq!(stack.pop_n(3)?, b"cba".to_vec());
    for c in b"abc" {
        stack.push(*c)?;
    }
    assert_eq!(stack.pop_n_reverse(3)?, b"abc".to_vec());

    stack.push(b'z')?;
    assert!(matches!(
        stack.pop_n(2),
        Err(StackError::Underflow {
            requested: 2,
            available: 1
        })
    ));
    assert_eq!(stack.len(), 1);
    stack.clear();
    assert!(stack.is_empty());
    Ok(())
}

#[test]
fn rejects_unstorable_types() {
    assert!(matches!(
        TypedStack::<()>::new(),
        Err(StackError::InvalidArgument { .. })
    ));

    assert!(matches!(
        TypedStack::<Wide>::new(),
        Err(StackError::InvalidArgument { .. })
    ));
    // Page aligned mappings can hold it.
    assert!(TypedStack::<Wide, _>::with_config_in(StackConfig::new(64), MmapAllocator).is_ok());

    assert!(matches!(
        TypedStack::<u32, _>::with_config_in(StackConfig::new(8), HeapAllocator),
        Err(StackError::InvalidArgument { .. })
    ));
}

#[test]
fn wide_values_are_aligned() -> Result<()> {
    let config = StackConfig::new(64).with_chunk_elements(5);
    let mut stack = TypedStack::<Wide, _>::with_config_in(config, MmapAllocator)?;
    for i in 0..12u8 {
        stack.push(Wide([i; 64]))?;
        assert_eq!(stack.peek()? as *const Wide as usize % 64, 0);
    }
    assert_eq!(stack.pop()?.0[0], 11);
    Ok(())
}

#[test]
fn typed_storage_reads_back_as_bytes() -> Result<()> {
    let mut stack = TypedStack::<Point>::new()?;
    let point = Point {
        x: 1.5,
        y: -2.0,
        tag: 7,
    };
    stack.push(point)?;
    let bytes = stack.as_bytes().peek()?;
    assert_eq!(bytes, bytemuck::bytes_of(&point));
    Ok(())
}

#[test]
fn pooled_block_moves_from_typed_to_byte_stack() -> Result<()> {
    let per_chunk = 4;
    let config = StackConfig::new(std::mem::size_of::<Point>()).with_chunk_elements(per_chunk);
    let pool: Arc<BlockPool> = Arc::new(BlockPool::with_capacity_for(&config, 2)?);

    let mut typed = TypedStack::<Point, _>::with_config_in(config.clone(), Arc::clone(&pool))?;
    for i in 0..per_chunk as u64 {
        typed.push(Point {
            x: i as f64,
            y: 0.25,
            tag: u64::MAX - i,
        })?;
    }
    typed.clear();
    assert_eq!(pool.len(), 1);

    // The recycled chunk still holds the typed values, every byte of it is readable.
    let mut bytes = ChunkedStack::with_config_in(config, Arc::clone(&pool))?;
    let slot = bytes.push_uninitialized()?;
    let first = Point {
        x: 0.0,
        y: 0.25,
        tag: u64::MAX,
    };
    assert_eq!(&slot[..], bytemuck::bytes_of(&first));
    assert_eq!(pool.len(), 0);
    assert_eq!(bytes.peek()?.iter().filter(|b| **b == 0xff).count(), 8);
    Ok(())
}
