use chunk_stack::ChunkedStack;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(u32),
    Pop,
    Discard,
    PopN(usize),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => any::<u32>().prop_map(Op::Push),
        3 => Just(Op::Pop),
        1 => Just(Op::Discard),
        1 => (0usize..6).prop_map(Op::PopN),
        1 => Just(Op::Clear),
    ]
}

fn chunks_needed(len: usize, per_chunk: usize) -> usize {
    (len + per_chunk - 1) / per_chunk
}

proptest! {
    #[test]
    fn pops_return_pushes_in_reverse(values in prop::collection::vec(any::<[u8; 3]>(), 0..200), per_chunk in 1usize..9) {
        let mut stack = ChunkedStack::new(3, per_chunk * 3).unwrap();
        for value in &values {
            stack.push(value).unwrap();
        }
        prop_assert_eq!(stack.count(), values.len());
        let mut out = [0u8; 3];
        for value in values.iter().rev() {
            stack.pop(Some(&mut out)).unwrap();
            prop_assert_eq!(&out, value);
        }
        prop_assert!(stack.is_empty());
        prop_assert_eq!(stack.chunk_count(), 0);
    }

    #[test]
    fn stack_matches_vec_model(ops in prop::collection::vec(op(), 0..300), per_chunk in 1usize..6, slack in 0usize..4) {
        let mut stack = ChunkedStack::new(4, per_chunk * 4 + slack).unwrap();
        let mut model: Vec<u32> = Vec::new();
        let mut out = [0u8; 4];

        for op in ops {
            match op {
                Op::Push(value) => {
                    stack.push(&value.to_ne_bytes()).unwrap();
                    model.push(value);
                }
                Op::Pop => match model.pop() {
                    Some(value) => {
                        stack.pop(Some(&mut out)).unwrap();
                        prop_assert_eq!(u32::from_ne_bytes(out), value);
                    }
                    None => prop_assert!(stack.pop(Some(&mut out)).is_err()),
                },
                Op::Discard => {
                    prop_assert_eq!(stack.discard().is_ok(), model.pop().is_some());
                }
                Op::PopN(n) => {
                    let mut dst = vec![0u8; n * 4];
                    if n <= model.len() {
                        stack.pop_n_reverse(&mut dst, n).unwrap();
                        let popped: Vec<u32> = dst
                            .chunks_exact(4)
                            .map(|bytes| u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
                            .collect();
                        let expected = model.split_off(model.len() - n);
                        prop_assert_eq!(popped, expected);
                    } else {
                        prop_assert!(stack.pop_n_reverse(&mut dst, n).is_err());
                    }
                }
                Op::Clear => {
                    stack.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(stack.count(), model.len());
            prop_assert_eq!(stack.is_empty(), model.is_empty());
            prop_assert_eq!(stack.chunk_count(), chunks_needed(model.len(), per_chunk));
            if let Some(top) = model.last() {
                let expected = top.to_ne_bytes();
                prop_assert_eq!(stack.peek().unwrap(), &expected[..]);
            }
        }
    }
}
