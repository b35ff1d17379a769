use std::io::Cursor;

use binfile::binary::{ArrayBackend, StreamBackend};
use binfile::{Accessor, ReadAccessor, WriteAccessor};
use proptest::prelude::*;

/// A buffer plus a valid outer slice `(a, b)` and inner slice `(c, d)` with `c + d <= b`
fn nested_slices() -> impl Strategy<Value = (Vec<u8>, u64, u64, u64, u64)> {
    prop::collection::vec(any::<u8>(), 1..256).prop_flat_map(|data| {
        let len = data.len() as u64;
        (Just(data), 0..=len).prop_flat_map(move |(data, a)| {
            (Just(data), Just(a), 0..=len - a).prop_flat_map(|(data, a, b)| {
                (Just(data), Just(a), Just(b), 0..=b).prop_flat_map(|(data, a, b, c)| {
                    (Just(data), Just(a), Just(b), Just(c), 0..=b - c)
                })
            })
        })
    })
}

/// A buffer plus a write offset and payload that fit inside it
fn write_within_bounds() -> impl Strategy<Value = (usize, u64, Vec<u8>)> {
    (1usize..256).prop_flat_map(|len| {
        (0..=len as u64).prop_flat_map(move |offset| {
            let room = len - offset as usize;
            (Just(len), Just(offset), prop::collection::vec(any::<u8>(), 0..=room))
        })
    })
}

proptest! {
    #[test]
    fn nested_slice_reads_like_direct_slice((data, a, b, c, d) in nested_slices()) {
        let backend = ArrayBackend::new(data);

        let outer = backend.slice(a, b).unwrap();
        let nested = outer.slice(c, d).unwrap();
        let direct = backend.slice(a + c, d).unwrap();

        prop_assert_eq!(nested.offset(), direct.offset());
        prop_assert_eq!(nested.read_all().unwrap(), direct.read_all().unwrap());
    }

    #[test]
    fn nested_mutable_slice_writes_like_direct_slice((data, a, b, c, d) in nested_slices()) {
        let payload = vec![0xA5; d as usize];

        let mut nested_backend = ArrayBackend::new(data.clone());
        {
            let mut outer = nested_backend.slice_mut(a, b).unwrap();
            let mut inner = outer.slice_mut(c, d).unwrap();
            inner.write(0, &payload).unwrap();
        }

        let mut direct_backend = ArrayBackend::new(data);
        direct_backend.write(a + c, &payload).unwrap();

        prop_assert_eq!(nested_backend.into_inner(), direct_backend.into_inner());
    }

    #[test]
    fn array_write_then_read_round_trips((len, offset, payload) in write_within_bounds()) {
        let mut backend = ArrayBackend::new(vec![0; len]);

        backend.write(offset, &payload).unwrap();
        prop_assert_eq!(backend.read_array(offset, payload.len()).unwrap(), payload);
    }

    #[test]
    fn stream_write_then_read_round_trips((len, offset, payload) in write_within_bounds()) {
        let mut backend = StreamBackend::new(Cursor::new(vec![0; len])).unwrap();

        backend.write(offset, &payload).unwrap();
        prop_assert_eq!(backend.read_array(offset, payload.len()).unwrap(), payload);
    }

    #[test]
    fn view_reads_never_exceed_view_length(
        data in prop::collection::vec(any::<u8>(), 16..64),
        view_len in 0u64..16,
        requested in 0usize..64,
    ) {
        let backend = ArrayBackend::new(data.clone());
        let view = backend.slice(0, view_len).unwrap();

        let bytes = view.read_array(0, requested).unwrap();
        prop_assert_eq!(bytes.len(), requested.min(view_len as usize));
        prop_assert_eq!(&bytes[..], &data[..bytes.len()]);
    }
}
