#![no_main]

use libfuzzer_sys::fuzz_target;
use std::rc::Rc;

use internrs::mem::{self, TrackingResource};
use internrs::{BlobHandle, Interner};

// Small key universe so the op stream revisits contents and exercises the
// hit path as often as the miss path.
const KEYS: [&[u8]; 8] = [
    b"",
    b"a",
    b"key",
    b"key2",
    b"a longer interned value",
    b"\x00\x01\x02",
    b"1234567",
    b"zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz",
];

fuzz_target!(|data: Vec<u8>| {
    let resource = Rc::new(TrackingResource::new());
    mem::set_thread_resource(resource.clone());

    {
        let mut interner = Interner::new();
        // Shadow model: outstanding handles per key index
        let mut outstanding: [Vec<BlobHandle>; 8] = Default::default();

        for byte in &data {
            let key_index = (byte % 8) as usize;
            let key = KEYS[key_index];

            if byte & 0x80 == 0 {
                // Intern: a hit must return the existing pointer, a miss a
                // fresh refcount-1 blob.
                let handle = interner.intern(key).unwrap();
                if let Some(existing) = outstanding[key_index].first() {
                    assert_eq!(handle.as_ptr(), existing.as_ptr());
                } else {
                    assert_eq!(unsafe { handle.ref_count() }, 1);
                }
                outstanding[key_index].push(handle);
            } else if let Some(handle) = outstanding[key_index].pop() {
                // Release one ownership; retirement only at the last owner
                let was_last = outstanding[key_index].is_empty();
                unsafe { interner.release(handle) };
                assert_eq!(interner.contains(key), !was_last);
            }

            // Verify: the refcount always equals the outstanding owners,
            // and pool membership tracks owners > 0
            for (i, handles) in outstanding.iter().enumerate() {
                match handles.first() {
                    Some(handle) => {
                        assert!(interner.contains(KEYS[i]));
                        assert_eq!(unsafe { handle.ref_count() } as usize, handles.len());
                    }
                    None => assert!(!interner.contains(KEYS[i])),
                }
            }
        }

        // Verify: one pool entry per distinct outstanding content
        let live = outstanding.iter().filter(|h| !h.is_empty()).count();
        assert_eq!(interner.len(), live);

        // Drain the model; the interner must end empty
        for handles in &mut outstanding {
            for handle in handles.drain(..) {
                unsafe { interner.release(handle) };
            }
        }
        assert!(interner.is_empty());
    }

    // Verify: no allocation survives a fully released interner
    assert_eq!(resource.used(), 0);
});
