#![no_main]

use libfuzzer_sys::fuzz_target;
use std::rc::Rc;

use internrs::mem::{self, TrackingResource};
use internrs::Blob;

fuzz_target!(|data: Vec<u8>| {
    let resource = Rc::new(TrackingResource::new());
    mem::set_thread_resource(resource.clone());

    {
        let blob = Blob::new(&data).unwrap();

        // Verify: header fields match the input
        assert_eq!(blob.size() as usize, data.len());
        assert_eq!(blob.ref_count(), 1);

        // Verify: the view reproduces the content exactly
        assert_eq!(blob.view(), data.as_slice());

        // Verify: data() is the same memory, sentinel-terminated
        assert_eq!(blob.view().as_ptr(), blob.data());
        let sentinel = unsafe { blob.data().add(data.len()).read() };
        assert_eq!(sentinel, 0);

        // Verify: the allocation is exactly header + content + sentinel
        assert_eq!(resource.used(), 8 + data.len() + 1);

        // Verify: balanced refcount mutation restores the count
        let bumps = (data.len() % 16) as u32;
        for _ in 0..bumps {
            blob.incr_ref_count();
        }
        assert_eq!(blob.ref_count(), 1 + bumps);
        for _ in 0..bumps {
            blob.decr_ref_count();
        }
        assert_eq!(blob.ref_count(), 1);

        // Verify: equal content compares equal across allocations
        let twin = Blob::new(&data).unwrap();
        assert_ne!(twin.data(), blob.data());
        assert_eq!(twin, blob);
    }

    // Verify: destruction returns every allocated byte
    assert_eq!(resource.used(), 0);
});
