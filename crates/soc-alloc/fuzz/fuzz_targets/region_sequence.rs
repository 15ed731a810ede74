#![no_main]

use libfuzzer_sys::fuzz_target;
use soc_alloc::{check_regions, BusAllocator, BusConfig, CsrAllocator, CsrConfig, Region};

fuzz_target!(|data: &[u8]| {
    let Ok(mut bus) =
        BusAllocator::<(), ()>::new(&BusConfig::default(), std::iter::empty::<(&str, Region)>())
    else {
        return;
    };
    let _ = bus.add_io_region("io", Region::at(0x8000_0000, 0x8000_0000));

    for (index, chunk) in data.chunks_exact(9).enumerate() {
        let origin = u64::from(u32::from_le_bytes([chunk[1], chunk[2], chunk[3], chunk[4]]));
        let size = u64::from(u32::from_le_bytes([chunk[5], chunk[6], chunk[7], chunk[8]]));
        let region = match chunk[0] % 4 {
            0 => Region::at(origin, size),
            1 => Region::sized(size),
            2 => Region::sized(size).uncached(),
            _ => Region::linker(origin, size),
        };
        let name = format!("r{index}");
        if let Ok(stored) = bus.add_region(&name, region) {
            let _ = stored.decoder();
        }
    }

    let physical = bus.regions().iter().filter(|(_, region)| !region.is_linker());
    assert_eq!(check_regions(physical), None);

    if let Ok(mut csr) = CsrAllocator::new(CsrConfig::default(), std::iter::empty::<(&str, u32)>()) {
        for (index, byte) in data.iter().enumerate() {
            let _ = csr.add(&format!("c{index}"), Some(i64::from(*byte) - 8));
        }
    }
});
