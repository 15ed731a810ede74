//! Layout fingerprint generator used to compare allocation results across hosts.

use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use soc_alloc::{
    BusAllocator, BusConfig, CsrAllocator, CsrConfig, IrqAllocator, IrqConfig, Region,
};
use thiserror as _;

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let mut bus: BusAllocator = BusAllocator::new(
        &BusConfig::default(),
        [
            ("rom", Region::at(0x0000_0000, 0x8000)),
            ("sram", Region::at(0x1000_0000, 0x2000)),
            ("main_ram", Region::at(0x4000_0000, 0x0100_0000)),
        ],
    )
    .expect("reserved regions should register");
    bus.add_io_region("io0", Region::at(0x8000_0000, 0x8000_0000))
        .expect("io window should register");
    bus.add_region("csr", Region::sized(0x1_0000).uncached())
        .expect("csr window should allocate");
    bus.add_region("spiflash", Region::sized(0x0100_0000))
        .expect("spiflash should allocate");
    bus.add_region("text", Region::linker(0x0000_0000, 0x4000))
        .expect("linker region should register");

    let mut csr = CsrAllocator::new(CsrConfig::default(), [("ctrl", 0), ("uart", 2)])
        .expect("reserved csrs should register");
    for name in ["timer0", "leds", "identifier_mem", "spiflash"] {
        csr.add(name, None).expect("csr should allocate");
    }

    let mut irq = IrqAllocator::new(IrqConfig::default(), [("uart", 1)])
        .expect("reserved irqs should register");
    for name in ["timer0", "ethmac"] {
        irq.add(name, None).expect("irq should allocate");
    }

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for (name, region) in bus.regions().iter() {
        hash_bytes(&mut hash, name.as_bytes());
        hash_bytes(&mut hash, &region.origin().unwrap_or_default().to_le_bytes());
        hash_bytes(&mut hash, &region.size().unwrap_or_default().to_le_bytes());
        hash_bytes(&mut hash, &[u8::from(region.is_cached()), u8::from(region.is_linker())]);
    }
    for (name, location) in csr.locations().iter().chain(irq.lines().iter()) {
        hash_bytes(&mut hash, name.as_bytes());
        hash_bytes(&mut hash, &location.to_le_bytes());
    }

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
