use memolito::{
    clear_cache, memoized, populate_cache, CacheOwner, CallArgs, InstanceCache, MemberDescriptor,
    MemoizedMethod, MemoizedProperty, SweepError,
};
use std::sync::atomic::{AtomicUsize, Ordering};

struct Device {
    serial_lookups: AtomicUsize,
    cache: InstanceCache,
}

static SERIAL: MemoizedProperty<String> = MemoizedProperty::new("Device::serial");
static FIRMWARE: MemoizedProperty<u32> = MemoizedProperty::new("Device::firmware");
static REGISTER: MemoizedMethod = MemoizedMethod::new("Device::register");

impl Device {
    fn new() -> Self {
        Self {
            serial_lookups: AtomicUsize::new(0),
            cache: InstanceCache::new(),
        }
    }

    fn serial(&self) -> String {
        SERIAL.get(&self.cache, || {
            self.serial_lookups.fetch_add(1, Ordering::SeqCst);
            "SN-4711".to_string()
        })
    }

    fn firmware(&self) -> u32 {
        FIRMWARE.get(&self.cache, || 3)
    }

    fn register(&self, address: u16) -> u32 {
        let args = CallArgs::new().positional(&address);
        REGISTER.get_or_compute(&self.cache, &args, || u32::from(address) * 2)
    }

    #[memoized(slot = "cache")]
    fn model(&self) -> String {
        "memolito-9000".to_string()
    }
}

impl CacheOwner for Device {
    const MEMBERS: &'static [MemberDescriptor<Self>] = &[
        MemberDescriptor {
            name: "Device::serial",
            warm: |device| {
                device.serial();
                Ok(())
            },
        },
        MemberDescriptor {
            name: "Device::firmware",
            warm: |device| {
                device.firmware();
                Ok(())
            },
        },
        MemberDescriptor {
            name: "Device::model",
            warm: |device| {
                device.model();
                Ok(())
            },
        },
        // Takes a register address; nothing sensible to warm it with.
        MemberDescriptor {
            name: "Device::register",
            warm: |_| Err(SweepError::RequiresArguments { member: "Device::register" }),
        },
    ];

    fn instance_cache(&self) -> &InstanceCache {
        &self.cache
    }
}

#[test]
fn test_sweep_warms_everything_warmable() {
    let device = Device::new();
    assert!(!device.cache.is_initialized());

    populate_cache(&device, &[]).unwrap();

    // Three zero-argument members warmed; the argument-taking one skipped.
    assert_eq!(device.cache.len(), 3);
    assert_eq!(device.serial_lookups.load(Ordering::SeqCst), 1);

    // Warmed members are served from cache afterwards.
    assert_eq!(device.serial(), "SN-4711");
    assert_eq!(device.serial_lookups.load(Ordering::SeqCst), 1);
}

#[test]
fn test_sweep_skip_list() {
    let device = Device::new();
    populate_cache(&device, &["Device::serial", "Device::model"]).unwrap();

    assert_eq!(device.serial_lookups.load(Ordering::SeqCst), 0);
    assert!(device.cache.contains("Device::firmware"));
    assert!(!device.cache.contains("Device::serial"));
}

#[test]
fn test_clear_cache_resets_the_owner() {
    let device = Device::new();
    populate_cache(&device, &[]).unwrap();
    device.register(0x10);
    assert_eq!(device.cache.len(), 4);

    clear_cache(&device);
    assert!(device.cache.is_empty());

    // Cleared members recompute on next access.
    assert_eq!(device.serial(), "SN-4711");
    assert_eq!(device.serial_lookups.load(Ordering::SeqCst), 2);

    // Clearing an owner that never cached anything stays quiet.
    clear_cache(&Device::new());
}
