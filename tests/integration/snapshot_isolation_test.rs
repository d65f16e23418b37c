// Views built while the poller keeps publishing must come from one snapshot.

use poolwatch::core::pool::{build_pool_view, DeviceState, PoolState, UsageMap, UsageStat, ViewContext};
use poolwatch::core::severity::Classifier;
use poolwatch::core::state_store::StateStore;
use std::thread;

fn generation(n: u64) -> (Vec<PoolState>, UsageMap) {
    let tag = n.to_string();
    let width = (n % 4) as usize + 1;

    let mut devices = vec![DeviceState {
        name: "tank".to_string(),
        state: tag.clone(),
        sub_devices: (1..=width).collect(),
        ..Default::default()
    }];
    devices.extend((1..=width).map(|i| DeviceState {
        name: format!("sd{}", i),
        state: tag.clone(),
        parent: Some(0),
        ..Default::default()
    }));

    let pool = PoolState {
        name: "tank".to_string(),
        state: tag.clone(),
        status: tag,
        devices,
        ..Default::default()
    };

    let mut usage = UsageMap::new();
    usage.insert("tank".to_string(), UsageStat::new(n, n));
    (vec![pool], usage)
}

#[test]
fn test_views_never_mix_generations() {
    let store = StateStore::new();
    let (pools, usage) = generation(0);
    store.publish(pools, usage);

    let writer = {
        let store = store.clone();
        thread::spawn(move || {
            for n in 1..=2000 {
                let (pools, usage) = generation(n);
                store.publish(pools, usage);
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                let classifier = Classifier::default();
                let ctx = ViewContext {
                    classifier: &classifier,
                    root: "",
                    locate: None,
                };
                for _ in 0..500 {
                    let snapshot = store.snapshot();
                    let view = build_pool_view(&snapshot.pools[0], &snapshot.usage, &ctx);

                    let n: u64 = view.state.parse().unwrap();
                    assert_eq!(view.status, view.state);
                    assert_eq!(view.avail, n as i64);
                    assert_eq!(view.used, n as i64);
                    assert_eq!(view.devices.len(), (n % 4) as usize + 2);
                    assert!(view.devices.iter().all(|d| d.state == view.state));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.snapshot().generation, 2001);
}
