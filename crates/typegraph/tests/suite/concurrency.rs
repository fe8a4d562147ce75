use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;

use super::{factory, names, ty};

#[test]
fn concurrent_builds_share_one_node_and_one_lattice() {
    let factory = factory();

    let built = thread::scope(|scope| {
        let handles = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let list = ty(&factory, "java.util.ArrayList");
                    let storage = list.lattice(&factory).storage() as *const _ as usize;
                    (list, storage)
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    let (first, storage) = &built[0];
    for (list, other) in &built[1..] {
        assert!(list.ptr_eq(first));
        assert_eq!(other, storage);
    }
    let stats = factory.stats();
    assert_eq!(stats.lattices_computed, 1);
    assert_eq!(
        stats.raw_types_built,
        stats.cache_races_lost + stats.interned_classes as u64
    );
}

#[test]
fn concurrent_member_lookups_agree() {
    let factory = Arc::new(factory());

    let handles = (0..4)
        .map(|_| {
            let factory = factory.clone();
            thread::spawn(move || {
                let string_box = ty(&factory, "test.StringBox");
                let get = factory.method(&string_box, "get", &[]).unwrap();
                get.to_string()
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "public String Box.get()");
    }
    assert_eq!(
        names(ty(&factory, "test.StringBox").supertypes(&factory)),
        vec!["StringBox", "Box<T=String>", "Object"]
    );
}
