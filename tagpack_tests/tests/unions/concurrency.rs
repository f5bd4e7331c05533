use super::models::{self, Drawing, Shape};
use anyhow::{anyhow, Result};
use itertools::Itertools;
use std::sync::Barrier;
use std::thread;
use tagpack_union::Resolver;

const THREADS: usize = 16;

/// `f` runs on every thread at once, each thread released by the same barrier.
fn race<T, F>(f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn() -> Result<T> + Sync,
{
    let barrier = Barrier::new(THREADS);
    thread::scope(|s| {
        let handles = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    f()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| anyhow!("Thread panicked"))?)
            .collect()
    })
}

pub fn first_resolve_builds_once() -> Result<()> {
    let resolver = Resolver::builder().union::<Shape>().build();
    let shape = Shape::Text {
        body: String::from("race"),
        size: 12,
        bold: false,
    };

    let outputs = race(|| resolver.serialize(&shape))?;
    assert!(outputs.iter().all_equal());
    assert_eq!(Some(&resolver.serialize(&shape)?), outputs.first());
    assert_eq!(1, resolver.unions().builds());
    Ok(())
}

pub fn nested_types_each_build_once() -> Result<()> {
    for (mode, resolver) in models::resolvers() {
        let drawings = models::sample_drawings();

        let outputs = race(|| {
            drawings
                .iter()
                .map(|drawing| {
                    let buf = resolver.serialize(drawing)?;
                    let back = resolver.deserialize::<Drawing>(&buf)?;
                    Ok((buf, back))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        assert!(outputs.iter().all_equal(), "{mode:?}");
        for (drawing, (_, back)) in drawings.iter().zip(outputs[0].iter()) {
            assert_eq!(drawing, back, "{mode:?}");
        }
        // Drawing, and Shape. `Option<Shape>` shares Shape's build.
        assert_eq!(2, resolver.unions().builds(), "{mode:?}");
    }
    Ok(())
}
