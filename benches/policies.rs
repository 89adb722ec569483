use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use memory_policy_sim::{
    ContiguousAllocator, PageId, PagingConfig, PagingSimulator, PlacementPolicy,
    ReplacementPolicy,
};

/// Deterministic pseudo-random stream for request sizes and page numbers
fn lcg(seed: u64) -> impl FnMut() -> u64 {
    let mut state = seed;
    move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state >> 33
    }
}

fn bench_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement");

    for policy in PlacementPolicy::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(policy),
            &policy,
            |b, &policy| {
                b.iter(|| {
                    let mut next = lcg(42);
                    let mut allocator = ContiguousAllocator::new(64 * 1024).unwrap();
                    for _ in 0..2_000 {
                        if next() % 3 == 0 {
                            let index = next() as usize % allocator.blocks().len();
                            let _ = allocator.free(index);
                        } else {
                            let size = 1 + next() as usize % 512;
                            let _ = allocator.allocate(size, policy);
                        }
                    }
                    black_box(allocator.external_fragmentation())
                })
            },
        );
    }

    group.finish();
}

fn bench_replacement(c: &mut Criterion) {
    let mut group = c.benchmark_group("replacement");

    let mut next = lcg(7);
    let trace: Vec<PageId> = (0..5_000).map(|_| (next() % 64) as PageId).collect();

    for policy in ReplacementPolicy::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(policy),
            &policy,
            |b, &policy| {
                let config = PagingConfig::with_frames(16, policy);
                b.iter(|| {
                    let mut sim = PagingSimulator::new(&config, trace.clone()).unwrap();
                    sim.run_to_end();
                    black_box(sim.page_faults())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_placement, bench_replacement);
criterion_main!(benches);
