use criterion::{black_box, criterion_group, criterion_main, Criterion};
use novo_consensus::chainparams::{ChainParams, Network};
use novo_consensus::pow::{
    calculate_asert, compress_target, expand_target, get_next_work_required, BlockIndexView,
};

fn benchmark_calculate_asert(c: &mut Criterion) {
    let params = &ChainParams::get(Network::Main).consensus;
    let ref_target = expand_target(0x1d00_ffff).unwrap();

    c.bench_function("calculate_asert", |b| {
        b.iter(|| {
            calculate_asert(
                black_box(&ref_target),
                params.target_spacing,
                black_box(1_234_567),
                black_box(8_000),
                &params.pow_limit,
                params.unsteady_asert_half_life,
            )
        })
    });
}

fn benchmark_next_work(c: &mut Criterion) {
    let params = &ChainParams::get(Network::Main).consensus;
    let prev = BlockIndexView {
        height: 50_000,
        time: 1_646_000_000,
        bits: 0x1c0f_ffff,
    };

    c.bench_function("get_next_work_required", |b| {
        b.iter(|| get_next_work_required(Some(black_box(&prev)), prev.time + 150, params))
    });
}

fn benchmark_compact(c: &mut Criterion) {
    c.bench_function("compact_round_trip", |b| {
        b.iter(|| {
            let target = expand_target(black_box(0x1b04_864c)).unwrap();
            black_box(compress_target(&target))
        })
    });
}

criterion_group!(
    benches,
    benchmark_calculate_asert,
    benchmark_next_work,
    benchmark_compact
);
criterion_main!(benches);
