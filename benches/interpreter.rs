use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use novo_consensus::cancellation::CancellationToken;
use novo_consensus::chainparams::{ChainParams, Network};
use novo_consensus::interpreter::{lshift, rshift, verify_script, BaseSignatureChecker};
use novo_consensus::limits::GlobalConfig;
use novo_consensus::opcodes::*;
use novo_consensus::script::{Instructions, ScriptBuilder};
use novo_consensus::script_flags::STANDARD_SCRIPT_VERIFY_FLAGS;

fn benchmark_shifts(c: &mut Criterion) {
    let mut group = c.benchmark_group("shift");
    for size in [1_000usize, 100_000, 1_000_000] {
        let data = vec![0u8; size];
        group.bench_with_input(BenchmarkId::new("lshift_huge", size), &data, |b, data| {
            b.iter(|| black_box(lshift(black_box(data), u64::MAX)))
        });
        group.bench_with_input(BenchmarkId::new("rshift_huge", size), &data, |b, data| {
            b.iter(|| black_box(rshift(black_box(data), u64::MAX)))
        });
        group.bench_with_input(BenchmarkId::new("lshift_3", size), &data, |b, data| {
            b.iter(|| black_box(lshift(black_box(data), 3)))
        });
    }
    group.finish();
}

fn arithmetic_script(rounds: usize) -> Vec<u8> {
    let mut builder = ScriptBuilder::new().push_int(1);
    for _ in 0..rounds {
        builder = builder
            .push_opcode(OP_DUP)
            .push_opcode(OP_ADD)
            .push_int(3)
            .push_opcode(OP_SUB);
    }
    builder
        .push_opcode(OP_DROP)
        .push_opcode(OP_1)
        .into_bytes()
}

fn benchmark_parse(c: &mut Criterion) {
    let script = arithmetic_script(1_000);
    c.bench_function("parse_arithmetic_1000", |b| {
        b.iter(|| black_box(Instructions::new(black_box(&script)).count()))
    });
}

fn benchmark_eval(c: &mut Criterion) {
    let limits = GlobalConfig::for_network(ChainParams::get(Network::Regtest));
    let token = CancellationToken::new();
    let script = arithmetic_script(1_000);

    c.bench_function("verify_arithmetic_1000", |b| {
        b.iter(|| {
            verify_script(
                &limits,
                true,
                &token,
                &[],
                black_box(&script),
                STANDARD_SCRIPT_VERIFY_FLAGS,
                &BaseSignatureChecker,
            )
        })
    });
}

criterion_group!(benches, benchmark_shifts, benchmark_parse, benchmark_eval);
criterion_main!(benches);
