use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use veil_program::{transition, Call, ExecutionContext, Token};
use veil_types::{Address, Field};

fn caller() -> Address {
    Address::from_bytes(&[7u8; 32])
}

fn minted(balance: u64) -> Token {
    let ctx = ExecutionContext::new(caller(), [1u8; 32]);
    transition::mint(&ctx, balance).unwrap().outputs.remove(0)
}

fn bench_transitions(c: &mut Criterion) {
    let mut group = c.benchmark_group("transition");
    let ctx = ExecutionContext::new(caller(), [2u8; 32]);
    let receiver = Address::from_bytes(&[9u8; 32]);
    let input = minted(1_000_000);

    let calls = [
        Call::Mint { amount: 100 },
        Call::TransferPrivate {
            receiver: receiver.clone(),
            amount: 30,
            input: input.clone(),
        },
        Call::TransferPrivateToPublic {
            receiver: receiver.clone(),
            amount: 30,
            input: input.clone(),
        },
        Call::Join {
            input: input.clone(),
            input2: minted(5),
        },
        Call::TransferPublic {
            receiver,
            amount: 30,
        },
        Call::Main {
            a: Field::from_u64(13),
            b: Field::from_u64(5),
        },
    ];

    for call in calls {
        let name = call.function().name();
        group.bench_with_input(BenchmarkId::new("evaluate", name), &call, |b, call| {
            b.iter(|| black_box(call.clone().evaluate(black_box(&ctx))));
        });
    }

    group.finish();
}

fn bench_commitment(c: &mut Criterion) {
    let token = minted(42);
    c.bench_function("token_commitment", |b| {
        b.iter(|| black_box(black_box(&token).commitment()));
    });
}

criterion_group!(benches, bench_transitions, bench_commitment);
criterion_main!(benches);
