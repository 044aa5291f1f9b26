// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Allocation engine benchmarks.

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use promopay_rs::{Engine, InstrumentId, LOYALTY_ID, Order, OrderId, PaymentInstrument};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const CARD_COUNT: usize = 8;

/// Builds an engine with `n` orders spread over a handful of cards, sized
/// so the optimized phases always succeed.
fn build_engine(n: usize) -> Engine {
    let orders: Vec<Order> = (0..n)
        .map(|i| {
            let amount = Decimal::from(50 + (i % 200) as i64);
            let promotions = vec![InstrumentId(format!("CARD{}", i % CARD_COUNT))];
            Order::new(OrderId(format!("ORDER{i}")), amount, promotions)
        })
        .collect();

    let per_card = Decimal::from(250 * n as i64);
    let mut instruments = vec![PaymentInstrument::new(
        InstrumentId::from(LOYALTY_ID),
        dec!(15),
        Decimal::from(100 * n as i64),
    )];
    instruments.extend((0..CARD_COUNT).map(|i| {
        PaymentInstrument::new(
            InstrumentId(format!("CARD{i}")),
            Decimal::from((i % 10) as i64 + 1),
            per_card,
        )
    }));

    Engine::new(orders, instruments).expect("valid configuration")
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_run");

    for &n in &[10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("orders_{n}"), |b| {
            b.iter_batched(
                || build_engine(n),
                |mut engine| {
                    engine.run().expect("allocation succeeds");
                    engine
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_run);
criterion_main!(benches);
