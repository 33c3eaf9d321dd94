//! Aggregation and seed throughput.
//!
//! Run with: `cargo bench`

use std::collections::BTreeMap;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dpscalc::calc::aggregate;
use dpscalc::data::{
    CalculationParameters, CombatStats, CombatStyle, Item, Loadout, MagicDamage, OtherBonuses,
    Slot, StaticItemLookup,
};
use dpscalc::seed::{Base64Codec, SeedCodec};

fn full_loadout() -> Loadout {
    Slot::ALL
        .into_iter()
        .enumerate()
        .fold(Loadout::empty(), |loadout, (index, slot)| {
            let mut attack = BTreeMap::new();
            for key in ["stab", "slash", "crush", "magic", "ranged"] {
                attack.insert(key.to_string(), index as f64);
            }
            let item = Item::new(1000 + index as u32).with_stats(CombatStats {
                attack_bonuses: attack,
                other_bonuses: OtherBonuses {
                    strength: Some(index as f64),
                    ranged_strength: Some(1.0),
                    magic_damage: Some(MagicDamage::parse("+2%")),
                    prayer: None,
                },
                ..CombatStats::default()
            });
            loadout.with(slot, item)
        })
}

fn bench_aggregate(c: &mut Criterion) {
    let loadout = full_loadout();
    c.bench_function("aggregate_full_loadout_magic", |b| {
        b.iter(|| aggregate(black_box(&loadout), "slash", CombatStyle::Magic))
    });
}

fn bench_seed(c: &mut Criterion) {
    let loadout = full_loadout();
    let items: Vec<Item> = loadout.items().map(|(_, item)| item.clone()).collect();
    let codec = SeedCodec::new(
        Arc::new(Base64Codec::standard()),
        Arc::new(StaticItemLookup::new(items)),
    );
    let mut params = CalculationParameters::new();
    params.set("attack_level", 99);
    params.set("combat_style", "magic");
    let seed = codec.encode(&params, &loadout);
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    c.bench_function("seed_encode", |b| {
        b.iter(|| codec.encode(black_box(&params), black_box(&loadout)))
    });
    c.bench_function("seed_decode", |b| {
        b.to_async(&runtime)
            .iter(|| async { codec.decode(black_box(&seed)).await })
    });
}

criterion_group!(benches, bench_aggregate, bench_seed);
criterion_main!(benches);
