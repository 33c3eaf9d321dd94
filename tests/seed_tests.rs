use std::sync::Arc;

use async_trait::async_trait;
use dpscalc::data::{
    CalculationParameters, Item, ItemId, ItemLookup, ItemResolutionError, Loadout, Slot,
    StaticItemLookup,
};
use dpscalc::seed::{Base64Codec, DecodeError, SeedCodec, TextCodec};
use serde_json::json;

fn catalog() -> Vec<Item> {
    vec![
        Item::new(4151).with_name("Abyssal whip"),
        Item::new(10828).with_name("Helm of neitiznot"),
        Item::new(6737).with_name("Berserker ring"),
        Item::new(11802).with_name("Armadyl godsword"),
    ]
}

fn codec() -> SeedCodec {
    SeedCodec::new(
        Arc::new(Base64Codec::standard()),
        Arc::new(StaticItemLookup::new(catalog())),
    )
}

fn raw_seed(value: serde_json::Value) -> String {
    Base64Codec::standard().encode(value.to_string().as_bytes())
}

fn occupied_ids(loadout: &Loadout) -> Vec<(Slot, ItemId)> {
    loadout.items().map(|(slot, item)| (slot, item.id)).collect()
}

/// Fails for one id, serves the rest from the catalog.
struct FlakyLookup {
    broken: ItemId,
    inner: StaticItemLookup,
}

#[async_trait]
impl ItemLookup for FlakyLookup {
    async fn item_by_id(&self, id: ItemId) -> Result<Item, ItemResolutionError> {
        if id == self.broken {
            return Err(ItemResolutionError::Source {
                id,
                message: "timed out".to_string(),
            });
        }
        self.inner.item_by_id(id).await
    }
}

#[tokio::test]
async fn round_trip_preserves_parameters_and_ids() {
    let mut params = CalculationParameters::new();
    params.set("combat_style", "melee");
    params.set("attack_level", 99);
    params.set("prayer_strength_multiplier", 1.23);
    params.set("on_slayer_task", true);
    params.set("potion", "super combat");
    let loadout = Loadout::empty()
        .with(Slot::Weapon, Item::new(4151))
        .with(Slot::Head, Item::new(10828))
        .with(Slot::Spec, Item::new(11802));

    let codec = codec();
    let seed = codec.encode(&params, &loadout);
    assert!(seed.is_ascii());

    let decoded = codec.decode(&seed).await.unwrap();
    assert_eq!(decoded.parameters, params);
    assert_eq!(occupied_ids(&decoded.loadout), occupied_ids(&loadout));
}

#[tokio::test]
async fn encoding_is_deterministic() {
    let mut a = CalculationParameters::new();
    a.set("b", 1);
    a.set("a", 2);
    let mut b = CalculationParameters::new();
    b.set("a", 2);
    b.set("b", 1);
    assert_eq!(codec().encode(&a, &Loadout::empty()), codec().encode(&b, &Loadout::empty()));
}

#[tokio::test]
async fn empty_loadout_round_trips_to_empty() {
    let seed = codec().encode(&CalculationParameters::new(), &Loadout::empty());
    let decoded = codec().decode(&seed).await.unwrap();
    assert!(decoded.loadout.is_empty());
    assert_eq!(decoded.loadout.slots().count(), Slot::ALL.len());
}

#[tokio::test]
async fn failed_slot_degrades_to_null() {
    let codec = SeedCodec::new(
        Arc::new(Base64Codec::standard()),
        Arc::new(FlakyLookup {
            broken: 10828,
            inner: StaticItemLookup::new(catalog()),
        }),
    );
    let seed = raw_seed(json!({
        "equipment": {"weapon": 4151, "head": 10828, "ring": 6737, "body": null}
    }));

    let decoded = codec.decode(&seed).await.unwrap();
    assert!(decoded.loadout.get(Slot::Head).is_none());
    assert_eq!(decoded.loadout.get(Slot::Weapon).map(|i| i.id), Some(4151));
    assert_eq!(decoded.loadout.get(Slot::Ring).map(|i| i.id), Some(6737));
    assert!(decoded.loadout.get(Slot::Body).is_none());
}

#[tokio::test]
async fn legacy_seed_merges_armor_and_weapon() {
    let seed = raw_seed(json!({
        "equipped_armor": {"head": 10828, "ring": 6737},
        "equipped_weapon": {"weapon": 4151},
        "strength_level": 99
    }));
    let decoded = codec().decode(&seed).await.unwrap();
    assert_eq!(
        occupied_ids(&decoded.loadout),
        vec![(Slot::Head, 10828), (Slot::Weapon, 4151), (Slot::Ring, 6737)]
    );
    assert_eq!(decoded.parameters.number("strength_level"), Some(99.0));
    assert!(!decoded.parameters.contains("equipped_armor"));
    assert!(!decoded.parameters.contains("equipped_weapon"));
}

#[tokio::test]
async fn seed_without_equipment_yields_empty_loadout() {
    let seed = raw_seed(json!({"attack_level": 75}));
    let decoded = codec().decode(&seed).await.unwrap();
    assert!(decoded.loadout.is_empty());
    assert_eq!(decoded.parameters.number("attack_level"), Some(75.0));
}

#[tokio::test]
async fn untrusted_garbage_is_a_decode_error() {
    let codec = codec();
    for seed in ["", "not base64!", "aGVsbG8="] {
        let err = codec.decode(seed).await.unwrap_err();
        assert!(!err.to_string().is_empty());
    }
    assert!(matches!(codec.decode("aGVsbG8=").await, Err(DecodeError::Json(_))));
}

#[tokio::test]
async fn url_safe_alphabet_round_trips() {
    let codec = SeedCodec::new(
        Arc::new(Base64Codec::url_safe()),
        Arc::new(StaticItemLookup::new(catalog())),
    );
    let mut params = CalculationParameters::new();
    params.set("note", "??>>~~");
    let seed = codec.encode(&params, &Loadout::empty());
    assert!(!seed.contains('+') && !seed.contains('/'));
    assert_eq!(codec.decode(&seed).await.unwrap().parameters, params);
}
