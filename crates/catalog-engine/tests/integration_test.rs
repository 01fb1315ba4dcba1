use catalog_engine::{
    raw_params, CatalogEngine, CatalogStore, FieldValue, Item, RawParams, ResourceConfig,
    ResourceRegistry, StoreClient,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// --- Test Resource ---

fn indoor_units() -> ResourceConfig {
    ResourceConfig::new(
        "indoor-units",
        &["Merk", "Model"],
        &["Merk", "Energieklasse", "Geschikt voor"],
        &["Prijs", "Koelvermogen (kW)"],
    )
    .with_multiselect("Geschikt voor")
    .with_range_step("Prijs", 50.0)
}

fn unit(id: i64, merk: &str, model: &str, klasse: &str, rooms: &[&str], prijs: f64, kw: f64) -> Item {
    Item::new()
        .with("id", id)
        .with("Merk", merk)
        .with("Model", model)
        .with("Energieklasse", klasse)
        .with(
            "Geschikt voor",
            rooms.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
        )
        .with("Prijs", prijs)
        .with("Koelvermogen (kW)", kw)
}

fn catalog() -> Vec<Item> {
    vec![
        unit(1, "Daikin", "Perfera", "A+++", &["woonkamer", "slaapkamer"], 1299.0, 2.5),
        unit(2, "Daikin", "Emura", "A+++", &["woonkamer"], 1899.0, 3.5),
        unit(3, "Mitsubishi", "Ururu", "A++", &["slaapkamer"], 1499.0, 2.5),
        unit(4, "Mitsubishi", "Heavy", "A+", &["zolder"], 999.0, 2.0),
        unit(5, "Panasonic", "Etherea", "A++", &["woonkamer", "zolder"], 1199.0, 3.5),
        unit(6, "Panasonic", "TZ", "A+", &["slaapkamer"], 849.0, 2.0),
        unit(7, "LG", "Artcool", "A++", &["woonkamer"], 1099.0, 5.0),
        // Missing price: never matches a price range, still counts for other facets.
        Item::new()
            .with("id", 8)
            .with("Merk", "LG")
            .with("Model", "Standard")
            .with("Energieklasse", "A+")
            .with("Geschikt voor", vec!["zolder".to_string()])
            .with("Koelvermogen (kW)", 2.5),
    ]
}

async fn engine() -> (CatalogEngine<StoreClient>, StoreClient) {
    let registry = ResourceRegistry::new([indoor_units()]).unwrap();
    let (store, client) = CatalogStore::new(32, &registry);
    tokio::spawn(store.run());
    client.load("indoor-units", catalog()).await.unwrap();
    (CatalogEngine::new(registry, client.clone()), client)
}

fn ids(items: &[Item]) -> Vec<i64> {
    items
        .iter()
        .filter_map(|item| item.get("id").and_then(FieldValue::as_number))
        .map(|n| n as i64)
        .collect()
}

fn with(base: &RawParams, extra: &[(&str, &str)]) -> RawParams {
    let mut params = base.clone();
    for (k, v) in extra {
        params.insert(k.to_string(), v.to_string());
    }
    params
}

#[tokio::test]
async fn test_identical_requests_give_identical_bytes() {
    let (engine, _client) = engine().await;
    let params = raw_params([
        ("search", "a"),
        ("Energieklasse", "A++,A+++"),
        ("Prijs_max", "1500"),
        ("sortBy", "Koelvermogen (kW)"),
        ("sortOrder", "desc"),
        ("limit", "2"),
    ]);

    let first = engine.respond("indoor-units", &params).await.unwrap();
    let second = engine.respond("indoor-units", &params).await.unwrap();

    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[tokio::test]
async fn test_pages_concatenate_to_matching_set() {
    let (engine, _client) = engine().await;
    let filters = raw_params([("Geschikt voor", "woonkamer,slaapkamer"), ("sortBy", "Prijs")]);

    let all = engine
        .query("indoor-units", &with(&filters, &[("limit", "100")]))
        .await
        .unwrap();
    let expected = ids(&all.page.items);
    assert_eq!(expected.len(), all.page.total);

    for limit in 1..=expected.len() + 1 {
        let mut collected = Vec::new();
        let limit_param = limit.to_string();
        let first = engine
            .query("indoor-units", &with(&filters, &[("limit", limit_param.as_str())]))
            .await
            .unwrap();
        for page in 1..=first.page.total_pages {
            let page_param = page.to_string();
            let outcome = engine
                .query(
                    "indoor-units",
                    &with(
                        &filters,
                        &[("limit", limit_param.as_str()), ("page", page_param.as_str())],
                    ),
                )
                .await
                .unwrap();
            assert!(outcome.page.items.len() <= limit);
            collected.extend(ids(&outcome.page.items));
        }
        assert_eq!(collected, expected, "limit={limit}");
    }
}

#[tokio::test]
async fn test_own_selection_does_not_change_own_facet() {
    let (engine, _client) = engine().await;
    let base = raw_params([("Prijs_max", "1500")]);

    let mut merk_facets = Vec::new();
    let mut totals = BTreeSet::new();
    for selection in ["Daikin", "Mitsubishi,LG", "Panasonic", "Onbekend"] {
        let outcome = engine
            .query("indoor-units", &with(&base, &[("Merk", selection)]))
            .await
            .unwrap();
        merk_facets.push(outcome.facets.categorical["Merk"].clone());
        totals.insert(outcome.page.total);
    }

    assert!(merk_facets.windows(2).all(|w| w[0] == w[1]));
    // The selection still narrows the page itself.
    assert!(totals.len() > 1);
}

#[tokio::test]
async fn test_other_selections_narrow_facets() {
    let (engine, _client) = engine().await;

    let outcome = engine
        .query(
            "indoor-units",
            &raw_params([("Merk", "Daikin"), ("Koelvermogen (kW)_min", "3")]),
        )
        .await
        .unwrap();

    assert_eq!(ids(&outcome.page.items), vec![2]);
    // Merk facet drops only its own clause: items with >= 3 kW.
    assert_eq!(outcome.facets.count("Merk", "Daikin"), 1);
    assert_eq!(outcome.facets.count("Merk", "Panasonic"), 1);
    assert_eq!(outcome.facets.count("Merk", "LG"), 1);
    assert_eq!(outcome.facets.count("Merk", "Mitsubishi"), 0);
    // Multi-valued attributes count once per value.
    assert_eq!(outcome.facets.count("Geschikt voor", "woonkamer"), 1);
    // Range facet drops only its own clause: every Daikin.
    let kw = outcome.facets.ranges["Koelvermogen (kW)"];
    assert_eq!((kw.min, kw.max), (2.5, 3.5));
}

#[tokio::test]
async fn test_unknown_parameters_have_no_effect() {
    let (engine, _client) = engine().await;
    let params = raw_params([("Merk", "Daikin,LG"), ("sortBy", "Prijs")]);
    let noisy = with(
        &params,
        &[
            ("Kleur", "wit"),
            ("Model_min", "3"),
            ("Gewicht_max", "10"),
            ("id", "4"),
            ("utm_source", "nieuwsbrief"),
        ],
    );

    let clean = engine.respond("indoor-units", &params).await.unwrap();
    let dirty = engine.respond("indoor-units", &noisy).await.unwrap();

    assert_eq!(clean.to_json().unwrap(), dirty.to_json().unwrap());
}

#[tokio::test]
async fn test_range_bounds_are_inclusive() {
    let (engine, _client) = engine().await;

    let inside = engine
        .query(
            "indoor-units",
            &raw_params([("Prijs_min", "999"), ("Prijs_max", "1299")]),
        )
        .await
        .unwrap();
    assert_eq!(ids(&inside.page.items), vec![1, 4, 5, 7]);

    let outside = engine
        .query(
            "indoor-units",
            &raw_params([("Prijs_min", "999.01"), ("Prijs_max", "1298.99")]),
        )
        .await
        .unwrap();
    assert_eq!(ids(&outside.page.items), vec![5, 7]);
}

#[tokio::test]
async fn test_malformed_input_degrades_to_defaults() {
    let (engine, _client) = engine().await;

    let outcome = engine
        .query(
            "indoor-units",
            &raw_params([
                ("page", "-3"),
                ("limit", "veel"),
                ("sortBy", "Bestaat niet"),
                ("sortOrder", "sideways"),
                ("Prijs_min", "goedkoop"),
            ]),
        )
        .await
        .unwrap();

    assert_eq!(outcome.page.page, 1);
    assert_eq!(outcome.page.limit, 10);
    assert_eq!(outcome.page.total, 8);
    assert_eq!(ids(&outcome.page.items), (1..=8).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_writes_are_visible_to_next_query() {
    let (engine, client) = engine().await;

    client
        .upsert(
            "indoor-units",
            unit(9, "Toshiba", "Haori", "A+++", &["slaapkamer"], 1599.0, 2.5),
        )
        .await
        .unwrap();
    assert!(client.remove("indoor-units", 1).await.unwrap());

    let outcome = engine
        .query("indoor-units", &raw_params([("Energieklasse", "A+++")]))
        .await
        .unwrap();

    assert_eq!(ids(&outcome.page.items), vec![2, 9]);
    assert_eq!(outcome.facets.count("Merk", "Toshiba"), 1);
}

/// Queries racing against writes each see one consistent snapshot: the page, the totals and
/// the facets all describe the same collection.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_queries_during_writes_are_consistent() {
    let (engine, client) = engine().await;
    let engine = Arc::new(engine);

    let writer = tokio::spawn(async move {
        for id in 100..160 {
            let merk = ["Daikin", "Fujitsu", "LG"][id as usize % 3];
            client
                .upsert(
                    "indoor-units",
                    unit(id, merk, "Batch", "A++", &["kantoor"], 1000.0 + id as f64, 3.0),
                )
                .await
                .unwrap();
            // Flip an existing unit between brands so counts move in both directions.
            let flipped = if id % 2 == 0 { "Toshiba" } else { "Daikin" };
            client
                .upsert(
                    "indoor-units",
                    unit(1, flipped, "Perfera", "A+++", &["woonkamer"], 1299.0, 2.5),
                )
                .await
                .unwrap();
            tokio::task::yield_now().await;
        }
    });

    let readers: Vec<_> = (0..8)
        .map(|reader| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let mut last_total = 0;
                for _ in 0..40 {
                    let params = if reader % 2 == 0 {
                        raw_params([("limit", "1000")])
                    } else {
                        raw_params([("limit", "1000"), ("Merk", "Daikin")])
                    };
                    let outcome = engine.query("indoor-units", &params).await.unwrap();
                    let page = &outcome.page;

                    assert_eq!(page.items.len(), page.total);
                    assert_eq!(page.total_pages, 1);

                    let mut on_page: BTreeMap<String, usize> = BTreeMap::new();
                    for item in &page.items {
                        let merk = item.get("Merk").unwrap().to_string();
                        *on_page.entry(merk).or_default() += 1;
                    }

                    let merk_facet = &outcome.facets.categorical["Merk"];
                    if reader % 2 == 0 {
                        // Unfiltered: every brand facet count is exactly what the page holds.
                        let in_facet: BTreeMap<String, usize> = merk_facet
                            .iter()
                            .map(|entry| (entry.value.to_string(), entry.count))
                            .collect();
                        assert_eq!(in_facet, on_page);
                        // Only upserts of new ids grow the collection.
                        assert!(page.total >= last_total);
                        last_total = page.total;
                    } else {
                        // Leave-one-out: the Merk facet still counts the selected brand.
                        assert_eq!(on_page.keys().collect::<Vec<_>>(), vec!["Daikin"]);
                        assert_eq!(outcome.facets.count("Merk", "Daikin"), page.total);
                    }
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }

    let settled = engine
        .query("indoor-units", &raw_params([("limit", "1000")]))
        .await
        .unwrap();
    assert_eq!(settled.page.total, 8 + 60);
}
