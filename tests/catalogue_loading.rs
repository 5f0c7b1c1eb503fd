// Catalogue and configuration files on disk, wired into a running translator

use minidsp_control::catalogue::CatalogueError;
use minidsp_control::config::ConfigError;
use minidsp_control::{
    AppConfig, DeviceModel, DeviceWriter, InMemoryCatalogue, LegacyTranslator, PresetCatalogue,
    RingbufSink, SearchFilters, create_command_channel,
};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

const CATALOGUE: &str = r#"{
    "version": "20240101",
    "entries": [
        {
            "id": "1001_0",
            "title": "The Thing",
            "author": "aron7awol",
            "year": 1982,
            "audioTypes": ["DTS-HD MA 5.1"],
            "contentType": "film",
            "filters": [
                {"type": "LowShelf", "freq": 20.0, "gain": 6.0, "q": 0.707},
                {"type": "PeakingEQ", "freq": 45.0, "gain": -2.5, "q": 1.4},
                {"type": "HighShelf", "freq": 120.0, "gain": -1.0, "q": 0.9}
            ]
        },
        {
            "id": "1002_0",
            "title": "Thin Red Line",
            "author": "mobe1969",
            "year": 1998,
            "audioTypes": ["DTS-HD MA 5.1", "Dolby TrueHD 7.1"],
            "contentType": "film",
            "bands": [
                [1.0003468763586854, -1.9979191385126602, 0.9975784764805841, 1.9979204983896346, -0.9979239929622952]
            ]
        }
    ]
}"#;

#[test]
fn test_catalogue_file_round_trip_to_device() {
    let dir = tempdir().unwrap();
    let catalogue_path = dir.path().join("catalogue.json");
    let config_path = dir.path().join("config.ron");
    fs::write(&catalogue_path, CATALOGUE).unwrap();
    fs::write(
        &config_path,
        format!(
            "(catalogue_path: Some({:?}), command_buffer_capacity: 64, writer_poll_ms: 1)",
            catalogue_path
        ),
    )
    .unwrap();

    let config = AppConfig::load(Some(config_path.as_path())).unwrap();
    assert_eq!(config.catalogue_path.as_deref(), Some(catalogue_path.as_path()));
    assert_eq!(config.command_buffer_capacity, 64);
    assert_eq!(config.log_filter, "info");

    let catalogue = InMemoryCatalogue::from_file(config.catalogue_path.as_ref().unwrap()).unwrap();
    assert_eq!(catalogue.len(), 2);
    let meta = catalogue.metadata();
    assert_eq!(meta.version, "20240101");
    assert!(meta.loaded);
    assert_eq!(meta.count, 2);

    let delivered = Arc::new(Mutex::new(Vec::new()));
    let (producer, consumer) = create_command_channel(config.command_buffer_capacity);
    let sink_lines = delivered.clone();
    let writer = DeviceWriter::spawn(
        consumer,
        Duration::from_millis(config.writer_poll_ms),
        move |line| sink_lines.lock().unwrap().push(line.to_string()),
    )
    .unwrap();

    let translator = LegacyTranslator::new(
        DeviceModel::new(),
        RingbufSink::new(producer),
        Arc::new(catalogue),
    );
    let snapshot = translator.load(4, "1001_0").unwrap();
    assert!(snapshot.slots[3].active);
    assert_eq!(snapshot.slots[3].last, "The Thing");

    // 1 select + 2 inputs x (3 used x 2 + 7 bypassed)
    assert_eq!(writer.stop(), 27);
    let lines = delivered.lock().unwrap().clone();
    assert_eq!(lines.len(), 27);
    assert_eq!(lines[0], "config 3");
    assert!(lines[1].starts_with("input 0 peq 0 set -- "));
    assert_eq!(lines[2], "input 0 peq 0 bypass off");
    assert_eq!(lines[7], "input 0 peq 3 bypass on");
    assert!(lines[14].starts_with("input 1 peq 0 set -- "));
    assert_eq!(lines[26], "input 1 peq 9 bypass on");
    // same filters on both inputs
    assert_eq!(lines[1].replacen("input 0", "input 1", 1), lines[14]);
}

#[test]
fn test_burst_of_loads_through_ring_buffer() {
    let config = AppConfig::default();
    let catalogue = InMemoryCatalogue::from_json_str(CATALOGUE).unwrap();
    let (producer, consumer) = create_command_channel(config.command_buffer_capacity);
    let writer = DeviceWriter::spawn(
        consumer,
        Duration::from_millis(config.writer_poll_ms),
        |_| {},
    )
    .unwrap();
    let translator = LegacyTranslator::new(
        DeviceModel::new(),
        RingbufSink::with_timeout(producer, Duration::from_millis(config.sink_timeout_ms)),
        Arc::new(catalogue),
    );

    // 12 loads of 27 commands each overrun the 256 line buffer between writer polls
    for request in 0..12 {
        let slot = request % 4 + 1;
        if let Err(e) = translator.load(slot, "1001_0") {
            panic!("load {} on slot {} failed: {}", request, slot, e);
        }
    }

    assert_eq!(writer.stop(), 12 * 27);
    let snapshot = translator.snapshot().unwrap();
    assert!(snapshot.slots.iter().all(|s| s.last == "The Thing"));
}

#[test]
fn test_catalogue_queries_from_file() {
    let catalogue = InMemoryCatalogue::from_json_str(CATALOGUE).unwrap();

    let dts = catalogue.search(&SearchFilters {
        audio_type: Some("dts-hd ma 5.1".to_string()),
        ..Default::default()
    });
    assert_eq!(dts.len(), 2);
    assert_eq!(dts[0].id, "1001_0");

    let thin = catalogue.search(&SearchFilters {
        title: Some("thin".to_string()),
        authors: vec!["MOBE1969".to_string()],
        ..Default::default()
    });
    assert_eq!(thin.len(), 1);
    assert_eq!(thin[0].year, Some(1998));

    assert_eq!(
        catalogue.audio_types().into_iter().collect::<Vec<_>>(),
        vec!["DTS-HD MA 5.1", "Dolby TrueHD 7.1"]
    );
    assert_eq!(catalogue.years().into_iter().collect::<Vec<_>>(), vec![1982, 1998]);

    let explicit = catalogue.resolve("1002_0").unwrap();
    assert_eq!(
        explicit.bands[1][0].coefficients(),
        [
            1.0003468763586854,
            -1.9979191385126602,
            0.9975784764805841,
            1.9979204983896346,
            -0.9979239929622952
        ]
    );
    assert!(catalogue.resolve("missing").is_none());
}

#[test]
fn test_bad_catalogue_files() {
    let dir = tempdir().unwrap();

    let missing = InMemoryCatalogue::from_file(dir.path().join("absent.json"));
    assert!(matches!(missing, Err(CatalogueError::Io(_))));

    let garbled = dir.path().join("garbled.json");
    fs::write(&garbled, "{ not json").unwrap();
    assert!(matches!(
        InMemoryCatalogue::from_file(&garbled),
        Err(CatalogueError::Json(_))
    ));

    let filters = (0..11)
        .map(|i| format!(r#"{{"type": "PeakingEQ", "freq": {}.0, "gain": 1.0, "q": 1.0}}"#, 20 + i))
        .collect::<Vec<_>>()
        .join(",");
    let crowded = format!(
        r#"{{"version": "1", "entries": [{{"id": "a", "title": "A", "filters": [{}]}}]}}"#,
        filters
    );
    assert!(matches!(
        InMemoryCatalogue::from_json_str(&crowded),
        Err(CatalogueError::TooManyFilters { count: 11, max: 10, .. })
    ));

    let duplicate = r#"{"version": "1", "entries": [
        {"id": "a", "title": "A"},
        {"id": "a", "title": "B"}
    ]}"#;
    assert!(matches!(
        InMemoryCatalogue::from_json_str(duplicate),
        Err(CatalogueError::DuplicateId(id)) if id == "a"
    ));
}

#[test]
fn test_bad_config_files() {
    let dir = tempdir().unwrap();

    let missing = AppConfig::load(Some(dir.path().join("absent.ron").as_path()));
    assert!(matches!(missing, Err(ConfigError::Io(_))));

    let small = dir.path().join("small.ron");
    fs::write(&small, "(command_buffer_capacity: 16)").unwrap();
    assert!(matches!(
        AppConfig::from_file(&small),
        Err(ConfigError::CapacityTooSmall { capacity: 16, min: 41 })
    ));

    let garbled = dir.path().join("garbled.ron");
    fs::write(&garbled, "(log_filter: 12").unwrap();
    assert!(matches!(AppConfig::from_file(&garbled), Err(ConfigError::Ron(_))));
}
