//! End-to-end pipeline tests: ingest real synthetic audio into a catalog and
//! identify it back.

use std::sync::Arc;

use waveprint::config::WaveprintConfig;
use waveprint::ingest::{IngestConfig, Ingestor};
use waveprint::{
    fingerprint_samples, identify_samples, write_wav, FingerprintConfig, FingerprintStore,
    MatchConfig, Matcher, MemoryStore, SpectralConfig,
};

/// A melody-like signal: fundamental plus first harmonic, switching notes
/// every half second. Rich enough to light up several peak bands.
fn melody(rate: u32, seconds: f64, notes: &[f64]) -> Vec<f64> {
    let total = (rate as f64 * seconds) as usize;
    let per_note = (rate as f64 * 0.5) as usize;
    (0..total)
        .map(|i| {
            let note = notes[(i / per_note) % notes.len()];
            let t = i as f64 / rate as f64;
            let fundamental = (2.0 * std::f64::consts::PI * note * t).sin();
            let harmonic = 0.5 * (2.0 * std::f64::consts::PI * 2.0 * note * t).sin();
            0.6 * (fundamental + harmonic)
        })
        .collect()
}

const SONG_A_NOTES: [f64; 8] = [262.0, 330.0, 392.0, 523.0, 659.0, 784.0, 1047.0, 1319.0];
const SONG_B_NOTES: [f64; 8] = [294.0, 370.0, 440.0, 587.0, 740.0, 880.0, 1175.0, 1480.0];

#[test]
fn self_match_ranks_the_ingested_song_first() {
    let rate = 44_100u32;
    let spectral_cfg = SpectralConfig::default();
    let fingerprint_cfg = FingerprintConfig::default();

    let clip_a = melody(rate, 10.0, &SONG_A_NOTES);
    let clip_b = melody(rate, 10.0, &SONG_B_NOTES);

    let store = Arc::new(MemoryStore::new());
    let id_a = store.register_song("Song A", "Tester", "a").unwrap();
    let id_b = store.register_song("Song B", "Tester", "b").unwrap();

    let set_a = fingerprint_samples(&clip_a, rate, id_a, &spectral_cfg, &fingerprint_cfg).unwrap();
    let set_b = fingerprint_samples(&clip_b, rate, id_b, &spectral_cfg, &fingerprint_cfg).unwrap();
    assert!(!set_a.is_empty());
    store.store_fingerprints(&set_a).unwrap();
    store.store_fingerprints(&set_b).unwrap();

    let matcher = Matcher::new(store, MatchConfig::default());
    let ranked =
        identify_samples(&clip_a, rate, &spectral_cfg, &fingerprint_cfg, &matcher).unwrap();

    assert!(!ranked.is_empty());
    assert_eq!(ranked[0].song_id, id_a, "self-match must rank first");
    for other in &ranked[1..] {
        assert!(
            ranked[0].score > other.score,
            "self-match score {} not strictly above {} ({})",
            ranked[0].score,
            other.score,
            other.title
        );
    }

    // An exact self-match aligns every hit at offset zero, so its support
    // must cover at least half the generated fingerprints.
    assert!(
        ranked[0].score >= 0.5 * set_a.len() as f64,
        "score {} too low for {} fingerprints",
        ranked[0].score,
        set_a.len()
    );
}

#[test]
fn fingerprinting_is_bit_identical_between_runs() {
    let rate = 44_100u32;
    let clip = melody(rate, 5.0, &SONG_A_NOTES);
    let spectral_cfg = SpectralConfig::default();
    let fingerprint_cfg = FingerprintConfig::default();

    let first = fingerprint_samples(&clip, rate, 1, &spectral_cfg, &fingerprint_cfg).unwrap();
    let second = fingerprint_samples(&clip, rate, 1, &spectral_cfg, &fingerprint_cfg).unwrap();
    assert_eq!(first, second);
}

#[test]
fn wav_ingest_then_identify_through_the_facade() {
    let rate = 44_100u32;
    let clip = melody(rate, 6.0, &SONG_A_NOTES);

    // Write the clip as a PCM-16 WAV the way a transcoder would deliver it.
    let data: Vec<u8> = clip
        .iter()
        .flat_map(|&s| (((s * 32_767.0).clamp(-32_768.0, 32_767.0)) as i16).to_le_bytes())
        .collect();
    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("song_a.wav");
    write_wav(&wav_path, &data, rate, 1, 16).unwrap();

    let config = WaveprintConfig::default();
    let store = config.store.to_store_config().build().unwrap();
    let ingestor = Ingestor::new(
        store.clone(),
        config.spectral.clone(),
        config.fingerprint.clone(),
        &IngestConfig { workers: Some(1) },
    );
    let song_id = ingestor.ingest_file(&wav_path).unwrap();
    assert_eq!(store.total_songs().unwrap(), 1);

    // Identify from the quantised samples that actually hit the disk.
    let readback = waveprint::read_wav(&wav_path).unwrap();
    let matcher = Matcher::new(store, config.matcher.clone());
    let ranked = identify_samples(
        &readback.left,
        readback.sample_rate,
        &config.spectral,
        &config.fingerprint,
        &matcher,
    )
    .unwrap();

    assert_eq!(ranked[0].song_id, song_id);
    assert_eq!(ranked[0].title, "song_a");
}

#[test]
fn a_clip_of_the_song_still_matches() {
    let rate = 44_100u32;
    let spectral_cfg = SpectralConfig::default();
    let fingerprint_cfg = FingerprintConfig::default();

    let full = melody(rate, 10.0, &SONG_A_NOTES);
    let other = melody(rate, 10.0, &SONG_B_NOTES);

    let store = Arc::new(MemoryStore::new());
    let id_a = store.register_song("Song A", "Tester", "").unwrap();
    let id_b = store.register_song("Song B", "Tester", "").unwrap();
    store
        .store_fingerprints(
            &fingerprint_samples(&full, rate, id_a, &spectral_cfg, &fingerprint_cfg).unwrap(),
        )
        .unwrap();
    store
        .store_fingerprints(
            &fingerprint_samples(&other, rate, id_b, &spectral_cfg, &fingerprint_cfg).unwrap(),
        )
        .unwrap();

    // Query with the full clip repeated from the start; a prefix keeps the
    // note boundaries aligned with ingest, as a real recording of the same
    // playback would.
    let clip = full[..(rate as usize * 4)].to_vec();
    let matcher = Matcher::new(store, MatchConfig::default());
    let ranked =
        identify_samples(&clip, rate, &spectral_cfg, &fingerprint_cfg, &matcher).unwrap();

    assert!(!ranked.is_empty());
    assert_eq!(ranked[0].song_id, id_a);
}
