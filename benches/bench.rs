// Criterion benchmarks for Pet Match

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pet_match::core::{find_nearby, haversine_distance, Matcher};
use pet_match::models::{Report, ReportState, Size, Species};

const SPECIES: [Species; 5] = [Species::Dog, Species::Cat, Species::Bird, Species::Rodent, Species::Reptile];
const SIZES: [Size; 3] = [Size::Small, Size::Medium, Size::Large];
const FUR: [&str; 4] = ["Caramelo", "Preto", "Branco", "Cinza"];

fn create_candidate(id: usize, state: ReportState, lat: f64, lon: f64) -> Report {
    Report {
        id: id.to_string(),
        owner_id: format!("owner_{}", id % 50),
        state,
        species: SPECIES[id % SPECIES.len()],
        breed: if id % 3 == 0 { Some("SRD".to_string()) } else { None },
        size: SIZES[id % SIZES.len()],
        fur_color: FUR[id % FUR.len()].to_string(),
        eye_color: None,
        notes: None,
        image_url: None,
        latitude: lat,
        longitude: lon,
        last_seen_at: None,
        archived_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_candidates(count: usize, state: ReportState) -> Vec<Report> {
    (0..count)
        .map(|i| {
            let lat_offset = (i as f64 * 0.001) % 0.5;
            let lon_offset = (i as f64 * 0.0007) % 0.5;
            create_candidate(i, state, -23.55 + lat_offset, -46.60 - lon_offset)
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(-23.55),
                black_box(-46.60),
                black_box(-23.40),
                black_box(-46.62),
            )
        });
    });
}

fn bench_proximity(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_nearby");

    for candidate_count in [10, 100, 1000, 10000].iter() {
        let candidates = create_candidates(*candidate_count, ReportState::Found);

        group.bench_with_input(
            BenchmarkId::new("radius_5km", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| find_nearby(black_box(-23.55), black_box(-46.60), black_box(5.0), &candidates));
            },
        );
    }

    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::default();
    let losses = create_candidates(5, ReportState::Lost);

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 100, 1000, 10000].iter() {
        let candidates = create_candidates(*candidate_count, ReportState::Found);

        group.bench_with_input(
            BenchmarkId::new("find_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| matcher.find_matches(black_box(&losses), black_box(&candidates)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_haversine_distance, bench_proximity, bench_matching);

criterion_main!(benches);
