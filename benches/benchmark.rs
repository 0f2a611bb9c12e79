use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};

use tile_atlas::border::{expand, expand_grid};
use tile_atlas::packer::{pack, pack_with_records};
use tile_atlas::tiler::split;
use tile_atlas::{AtlasBuilder, AtlasSettings, PowerOfTwoRounding};

/// Deterministic "noisy" sprite sheet so compression-like shortcuts can't kick in.
fn sheet(w: u32, h: u32) -> RgbaImage {
    let mut state: u32 = 0x1234_5678;
    RgbaImage::from_fn(w, h, |_, _| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let [a, b, c, d] = state.to_le_bytes();
        Rgba([a, b, c, d])
    })
}

/// Slice a 1024x1024 sheet into 32x32 tiles.
fn bench_split(c: &mut Criterion) {
    let src = sheet(1024, 1024);
    c.bench_function("split_1024_by_32", |b| {
        b.iter(|| black_box(split(black_box(&src), 32, 32).unwrap()))
    });
}

/// Pad one tile with a few border sizes.
fn bench_expand_tile(c: &mut Criterion) {
    let tile = sheet(64, 64);
    for border in [1, 4, 16] {
        c.bench_function(&format!("expand_64_border_{border}"), |b| {
            b.iter(|| black_box(expand(black_box(&tile), border).unwrap()))
        });
    }
}

/// Whole-grid expansion, serial vs rayon.
fn bench_expand_grid(c: &mut Criterion) {
    let grid = split(&sheet(1024, 1024), 32, 32).unwrap();
    for parallel in [false, true] {
        let label = if parallel { "parallel" } else { "serial" };
        c.bench_function(&format!("expand_grid_{label}"), |b| {
            b.iter(|| black_box(expand_grid(grid.clone(), 2, parallel).unwrap()))
        });
    }
}

/// Packing only, and packing with record emission.
fn bench_pack(c: &mut Criterion) {
    let padded = expand_grid(split(&sheet(1024, 1024), 32, 32).unwrap(), 2, true).unwrap();
    c.bench_function("pack_32x32_grid", |b| {
        b.iter(|| black_box(pack(black_box(&padded), PowerOfTwoRounding::Ceil).unwrap()))
    });
    c.bench_function("pack_with_records_32x32_grid", |b| {
        b.iter(|| {
            black_box(pack_with_records(black_box(&padded), 2, PowerOfTwoRounding::Ceil).unwrap())
        })
    });
}

fn bench_full_build(c: &mut Criterion) {
    let src = sheet(512, 512);
    let settings = AtlasSettings { tile_width: 16, tile_height: 16, border_size: 2, ..AtlasSettings::default() };
    c.bench_function("atlas_build_512", |b| {
        b.iter(|| black_box(AtlasBuilder::build(black_box(&src), &settings).unwrap()))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets =
        bench_split,
        bench_expand_tile,
        bench_expand_grid,
        bench_pack,
        bench_full_build
}
criterion_main!(benches);
