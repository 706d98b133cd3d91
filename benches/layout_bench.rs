use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tilegrid::engine::{Grid, GridStrategies};
use tilegrid::layout::layout_tiles;
use tilegrid::render::MemoryTarget;
use tilegrid::template::{RowTemplate, TemplateSpec};
use tilegrid::tile::PostTileData;
use tilegrid::GridConfig;

const TEMPLATE: &str = "1 1 1 1\n2 2\n4\n3 1\n1 3\n2 1 1";

fn template() -> RowTemplate {
    RowTemplate::from_spec(&TemplateSpec::from(TEMPLATE), 4).expect("valid template")
}

fn bench_layout_tiles(c: &mut Criterion) {
    let t = template();
    let cfg = GridConfig {
        padding: 10,
        ..Default::default()
    };

    c.bench_function("layout_tiles_1000", |b| {
        b.iter(|| layout_tiles(black_box(&t), 4, black_box(1000), black_box(1280), &cfg).unwrap())
    });
}

fn bench_grid_resize(c: &mut Criterion) {
    let posts: Vec<PostTileData> = (1..=500)
        .map(|id| PostTileData::new(id, format!("/?p={}", id), format!("Post {}", id)))
        .collect();
    let target = MemoryTarget::new(1280);
    let mut grid = Grid::new(
        GridConfig::default(),
        GridStrategies::default(),
        template(),
        Box::new(target.clone()),
    );
    grid.update_tiles(&posts);

    let mut wide = false;
    c.bench_function("grid_resize_500", |b| {
        b.iter(|| {
            // alternate widths so every pass is a real relayout
            wide = !wide;
            target.set_width(if wide { 1280 } else { 960 });
            grid.resize().unwrap();
            black_box(grid.container_height())
        })
    });
}

criterion_group!(benches, bench_layout_tiles, bench_grid_resize);
criterion_main!(benches);
