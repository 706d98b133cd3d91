//! End-to-end layout behaviour through the public grid API

use tilegrid::engine::{Grid, GridStrategies, LayoutState};
use tilegrid::layout::Rect;
use tilegrid::render::MemoryTarget;
use tilegrid::template::{RowTemplate, TemplateSpec};
use tilegrid::tile::PostTileData;
use tilegrid::{Error, GridConfig};

fn posts(n: u64) -> Vec<PostTileData> {
    (1..=n)
        .map(|id| {
            PostTileData::new(id, format!("https://example.com/?p={}", id), format!("Post {}", id))
                .with_category("News")
        })
        .collect()
}

fn grid_with(template: &str, width: u32) -> (Grid, MemoryTarget) {
    let template = RowTemplate::from_spec(&TemplateSpec::from(template), 4).expect("valid template");
    let target = MemoryTarget::new(width);
    let grid = Grid::new(
        GridConfig::default(),
        GridStrategies::default(),
        template,
        Box::new(target.clone()),
    );
    (grid, target)
}

#[test]
fn four_columns_six_tiles_stop_after_second_row() {
    let (mut grid, target) = grid_with("1 1 1 1\n2 2\n4", 400);
    grid.update_tiles(&posts(6));
    grid.resize().expect("layout");

    let placements: Vec<_> = grid.placements().into_iter().map(|p| p.expect("placed")).collect();
    for (i, p) in placements[..4].iter().enumerate() {
        assert_eq!(p.row, 0);
        assert_eq!(p.span, 1);
        assert_eq!(p.rect, Rect { x: i as u32 * 100, y: 0, width: 100, height: 100 });
    }
    for (i, p) in placements[4..].iter().enumerate() {
        assert_eq!(p.row, 1);
        assert_eq!(p.span, 2);
        assert_eq!(p.rect, Rect { x: i as u32 * 200, y: 100, width: 200, height: 100 });
    }
    assert_eq!(grid.row_count(), 2);
    assert_eq!(grid.container_height(), 100 + 100);

    grid.redraw(false, |report| assert_eq!(report.wrapper_height, 200));
    let frame = target.last_frame().expect("frame");
    assert_eq!(frame.container_height, 200);
    assert!(frame.tiles.iter().all(|t| t.rect.is_some()));
}

#[test]
fn tiles_beyond_the_template_repeat_the_pattern() {
    let (mut grid, _target) = grid_with("1 1 1 1\n2 2\n4", 400);
    grid.update_tiles(&posts(10));
    grid.resize().expect("layout");

    let rows: Vec<usize> = grid.placements().iter().map(|p| p.expect("placed").row).collect();
    assert_eq!(rows, vec![0, 0, 0, 0, 1, 1, 2, 3, 3, 3]);
    assert_eq!(grid.container_height(), 400);
}

#[test]
fn repeated_resize_without_changes_is_stable() {
    let (mut grid, target) = grid_with("2 1 1\n4", 640);
    grid.update_tiles(&posts(7));
    grid.resize().expect("layout");
    let first = grid.placements();

    grid.resize().expect("layout");
    assert_eq!(grid.state(), LayoutState::Clean);
    assert_eq!(grid.placements(), first);

    target.set_width(320);
    grid.resize().expect("layout");
    assert_ne!(grid.placements(), first);
    assert_eq!(grid.column_width(), 80);
}

#[test]
fn empty_post_list_is_an_empty_grid() {
    let (mut grid, target) = grid_with("4", 400);
    assert_eq!(grid.update_tiles(&[]), 0);
    grid.resize().expect("layout");
    assert_eq!(grid.container_height(), 0);
    assert_eq!(grid.wrapper_height(), 0);
    grid.redraw(false, |report| assert_eq!(report.tile_count, 0));
    assert_eq!(target.last_frame().map(|f| f.tiles.len()), Some(0));
}

#[test]
fn structured_and_string_templates_are_identical() {
    let structured = RowTemplate::from_spec(
        &TemplateSpec::Rows(vec![vec![1, 1, 2], vec![4], vec![3, 1]]),
        4,
    )
    .expect("structured");
    let text = RowTemplate::from_spec(&TemplateSpec::from("1,1,2\n\n4\n 3 , 1 "), 4).expect("text");
    assert_eq!(structured, text);
}

#[test]
fn every_accepted_row_fills_the_grid() {
    let candidates = [
        "1 1 1 1\n2 2",
        "3 1\n1 3\n4",
        "2 2\n2 1",
        "5",
        "1 1 1 1 1",
        "2 -2 4",
        "",
    ];
    for text in candidates {
        match RowTemplate::from_spec(&TemplateSpec::from(text), 4) {
            Ok(t) => assert!(t.rows().iter().all(|r| r.iter().sum::<u32>() == 4), "{text}"),
            Err(e) => assert!(matches!(e, Error::MalformedTemplate { .. }), "{text}: {e}"),
        }
    }
}

#[test]
fn tile_content_follows_image_and_byline_flags() {
    let (mut grid, _target) = grid_with("1 1 1 1", 400);
    grid.update_tiles(&[
        PostTileData::new(1, "/1", "with image").with_image("/a.jpg"),
        PostTileData::new(2, "/2", "colour only").with_color("#ff0000"),
        PostTileData::new(3, "/3", "hidden byline").with_image("/b.jpg").hiding_byline(),
        PostTileData::new(4, "/4", "hidden byline, no image").hiding_byline(),
    ]);
    let tiles = grid.tiles();

    assert_eq!(tiles[0].content.classes(), "tile-bg");
    assert!(tiles[0].content.byline.is_some());

    assert_eq!(tiles[1].content.classes(), "tile-color");
    assert!(!tiles[1].content.markup().contains("background-image"));
    assert!(tiles[1].content.markup().contains("background-color: #ff0000"));

    assert!(tiles[2].content.byline.is_none());
    assert!(tiles[3].content.byline.is_none());
    assert_eq!(tiles[3].content.classes(), "tile-color hide-byline");
}
