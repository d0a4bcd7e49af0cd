//! Integration tests for the Deep Zoom generator.
//!
//! These tests verify:
//! - Level hierarchy and tile grid metadata
//! - Native level selection and region coordinates
//! - Tile adjacency and overlap in level 0 space
//! - Rendered tile sizes and content
//! - Bounds limiting
//! - Error handling (bad addresses, source failures)

use std::sync::Arc;
use std::thread;

use image::Rgb;

use dzi_pyramid::error::{DeepZoomError, SourceError};
use dzi_pyramid::{BoundsBox, DeepZoomConfig, DeepZoomGenerator, SlideSource};

use super::test_utils::{
    coordinate_slide, solid_slide, MockSlideSource, RegionRequest,
};

fn config(tile_size: u32, overlap: u32) -> DeepZoomConfig {
    DeepZoomConfig::new(tile_size, overlap, false)
}

// =============================================================================
// Metadata
// =============================================================================

#[test]
fn test_square_4096_metadata() {
    let dz = DeepZoomGenerator::new(MockSlideSource::svs_like(4096, 4096), config(254, 1)).unwrap();

    assert_eq!(dz.level_count(), 13);
    assert_eq!(*dz.level_tiles().last().unwrap(), (17, 17));
    assert_eq!(*dz.level_dimensions().last().unwrap(), (4096, 4096));
    assert_eq!(dz.level_dimensions()[0], (1, 1));
}

#[test]
fn test_tile_count_is_sum_of_grids() {
    for (w, h) in [(1, 1), (300, 250), (4096, 4096), (12345, 678), (99999, 3)] {
        let dz = DeepZoomGenerator::new(MockSlideSource::new(vec![(w, h, 1.0)]), config(254, 1))
            .unwrap();
        let sum: u64 = dz
            .level_tiles()
            .iter()
            .map(|&(x, y)| x as u64 * y as u64)
            .sum();
        assert_eq!(dz.tile_count(), sum, "{w}x{h}");
        assert_eq!(*dz.level_dimensions().last().unwrap(), (w, h));
    }
}

#[test]
fn test_levels_halve_exactly() {
    let dz = DeepZoomGenerator::new(MockSlideSource::new(vec![(12345, 678, 1.0)]), config(254, 1))
        .unwrap();
    let dims = dz.level_dimensions();
    for pair in dims.windows(2) {
        assert_eq!(pair[0], (pair[1].0.div_ceil(2), pair[1].1.div_ceil(2)));
    }
}

#[test]
fn test_single_pixel_source() {
    let dz = DeepZoomGenerator::new(solid_slide(1, 1, [9, 8, 7]), config(254, 1)).unwrap();
    assert_eq!(dz.level_count(), 1);
    assert_eq!(dz.tile_count(), 1);

    let tile = dz.get_tile(0, (0, 0)).unwrap();
    assert_eq!(tile.dimensions(), (1, 1));
    assert_eq!(tile.get_pixel(0, 0), &Rgb([9, 8, 7]));
}

// =============================================================================
// Native Level Selection
// =============================================================================

#[test]
fn test_coordinates_use_matching_native_level() {
    let dz = DeepZoomGenerator::new(MockSlideSource::svs_like(4096, 4096), config(254, 1)).unwrap();

    // Level 10 is 4x downsampled: native level 1, no residual scaling
    let coords = dz.get_tile_coordinates(10, (0, 0)).unwrap();
    assert_eq!(coords.location, (0, 0));
    assert_eq!(coords.source_level, 1);
    assert_eq!(coords.size, (255, 255));

    // Level 11 is 2x downsampled: native level 0, twice the pixels
    let coords = dz.get_tile_coordinates(11, (1, 0)).unwrap();
    assert_eq!(coords.location, (506, 0));
    assert_eq!(coords.source_level, 0);
    assert_eq!(coords.size, (512, 510));
    assert_eq!(dz.get_tile_dimensions(11, (1, 0)).unwrap(), (256, 255));

    // Smallest level comes from the coarsest native level
    let coords = dz.get_tile_coordinates(0, (0, 0)).unwrap();
    assert_eq!(coords.source_level, 2);
    assert_eq!(coords.size, (256, 256));
}

#[test]
fn test_last_tile_clamped_to_native_extent() {
    let dz = DeepZoomGenerator::new(MockSlideSource::svs_like(4096, 4096), config(254, 1)).unwrap();

    let coords = dz.get_tile_coordinates(8, (1, 1)).unwrap();
    assert_eq!(coords.location, (4048, 4048));
    assert_eq!(coords.source_level, 2);
    assert_eq!(coords.size, (3, 3));
    assert_eq!(dz.get_tile_dimensions(8, (1, 1)).unwrap(), (3, 3));
}

#[test]
fn test_mappings_never_upsample() {
    let dz = DeepZoomGenerator::new(MockSlideSource::svs_like(40000, 30000), config(254, 1))
        .unwrap();
    for mapping in dz.level_mappings() {
        assert!(mapping.source_downsample <= mapping.requested_downsample);
        assert!(mapping.residual_scale >= 1.0);
    }
}

#[test]
fn test_synthesized_native_levels_are_used() {
    let slide = solid_slide(2048, 2048, [10, 200, 30]).with_native_levels(4);
    assert_eq!(slide.level_count(), 3);

    let dz = DeepZoomGenerator::new(slide, config(254, 1)).unwrap();
    let picks: Vec<usize> = dz.level_mappings().iter().map(|m| m.source_level).collect();

    assert_eq!(dz.level_count(), 12);
    assert_eq!(&picks[7..], &[2, 1, 1, 0, 0]);
    assert!(picks[..7].iter().all(|&p| p == 2));

    // Box-filtered native levels keep a solid color solid
    for level in [3, 8, 10] {
        let tile = dz.get_tile(level, (0, 0)).unwrap();
        assert_eq!(tile.get_pixel(0, 0), &Rgb([10, 200, 30]), "level {level}");
    }
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_get_tile_reads_exact_coordinates() {
    let dz = DeepZoomGenerator::new(MockSlideSource::svs_like(4096, 4096), config(254, 1)).unwrap();

    let tile = dz.get_tile(11, (1, 0)).unwrap();
    assert_eq!(tile.dimensions(), (256, 255));
    // Resampled solid color stays the same
    assert_eq!(tile.get_pixel(128, 128), &Rgb([0, 100, 200]));

    let tile = dz.get_tile(10, (0, 0)).unwrap();
    assert_eq!(tile.dimensions(), (255, 255));
    assert_eq!(tile.get_pixel(0, 0), &Rgb([40, 100, 200]));

    assert_eq!(
        dz.source().requests(),
        vec![
            RegionRequest {
                location: (506, 0),
                level: 0,
                size: (512, 510)
            },
            RegionRequest {
                location: (0, 0),
                level: 1,
                size: (255, 255)
            },
        ]
    );
}

#[test]
fn test_tile_content_matches_source_pixels() {
    let dz = DeepZoomGenerator::new(coordinate_slide(1000, 700), config(254, 1)).unwrap();
    let top = dz.level_count() - 1;

    // Overlap pixel of tile (1, 0) is source column 253
    let tile = dz.get_tile(top, (1, 0)).unwrap();
    assert_eq!(tile.get_pixel(0, 0), &Rgb([253, 0, 0]));

    // Tile (2, 1) starts at source (507, 253)
    let tile = dz.get_tile(top, (2, 1)).unwrap();
    assert_eq!(tile.get_pixel(0, 0), &Rgb([251, 253, 16]));
}

#[test]
fn test_tile_dimensions_round_trip() {
    let dz = DeepZoomGenerator::new(
        coordinate_slide(600, 400).with_native_levels(2),
        config(254, 1),
    )
    .unwrap();

    for (level, &(cols, rows)) in dz.level_tiles().iter().enumerate() {
        for row in 0..rows {
            for col in 0..cols {
                let expected = dz.get_tile_dimensions(level, (col, row)).unwrap();
                let tile = dz.get_tile(level, (col, row)).unwrap();
                assert_eq!(tile.dimensions(), expected, "level {level} tile {col},{row}");
            }
        }
    }
}

#[test]
fn test_edge_tiles_are_smaller() {
    let tile_size = 254;
    let overlap = 1;
    let dz = DeepZoomGenerator::new(coordinate_slide(1000, 700), config(tile_size, overlap))
        .unwrap();
    let max = tile_size + 2 * overlap;

    for (level, (&(cols, rows), &(width, height))) in dz
        .level_tiles()
        .iter()
        .zip(dz.level_dimensions().iter())
        .enumerate()
    {
        let (w, h) = dz.get_tile_dimensions(level, (cols - 1, rows - 1)).unwrap();
        if width % tile_size != 0 {
            assert!(w < max, "level {level}: {w}");
        }
        if height % tile_size != 0 {
            assert!(h < max, "level {level}: {h}");
        }
        for row in 0..rows {
            for col in 0..cols {
                let (w, h) = dz.get_tile_dimensions(level, (col, row)).unwrap();
                assert!(w <= max && h <= max);
            }
        }
    }
}

#[test]
fn test_adjacent_tiles_overlap_exactly() {
    let overlap = 1;
    let dz = DeepZoomGenerator::new(coordinate_slide(1000, 700), config(254, overlap)).unwrap();
    let top = dz.level_count() - 1;

    for (level, downsample) in [(top, 1i64), (top - 1, 2), (top - 2, 4)] {
        let (cols, _) = dz.level_tiles()[level];
        for col in 0..cols - 1 {
            let left = dz.tile_geometry(level, (col, 0)).unwrap();
            let right = dz.tile_geometry(level, (col + 1, 0)).unwrap();

            let left_end = left.coordinates.location.0 + left.level0_size.0 as i64;
            let right_start = right.coordinates.location.0;
            assert_eq!(
                left_end - right_start,
                2 * overlap as i64 * downsample,
                "level {level} columns {col}/{}",
                col + 1
            );
        }
    }
}

#[test]
fn test_zero_overlap_tiles_are_contiguous() {
    let dz = DeepZoomGenerator::new(coordinate_slide(1000, 700), config(256, 0)).unwrap();
    let top = dz.level_count() - 1;
    let (cols, _) = dz.level_tiles()[top];

    let mut expected_start = 0;
    for col in 0..cols {
        let geometry = dz.tile_geometry(top, (col, 0)).unwrap();
        assert_eq!(geometry.coordinates.location.0, expected_start);
        expected_start += geometry.level0_size.0 as i64;
    }
    assert_eq!(expected_start, 1000);
}

#[test]
fn test_concurrent_tile_requests() {
    let dz = Arc::new(
        DeepZoomGenerator::new(coordinate_slide(800, 600).with_native_levels(2), config(254, 1))
            .unwrap(),
    );
    let top = dz.level_count() - 1;
    let (cols, rows) = dz.level_tiles()[top];

    let expected: Vec<_> = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (col, row)))
        .map(|address| dz.get_tile(top, address).unwrap())
        .collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dz = Arc::clone(&dz);
            thread::spawn(move || {
                (0..rows)
                    .flat_map(|row| (0..cols).map(move |col| (col, row)))
                    .map(|address| dz.get_tile(top, address).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

// =============================================================================
// Bounds Limiting
// =============================================================================

#[test]
fn test_limit_bounds_restricts_pyramid() {
    let source = MockSlideSource::new(vec![(3000, 2500, 1.0), (750, 625, 4.0)])
        .with_bounds(BoundsBox::new(100, 200, 2000, 1500));
    let dz = DeepZoomGenerator::new(source, DeepZoomConfig::new(254, 1, true)).unwrap();

    assert_eq!(*dz.level_dimensions().last().unwrap(), (2000, 1500));
    assert_eq!(dz.native_levels()[1].width, 500);
    assert_eq!(dz.native_levels()[1].height, 375);
    assert!(dz.get_dzi("png").unwrap().contains("Width=\"2000\" Height=\"1500\""));

    let top = dz.level_count() - 1;
    assert_eq!(
        dz.get_tile_coordinates(top, (0, 0)).unwrap().location,
        (100, 200)
    );

    let coords = dz.get_tile_coordinates(9, (1, 0)).unwrap();
    assert_eq!(coords.location, (1112, 200));
    assert_eq!(coords.source_level, 1);
    assert_eq!(coords.size, (247, 255));
}

#[test]
fn test_limit_bounds_with_content_detection() {
    use image::{DynamicImage, Rgba, RgbaImage};

    let img = RgbaImage::from_fn(600, 400, |x, y| {
        if (100..400).contains(&x) && (50..300).contains(&y) {
            Rgba([0, 0, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let slide = dzi_pyramid::ImageSlide::new(DynamicImage::ImageRgba8(img));
    let bounds = slide.detect_bounds().unwrap();
    let dz = DeepZoomGenerator::new(
        slide.with_bounds(bounds),
        DeepZoomConfig::new(254, 1, true),
    )
    .unwrap();

    assert_eq!(*dz.level_dimensions().last().unwrap(), (300, 250));
    let tile = dz.get_tile(dz.level_count() - 1, (0, 0)).unwrap();
    assert_eq!(tile.get_pixel(0, 0), &Rgb([0, 0, 255]));
}

#[test]
fn test_transparent_area_uses_background() {
    use image::{DynamicImage, RgbaImage};

    let slide = dzi_pyramid::ImageSlide::new(DynamicImage::ImageRgba8(RgbaImage::new(64, 64)))
        .with_background(Rgb([0xF0, 0xE0, 0xD0]));
    let dz = DeepZoomGenerator::new(slide, config(254, 1)).unwrap();

    let tile = dz.get_tile(dz.level_count() - 1, (0, 0)).unwrap();
    assert_eq!(tile.get_pixel(10, 10), &Rgb([0xF0, 0xE0, 0xD0]));
}

// =============================================================================
// Error Handling
// =============================================================================

#[test]
fn test_address_out_of_range() {
    let dz = DeepZoomGenerator::new(MockSlideSource::svs_like(4096, 4096), config(254, 1)).unwrap();

    let err = dz.get_tile(13, (0, 0)).unwrap_err();
    assert!(matches!(
        err,
        DeepZoomError::InvalidLevel {
            level: 13,
            level_count: 13
        }
    ));

    let err = dz.get_tile_coordinates(12, (17, 0)).unwrap_err();
    assert!(matches!(
        err,
        DeepZoomError::AddressOutOfRange {
            level: 12,
            column: 17,
            row: 0,
            tiles_x: 17,
            tiles_y: 17
        }
    ));
    assert!(err.is_out_of_range());

    // Nothing was clamped into a source read
    assert_eq!(dz.source().read_count(), 0);
}

#[test]
fn test_source_error_propagates_unchanged() {
    let dz = DeepZoomGenerator::new(
        MockSlideSource::svs_like(4096, 4096).failing(),
        config(254, 1),
    )
    .unwrap();

    // Geometry never touches the source
    assert_eq!(dz.get_tile_dimensions(12, (0, 0)).unwrap(), (255, 255));
    assert_eq!(dz.source().read_count(), 0);

    let err = dz.get_tile(12, (0, 0)).unwrap_err();
    match err {
        DeepZoomError::Source(SourceError::Other(message)) => {
            assert_eq!(message, "simulated read failure");
        }
        other => panic!("Expected source error, got {other:?}"),
    }
    assert_eq!(dz.source().read_count(), 1);
}

#[test]
fn test_incomplete_source_metadata() {
    struct Broken;

    impl SlideSource for Broken {
        fn level_count(&self) -> usize {
            2
        }

        fn level_dimensions(&self, level: usize) -> Option<(u32, u32)> {
            (level == 0).then_some((100, 100))
        }

        fn level_downsample(&self, level: usize) -> Option<f64> {
            (level == 0).then_some(1.0)
        }

        fn read_region(
            &self,
            _location: (i64, i64),
            _level: usize,
            _size: (u32, u32),
        ) -> Result<image::RgbaImage, SourceError> {
            Err(SourceError::Other("unreachable".into()))
        }
    }

    let err = DeepZoomGenerator::new(Broken, config(254, 1)).unwrap_err();
    assert!(matches!(
        err,
        DeepZoomError::Source(SourceError::LevelOutOfRange { level: 1, .. })
    ));
}

#[test]
fn test_invalid_configuration() {
    let err = DeepZoomGenerator::new(coordinate_slide(10, 10), config(0, 1)).unwrap_err();
    assert!(matches!(err, DeepZoomError::Configuration(_)));

    let err = DeepZoomGenerator::new(coordinate_slide(10, 10), config(254, u32::MAX)).unwrap_err();
    assert!(matches!(err, DeepZoomError::Configuration(_)));
}
