// tests/unit_tests.rs
use approx::assert_relative_eq;
use ndarray::{arr2, Array2, Array3};
use water_frequency::error::{Result, WaterError};
use water_frequency::geo::{resolve_window, Affine, BoundingBox, GdalReprojector, Reproject, Window};
use water_frequency::io::reader::{gdal_path, read_boundless};
use water_frequency::metadata::{parse_mtl_line, MtlMetadata, MtlValue};
use water_frequency::processing::frequency::{
    stack_scenes, valid_pixel_count, water_count, water_frequency, FrequencyAccumulator,
};
use water_frequency::processing::indices::{ndwi, IndexCalculator, NDWI};
use water_frequency::processing::mask::{apply_mask, valid_pixels, FILL_VALUE};
use water_frequency::processing::reflectance::{to_toa, Calibration};

const WEST: f64 = 204285.0;
const NORTH: f64 = 4268115.0;
const PIXEL: f64 = 30.0;

/// Reprojector for boxes already in the raster CRS
struct IdentityReprojector;

impl Reproject for IdentityReprojector {
    fn transform_points(&self, _from: &str, _to: &str, _points: &mut [(f64, f64)]) -> Result<()> {
        Ok(())
    }
}

/// Shifts every point, to check the resolver really goes through the reprojector
struct OffsetReprojector {
    dx: f64,
    dy: f64,
}

impl Reproject for OffsetReprojector {
    fn transform_points(&self, _from: &str, _to: &str, points: &mut [(f64, f64)]) -> Result<()> {
        for p in points.iter_mut() {
            p.0 += self.dx;
            p.1 += self.dy;
        }
        Ok(())
    }
}

fn scene_affine() -> Affine {
    Affine::from_origin(WEST, NORTH, PIXEL, PIXEL)
}

#[test]
fn test_geo_to_pixel() {
    let affine = scene_affine();
    let x = WEST + 10.0 * PIXEL;
    let y = NORTH - 20.0 * PIXEL;

    let (col, row) = affine.to_pixel(x, y).unwrap();
    assert_relative_eq!(col, 10.0);
    assert_relative_eq!(row, 20.0);
    assert_eq!(affine.rowcol(x, y).unwrap(), (10, 20));

    let (gx, gy) = affine.to_geo(col, row);
    assert_relative_eq!(gx, x);
    assert_relative_eq!(gy, y);
}

#[test]
fn test_gdal_geotransform_order() {
    let gt = [WEST, PIXEL, 0.0, NORTH, 0.0, -PIXEL];
    let affine = Affine::from_gdal(&gt);
    assert_eq!(affine, scene_affine());
    assert_eq!(affine.to_gdal(), gt);
}

#[test]
fn test_affine_for_window() {
    let affine = scene_affine();
    let shifted = affine.for_window(5, 7);
    assert_eq!(
        shifted.to_gdal(),
        [WEST + 5.0 * PIXEL, PIXEL, 0.0, NORTH - 7.0 * PIXEL, 0.0, -PIXEL]
    );
    // Pixel (0, 0) of the window is pixel (5, 7) of the scene
    assert_eq!(shifted.to_geo(0.0, 0.0), affine.to_geo(5.0, 7.0));

    // Negative offsets move the origin up and to the left
    let (x, y) = affine.for_window(-2, -1).to_geo(0.0, 0.0);
    assert_relative_eq!(x, WEST - 2.0 * PIXEL);
    assert_relative_eq!(y, NORTH + PIXEL);

    let rotated = Affine::new(2.0, 1.0, 100.0, -1.0, -3.0, 500.0).for_window(3, 4);
    assert_eq!((rotated.a, rotated.b, rotated.d, rotated.e), (2.0, 1.0, -1.0, -3.0));
    assert_eq!((rotated.c, rotated.f), (110.0, 485.0));
}

#[test]
fn test_degenerate_transform() {
    let affine = Affine::new(0.0, 0.0, WEST, 0.0, 0.0, NORTH);
    assert!(matches!(
        affine.to_pixel(WEST, NORTH),
        Err(WaterError::DegenerateTransform)
    ));
}

#[test]
fn test_rotated_transform_inverse() {
    let affine = Affine::new(2.0, 1.0, 100.0, -1.0, -3.0, 500.0);
    let (x, y) = affine.to_geo(7.25, 3.5);
    let (col, row) = affine.to_pixel(x, y).unwrap();
    assert_relative_eq!(col, 7.25, epsilon = 1e-9);
    assert_relative_eq!(row, 3.5, epsilon = 1e-9);
}

#[test]
fn test_window_for_pixel_aligned_bbox() {
    let rows = 40.0;
    let cols = 10.0;
    let bbox = BoundingBox::new(
        WEST,
        NORTH - rows * PIXEL,
        WEST + cols * PIXEL,
        NORTH,
        "EPSG:32628",
    );

    let window = resolve_window(&bbox, &scene_affine(), "EPSG:32628", &IdentityReprojector).unwrap();
    assert_eq!(window, Window::new(0, 0, 10, 40));
}

#[test]
fn test_window_origin_matches_inverse_transform() {
    let affine = scene_affine();
    let bbox = BoundingBox::new(WEST + 3100.0, NORTH - 9000.0, WEST + 6000.0, NORTH - 1210.0, "local");

    let window = resolve_window(&bbox, &affine, "local", &IdentityReprojector).unwrap();
    let (col, row) = affine.to_pixel(bbox.min_x, bbox.max_y).unwrap();
    assert_eq!(window.col_off, col.round() as i64);
    assert_eq!(window.row_off, row.round() as i64);
}

#[test]
fn test_window_rounds_half_to_even() {
    // Corners at 0.5 and 2.5 pixels on both axes.
    let bbox = BoundingBox::new(
        WEST + 0.5 * PIXEL,
        NORTH - 2.5 * PIXEL,
        WEST + 2.5 * PIXEL,
        NORTH - 0.5 * PIXEL,
        "local",
    );
    let window = resolve_window(&bbox, &scene_affine(), "local", &IdentityReprojector).unwrap();
    assert_eq!(window, Window::new(0, 0, 2, 2));

    // 1.5 and 3.5 round up to 2 and 4.
    let bbox = BoundingBox::new(
        WEST + 1.5 * PIXEL,
        NORTH - 3.5 * PIXEL,
        WEST + 3.5 * PIXEL,
        NORTH - 1.5 * PIXEL,
        "local",
    );
    let window = resolve_window(&bbox, &scene_affine(), "local", &IdentityReprojector).unwrap();
    assert_eq!(window, Window::new(2, 2, 2, 2));
}

#[test]
fn test_window_goes_through_reprojector() {
    let bbox = BoundingBox::new(0.0, -40.0 * PIXEL, 10.0 * PIXEL, 0.0, "shifted");
    let reprojector = OffsetReprojector { dx: WEST, dy: NORTH };

    let window = resolve_window(&bbox, &scene_affine(), "EPSG:32628", &reprojector).unwrap();
    assert_eq!(window, Window::new(0, 0, 10, 40));
}

#[test]
fn test_window_outside_raster_is_not_an_error() {
    let bbox = BoundingBox::new(
        WEST - 1000.0 * PIXEL,
        NORTH + 100.0 * PIXEL,
        WEST - 990.0 * PIXEL,
        NORTH + 120.0 * PIXEL,
        "local",
    );
    let window = resolve_window(&bbox, &scene_affine(), "local", &IdentityReprojector).unwrap();
    assert_eq!(window, Window::new(-1000, -120, 10, 20));
    assert!(window.intersection(7000, 7000).is_none());
}

#[test]
fn test_degenerate_bbox_gives_empty_window() {
    let bbox = BoundingBox::new(WEST + 10.0, NORTH - 10.0, WEST + 12.0, NORTH - 8.0, "local");
    let window = resolve_window(&bbox, &scene_affine(), "local", &IdentityReprojector).unwrap();
    assert!(window.is_empty());
    assert_eq!(window.shape(), (0, 0));
}

#[test]
fn test_window_utm_bbox_with_gdal() {
    let rows = 40.0;
    let cols = 10.0;
    let bbox = BoundingBox::new(
        WEST,
        NORTH - rows * PIXEL,
        WEST + cols * PIXEL,
        NORTH,
        "EPSG:32628",
    );

    let window = resolve_window(&bbox, &scene_affine(), "EPSG:32628", &GdalReprojector).unwrap();
    assert_eq!(window, Window::new(0, 0, 10, 40));
}

#[test]
fn test_window_geographic_bbox_with_gdal() {
    let affine = Affine::from_origin(206685.0, 1715415.0, PIXEL, PIXEL);
    let bbox = BoundingBox::new(-16.811, 13.627, -16.356, 14.14, "EPSG:4326");

    let window = resolve_window(&bbox, &affine, "EPSG:32628", &GdalReprojector).unwrap();
    assert_eq!(window, Window::new(3261, 5048, 1627, 1903));
}

#[test]
fn test_window_intersection() {
    let window = Window::new(-2, 3, 5, 4);
    assert_eq!(window.intersection(10, 5), Some(Window::new(0, 3, 3, 2)));
    assert_eq!(Window::new(8, 8, 4, 4).intersection(10, 10), Some(Window::new(8, 8, 2, 2)));
    assert_eq!(Window::new(0, 0, 0, 5).intersection(10, 10), None);
}

#[test]
fn test_read_boundless_fills_outside() {
    let raster = Array2::from_shape_fn((3, 3), |(r, c)| (r * 3 + c) as f64 + 1.0);
    let window = Window::new(-1, 1, 3, 3);

    let out = read_boundless(&window, (3, 3), FILL_VALUE, |inner| {
        let (r0, c0) = (inner.row_off as usize, inner.col_off as usize);
        let (rows, cols) = inner.shape();
        Ok(raster
            .slice(ndarray::s![r0..r0 + rows, c0..c0 + cols])
            .to_owned())
    })
    .unwrap();

    let expected = arr2(&[
        [FILL_VALUE, 4.0, 5.0],
        [FILL_VALUE, 7.0, 8.0],
        [FILL_VALUE, FILL_VALUE, FILL_VALUE],
    ]);
    assert_eq!(out, expected);
}

#[test]
fn test_gdal_path_for_remote_hrefs() {
    assert_eq!(
        gdal_path("https://landsat-pds.s3.amazonaws.com/c1/L8/B3.TIF"),
        "/vsicurl/https://landsat-pds.s3.amazonaws.com/c1/L8/B3.TIF"
    );
    assert_eq!(gdal_path("s3://bucket/scene/B7.TIF"), "/vsis3/bucket/scene/B7.TIF");
    assert_eq!(gdal_path("scenes/B3.TIF"), "scenes/B3.TIF");
}

#[test]
fn test_to_toa_with_nodata() {
    let raw = arr2(&[[f64::NAN, 10000.0], [0.0, f64::NAN]]);
    let toa = to_toa(&raw, -0.1, 2.0e-5);

    assert!(toa[[0, 0]].is_nan());
    assert!(toa[[1, 1]].is_nan());
    assert_relative_eq!(toa[[0, 1]], 0.1, epsilon = 1e-12);
    assert_relative_eq!(toa[[1, 0]], -0.1);

    let cal = Calibration { mult: 2.0e-5, add: -0.1 };
    let applied = cal.apply(&raw);
    assert_relative_eq!(applied[[0, 1]], toa[[0, 1]]);
}

#[test]
fn test_to_toa_all_nan_scene() {
    let raw = Array2::from_elem((100, 200), f64::NAN);
    let toa = to_toa(&raw, -0.1, 0.43656365691);
    assert!(toa.iter().all(|v| v.is_nan()));
}

#[test]
fn test_ndwi_known_values() {
    let green = arr2(&[[0.3, 0.2], [0.5, 0.0]]);
    let swir = arr2(&[[0.5, 0.2], [0.3, 0.0]]);
    let index = ndwi(&green, &swir);

    assert_relative_eq!(index[[0, 0]], -0.25, epsilon = 1e-12);
    assert_relative_eq!(index[[0, 1]], 0.0);
    assert_relative_eq!(index[[1, 0]], 0.25, epsilon = 1e-12);
    assert!(index[[1, 1]].is_nan()); // 0/0
}

#[test]
fn test_ndwi_zero_denominator_is_infinite() {
    let index = ndwi(&arr2(&[[0.1]]), &arr2(&[[-0.1]]));
    assert!(index[[0, 0]].is_infinite());
}

#[test]
fn test_ndwi_self_and_antisymmetry() {
    let a = arr2(&[[0.12, -0.4, 3.0], [7.5e-3, 0.9, 12.0]]);
    let b = arr2(&[[0.31, 0.05, 1.0], [0.2, 0.9, 4.5]]);

    assert!(ndwi(&a, &a).iter().all(|&v| v == 0.0));

    let ab = ndwi(&a, &b);
    let ba = ndwi(&b, &a);
    for (x, y) in ab.iter().zip(ba.iter()) {
        assert_eq!(*x, -*y);
    }
}

#[test]
fn test_ndwi_calculator() {
    let inputs = vec![arr2(&[[3000.0, 5000.0]]), arr2(&[[5000.0, 3000.0]])];
    let calc = NDWI::new(0, 1, None);
    let result = calc.calculate(&inputs);

    assert_relative_eq!(result[[0, 0]], -0.25);
    assert_relative_eq!(result[[0, 1]], 0.25);
    assert_eq!(calc.required_bands(), 2);
    assert_eq!(calc.name(), "NDWI");

    let swapped = NDWI::new(1, 0, Some("MNDWI".to_string()));
    assert_relative_eq!(swapped.calculate(&inputs)[[0, 0]], 0.25);
    assert_eq!(swapped.name(), "MNDWI");
}

#[test]
fn test_valid_pixels_and_mask() {
    let green = arr2(&[[FILL_VALUE, 8000.0, 0.0], [9000.0, 9000.0, f64::NAN]]);
    let swir = arr2(&[[7000.0, -3.0, 7000.0], [7000.0, FILL_VALUE, 7000.0]]);

    let valid = valid_pixels(&[&green, &swir], FILL_VALUE);
    assert_eq!(valid, arr2(&[[false, false, false], [true, false, false]]));

    let index = ndwi(&green, &swir);
    let masked = apply_mask(&index, &valid);
    assert!(masked[[0, 0]].is_nan());
    assert!(masked[[0, 1]].is_nan());
    assert!(masked[[0, 2]].is_nan());
    assert!(masked[[1, 2]].is_nan());
    assert_relative_eq!(masked[[1, 0]], 0.125);
}

#[test]
#[should_panic]
fn test_ndwi_shape_mismatch_panics() {
    ndwi(&Array2::zeros((2, 3)), &Array2::zeros((3, 2)));
}

#[test]
#[should_panic]
fn test_valid_pixels_shape_mismatch_panics() {
    let green = Array2::from_elem((2, 2), 100.0);
    let swir = Array2::from_elem((2, 3), 100.0);
    valid_pixels(&[&green, &swir], FILL_VALUE);
}

#[test]
#[should_panic]
fn test_apply_mask_shape_mismatch_panics() {
    apply_mask(&Array2::zeros((2, 2)), &Array2::from_elem((1, 4), true));
}

#[test]
fn test_valid_pixel_count() {
    let mut stack = Array3::from_elem((3, 4, 5), 0.1);
    stack[[0, 0, 0]] = f64::NAN;
    stack[[1, 0, 0]] = f64::NAN;
    stack[[2, 3, 4]] = f64::NAN;

    let count = valid_pixel_count(&stack);
    assert_eq!(count.dim(), (4, 5));
    assert_eq!(count[[0, 0]], 1);
    assert_eq!(count[[3, 4]], 2);
    assert_eq!(count[[1, 1]], 3);
}

#[test]
fn test_frequency_excludes_invalid_scenes() {
    let scenes = vec![
        arr2(&[[0.5, 0.1]]),
        arr2(&[[0.3, 0.4]]),
        arr2(&[[f64::NAN, f64::NAN]]),
    ];
    let stack = stack_scenes(&scenes).unwrap();

    assert_eq!(water_count(&stack, 0.3), arr2(&[[2u32, 1]]));
    let freq = water_frequency(&stack, 0.3);
    assert_relative_eq!(freq[[0, 0]], 1.0);
    assert_relative_eq!(freq[[0, 1]], 0.5);
}

#[test]
fn test_frequency_never_observed_is_nan() {
    let stack = Array3::from_elem((2, 2, 2), f64::NAN);
    let freq = water_frequency(&stack, 0.3);
    assert!(freq.iter().all(|v| v.is_nan()));
}

#[test]
fn test_stack_shape_mismatch() {
    let scenes = vec![Array2::<f64>::zeros((2, 3)), Array2::<f64>::zeros((3, 2))];
    assert!(matches!(
        stack_scenes(&scenes),
        Err(WaterError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_accumulator_matches_stack() {
    let scenes = vec![
        arr2(&[[0.5, -0.2, f64::NAN], [0.31, 0.29, 0.0]]),
        arr2(&[[f64::NAN, 0.6, f64::NAN], [0.1, 0.3, 0.9]]),
        arr2(&[[0.2, 0.7, f64::NAN], [0.8, f64::NAN, 0.35]]),
    ];

    let mut acc = FrequencyAccumulator::new((2, 3), 0.3);
    for scene in &scenes {
        acc.add_scene(scene).unwrap();
    }
    let stack = stack_scenes(&scenes).unwrap();

    assert_eq!(acc.scenes(), 3);
    assert_eq!(acc.valid_count(), &valid_pixel_count(&stack));
    assert_eq!(acc.water_count(), &water_count(&stack, 0.3));

    let expected = water_frequency(&stack, 0.3);
    for (a, b) in acc.frequency().iter().zip(expected.iter()) {
        assert!((a.is_nan() && b.is_nan()) || a == b);
    }
    assert!(acc.add_scene(&Array2::zeros((3, 3))).is_err());
}

#[test]
fn test_parse_mtl() {
    let metadata = [
        "REFLECTANCE_MULT_BAND_2 = 2.0000E-05\n",
        "REFLECTANCE_MULT_BAND_3 = 2.0000E-05\n",
        "REFLECTANCE_MULT_BAND_9 = 2.0000E-05\n",
        "REFLECTANCE_ADD_BAND_1 = -0.100000\n",
        "REFLECTANCE_ADD_BAND_3 = -0.100000\n",
        "END_GROUP = MIN_MAX_REFLECTANCE\n",
        "GROUP = MIN_MAX_PIXEL_VALUE\n",
        "QUANTIZE_CAL_MAX_BAND_1 = 65535\n",
        "    LANDSAT_SCENE_ID = \"LC82050502019195LGN00\"\n",
        "END\n",
    ];
    let parsed = MtlMetadata::parse(metadata);

    assert_eq!(parsed.numeric["REFLECTANCE_MULT_BAND_3"], 2.0e-05);
    assert_eq!(parsed.numeric["REFLECTANCE_ADD_BAND_1"], -0.1);
    assert_eq!(parsed.numeric["QUANTIZE_CAL_MAX_BAND_1"], 65535.0);
    assert_eq!(parsed.text["GROUP"], "MIN_MAX_PIXEL_VALUE");
    assert_eq!(parsed.text["LANDSAT_SCENE_ID"], "LC82050502019195LGN00");
    assert!(!parsed.numeric.contains_key("GROUP"));
    assert_eq!(parsed.numeric.len() + parsed.text.len(), 9);

    let cal = parsed.calibration(3).unwrap();
    assert_eq!(cal, Calibration { mult: 2.0e-05, add: -0.1 });
    assert!(matches!(
        parsed.calibration(7),
        Err(WaterError::MissingMetadata(key)) if key == "REFLECTANCE_MULT_BAND_7"
    ));
}

#[test]
fn test_parse_mtl_line() {
    assert_eq!(
        parse_mtl_line("REFLECTANCE_MULT_BAND_3 = 2.0000E-05"),
        Some(("REFLECTANCE_MULT_BAND_3".to_string(), MtlValue::Number(2.0e-05)))
    );
    assert_eq!(
        parse_mtl_line("GROUP = MIN_MAX_PIXEL_VALUE"),
        Some(("GROUP".to_string(), MtlValue::Text("MIN_MAX_PIXEL_VALUE".to_string())))
    );
    assert_eq!(parse_mtl_line("END"), None);
    assert_eq!(parse_mtl_line(""), None);
}
