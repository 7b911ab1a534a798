use approx::assert_abs_diff_eq;
use point_cloud_ingest::colour::elevation_colour;
use point_cloud_ingest::fixtures::{FixturePoint, LasBuilder};
use point_cloud_ingest::laz::{LaszipEngine, decompress};
use point_cloud_ingest::{LoadOptions, NoProgress, load_file, load_points, parse_header};
use std::io::Cursor;
use std::sync::Arc;

fn inline() -> LoadOptions {
    LoadOptions {
        use_worker: false,
        ..LoadOptions::default()
    }
}

/// 1000 points over a small patch with elevation running 0 to 10 m.
fn survey_patch(count: i32) -> Vec<FixturePoint> {
    (0..count)
        .map(|i| {
            let z = (f64::from(i) * 1000.0 / f64::from(count - 1)).round() as i32;
            FixturePoint::new([i * 10, (i * 7) % 500, z]).with_rgb([0, 0, 0])
        })
        .collect()
}

fn patch_builder() -> LasBuilder {
    LasBuilder::new(1, 2, 2)
        .scale([1e-7, 1e-7, 0.01])
        .offset([-122.4, 37.7, 0.0])
        .points(survey_patch(1000))
}

#[test]
fn black_points_follow_the_elevation_gradient() {
    let bytes = patch_builder().build();
    let cloud = load_points(&bytes, &inline(), &NoProgress).unwrap();

    assert_eq!(cloud.len(), 1000);
    assert_eq!(cloud.summary.total_points, 1000);
    assert_eq!(cloud.summary.step, 1);
    assert!(!cloud.has_colour);

    assert_eq!(&cloud.colours[0..3], &elevation_colour(0.0));
    assert_eq!(&cloud.colours[0..3], &[0.0, 0.0, 1.0]);
    assert_eq!(&cloud.colours[999 * 3..], &[1.0, 0.0, 0.0]);

    let bounds = cloud.summary.geodetic_bounds;
    assert_abs_diff_eq!(bounds.min_elevation, 0.0);
    assert_abs_diff_eq!(bounds.max_elevation, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(cloud.summary.extent.up_down, 10.0, epsilon = 1e-9);
}

#[test]
fn matches_independent_las_reader() {
    let bytes = patch_builder().build();
    let cloud = load_points(&bytes, &inline(), &NoProgress).unwrap();
    let center = cloud.summary.center;

    let mut reader = las::Reader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.header().number_of_points(), 1000);
    for (i, point) in reader.points().enumerate() {
        let point = point.unwrap();
        assert_abs_diff_eq!(
            cloud.positions[i * 3 + 2],
            (point.z - center[2]) as f32,
            epsilon = 1e-4
        );
    }
}

#[test]
fn decompressed_laz_decodes_like_the_plain_file() {
    let builder = patch_builder();
    let plain = load_points(&builder.build(), &inline(), &NoProgress).unwrap();
    let packed_bytes = builder.build_compressed();

    let restored = decompress(&packed_bytes, &LaszipEngine, &NoProgress).unwrap();
    assert_eq!(restored[104] & 0xC0, 0);
    let header = parse_header(&restored).unwrap();
    assert_eq!(header.point_count, 1000);

    let packed = load_points(&packed_bytes, &inline(), &NoProgress).unwrap();
    assert!(packed.summary.was_compressed);
    assert_eq!(packed.len(), plain.len());
    assert_eq!(packed.positions, plain.positions);
    assert_eq!(packed.colours, plain.colours);

    // the las crate reads the same coordinates from the compressed container
    let mut reader = las::Reader::new(Cursor::new(packed_bytes)).unwrap();
    let center = packed.summary.center;
    for (i, point) in reader.points().enumerate() {
        let point = point.unwrap();
        assert_abs_diff_eq!(
            point.z - center[2],
            f64::from(packed.positions[i * 3 + 2]),
            epsilon = 1e-4
        );
    }
}

#[test]
fn sixteen_bit_colour_is_normalised() {
    let bytes = LasBuilder::new(1, 2, 3)
        .points(vec![
            FixturePoint::new([0, 0, 0]).with_rgb([300, 0, 0]),
            FixturePoint::new([1, 1, 1]).with_rgb([65535, 65535, 0]),
        ])
        .build();
    let cloud = load_points(&bytes, &inline(), &NoProgress).unwrap();
    assert!(cloud.has_colour);
    assert_abs_diff_eq!(cloud.colours[0], 300.0 / 65535.0);
    assert_eq!(&cloud.colours[3..6], &[1.0, 1.0, 0.0]);
}

#[test]
fn oversized_files_are_strided() {
    let bytes = LasBuilder::new(1, 2, 0)
        .points((0..1001).map(|i| FixturePoint::new([i, i, i])).collect())
        .build();
    let options = LoadOptions {
        max_points: 100,
        ..inline()
    };
    let cloud = load_points(&bytes, &options, &NoProgress).unwrap();
    // step = ceil(1001 / 100) = 11, retained = ceil(1001 / 11) = 91
    assert_eq!(cloud.summary.step, 11);
    assert_eq!(cloud.len(), 91);
}

#[test]
fn las_1_4_uses_extended_count() {
    let bytes = LasBuilder::new(1, 4, 7)
        .points((0..20).map(|i| FixturePoint::new([i, i, i])).collect())
        .legacy_count(0)
        .build();
    let cloud = load_points(&bytes, &inline(), &NoProgress).unwrap();
    assert_eq!(cloud.header.point_count, 20);
    assert_eq!(cloud.len(), 20);
}

#[test]
fn loads_from_disk_on_a_worker() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), patch_builder().build_compressed()).unwrap();
    let cloud = load_file(file.path(), LoadOptions::default(), Arc::new(NoProgress)).unwrap();
    assert_eq!(cloud.len(), 1000);
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_file(
        std::path::Path::new("/definitely/not/here.laz"),
        LoadOptions::default(),
        Arc::new(NoProgress),
    );
    assert!(matches!(result, Err(point_cloud_ingest::IngestError::Io(_))));
}
