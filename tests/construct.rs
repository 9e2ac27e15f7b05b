mod support;

use support::*;
use terragear::{
    area_tolerance, construct_area, construct_tile, AreaType, Bucket, CancelToken, Clipper, ConstructConfig,
    OutputStyle, PolygonSet,
};

fn config_for(dir: &std::path::Path, buckets: &[Bucket]) -> ConstructConfig {
    ConstructConfig {
        work_base: dir.join("work"),
        output_base: dir.join("out"),
        buckets: buckets.iter().map(Bucket::gen_index).collect(),
        ..Default::default()
    }
}

#[test]
fn single_airport_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let bucket = Bucket::new(0.05, 0.05);
    let config = config_for(dir.path(), &[bucket]);

    write_dem(&config.work_base, &bucket, 5, 5, |_, _| 12.0);
    let apt = write_polys(&config.work_base, "apt", &bucket, "1", &[
        poly_record("AirportKeep", &rect_ring(0.03, 0.04, 0.08, 0.09)),
    ]);

    // clipping splits the bucket into airport and background
    let mut clipper = Clipper::new(config.sliver_area);
    clipper.load_polys(&apt).unwrap();
    clipper.clip_all(bucket.min_corner(), bucket.max_corner()).unwrap();
    let polys = clipper.polys_clipped();
    let present: Vec<_> = AreaType::order().into_iter().filter(|t| !polys.get(*t).is_empty()).collect();
    assert_eq!(present, [AreaType::AirportKeep, AreaType::Ocean]);
    let bucket_area = bucket.width() * bucket.height();
    assert!((polys.get(AreaType::AirportKeep)[0].set_area() - 0.05 * 0.05).abs() < area_tolerance(bucket_area));

    let summary = construct_area(&config, &CancelToken::new()).unwrap();
    assert!(summary.is_success(), "{summary}");
    assert_eq!(summary.succeeded.len(), 1);

    let report = &summary.succeeded[0];
    assert!(report.triangles >= 2);
    let text = read_text(&report.path);

    assert_eq!(lines_with(&text, "# gbs ").count(), 1);
    let vertices = lines_with(&text, "v ").count();
    assert!(vertices >= 4);
    assert_eq!(lines_with(&text, "vn ").count(), vertices);

    let faces: Vec<Vec<usize>> = lines_with(&text, "f ")
        .map(|l| l[2..].split_whitespace().map(|n| n.parse().unwrap()).collect())
        .collect();
    assert_eq!(faces.len(), report.triangles);
    assert!(faces.iter().flatten().all(|&n| n < vertices));
}

#[test]
fn tile_lands_at_bucket_path() {
    let dir = tempfile::tempdir().unwrap();
    let bucket = Bucket::new(-122.375, 37.6);
    let config = config_for(dir.path(), &[bucket]);
    write_dem(&config.work_base, &bucket, 3, 3, |c, r| (c + r) as f64);

    let report = construct_tile(&config, &bucket, &CancelToken::new()).unwrap();
    assert_eq!(report.path, config.output_base.join("Scenery/w130n30/w123n37/942050"));
}

#[test]
fn degenerate_polygon_fails_only_its_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let good = Bucket::new(0.05, 0.05);
    let bad = good.sibling(1, 0);
    let config = config_for(dir.path(), &[good, bad]);

    for b in [good, bad] {
        write_dem(&config.work_base, &b, 4, 4, |_, _| 0.0);
    }
    write_polys(&config.work_base, "hydro", &good, "1", &[
        poly_record("Lake", &rect_ring(0.01, 0.01, 0.05, 0.05)),
    ]);
    let (x, y) = (bad.center_lon(), bad.center_lat());
    write_polys(&config.work_base, "hydro", &bad, "1", &[
        poly_record("Lake", &rect_ring(x - 0.01, y - 0.01, x + 0.01, y + 0.01)),
        poly_record("Lake", &[(x, y), (x + 0.01, y)]),
    ]);

    let summary = construct_area(&config, &CancelToken::new()).unwrap();
    assert_eq!(summary.succeeded.len(), 1);
    assert_eq!(summary.succeeded[0].bucket, good);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, bad);
    assert_eq!(summary.failed[0].1.kind(), "format");
    assert!(!summary.is_success());

    let bad_tile = config.output_base.join("Scenery").join(bad.gen_base_path()).join(bad.gen_index_str());
    assert!(!bad_tile.exists());
}

#[test]
fn malformed_sources_fail_only_their_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let good = Bucket::new(0.05, 0.05);
    let bad: Vec<Bucket> = (1..=4).map(|i| good.sibling(i, 0)).collect();
    let mut all = vec![good];
    all.extend(&bad);
    let config = config_for(dir.path(), &all);

    for b in &all {
        write_dem(&config.work_base, b, 4, 4, |_, _| 5.0);
    }
    write_polys(&config.work_base, "hydro", &good, "1", &[
        poly_record("Lake", &rect_ring(0.01, 0.01, 0.05, 0.05)),
    ]);

    // a contour count no file could hold
    write_polys(&config.work_base, "hydro", &bad[0], "1", &["Lake\n18446744073709551615\n".to_string()]);

    // a DEM claiming more samples than memory can address
    let dem = source_dir(&config.work_base, "dem", &bad[1]).join(format!("{}.arr", bad[1].gen_index()));
    std::fs::write(&dem, "0 0\n4294967296 30\n4294967296 30\n1 2 3 4\n").unwrap();

    // a NaN vertex in an otherwise valid polygon
    let (x, y) = (bad[2].center_lon(), bad[2].center_lat());
    write_polys(&config.work_base, "hydro", &bad[2], "1", &[
        format!("Lake\n1\n4 0\n{x} {y}\nNaN {y}\n{x} {}\n{} {}\n", y + 0.01, x + 0.01, y + 0.01),
    ]);

    // a NaN elevation sample
    write_dem(&config.work_base, &bad[3], 4, 4, |c, r| if (c, r) == (2, 1) { f64::NAN } else { 0.0 });

    let summary = construct_area(&config, &CancelToken::new()).unwrap();
    assert_eq!(summary.total(), 5);
    assert_eq!(summary.succeeded.len(), 1, "{summary}");
    assert_eq!(summary.succeeded[0].bucket, good);

    let mut failed: Vec<Bucket> = summary.failed.iter().map(|(b, _)| *b).collect();
    failed.sort_by_key(Bucket::gen_index);
    let mut expected = bad.clone();
    expected.sort_by_key(Bucket::gen_index);
    assert_eq!(failed, expected);
    for (b, err) in &summary.failed {
        assert_eq!(err.kind(), "format", "bucket {b}: {err}");
    }
}

#[test]
fn unknown_feature_type_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let bucket = Bucket::new(0.05, 0.05);
    let config = config_for(dir.path(), &[bucket]);
    write_dem(&config.work_base, &bucket, 4, 4, |_, _| 0.0);
    write_polys(&config.work_base, "landuse", &bucket, "1", &[
        poly_record("Swamp", &rect_ring(0.01, 0.01, 0.05, 0.05)),
        poly_record("Urban", &rect_ring(0.06, 0.06, 0.1, 0.1)),
    ]);

    let summary = construct_area(&config, &CancelToken::new()).unwrap();
    assert!(summary.is_success(), "{summary}");
}

#[test]
fn missing_dem_fails_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let bucket = Bucket::new(0.05, 0.05);
    let summary = construct_area(&config_for(dir.path(), &[bucket]), &CancelToken::new()).unwrap();
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].1.kind(), "io");
}

#[test]
fn cancelled_batch_skips_everything() {
    let dir = tempfile::tempdir().unwrap();
    let bucket = Bucket::new(0.05, 0.05);
    let config = config_for(dir.path(), &[bucket, bucket.sibling(0, 1)]);

    let cancel = CancelToken::new();
    cancel.cancel();
    let summary = construct_area(&config, &cancel).unwrap();
    assert_eq!(summary.skipped.len(), 2);
    assert!(summary.is_success());
}

#[test]
fn bounds_cover_a_block_of_buckets() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path(), &[]);
    config.bounds = Some([0.0, 0.0, 0.25, 0.25]);
    config.style = OutputStyle::Fans;
    config.gzip = true;

    let buckets = Bucket::covering(config.bounds_rect().unwrap());
    assert_eq!(buckets.len(), 4);
    for b in &buckets {
        write_dem(&config.work_base, b, 6, 6, |c, r| (c * r) as f64);
    }

    let summary = construct_area(&config, &CancelToken::new()).unwrap();
    assert_eq!(summary.succeeded.len(), 4, "{summary}");
    for report in &summary.succeeded {
        assert_eq!(report.path.extension().unwrap(), "gz");
        let text = read_text(&report.path);
        assert!(text.contains("# usemtl Ocean"));
        assert!(lines_with(&text, "tf ").count() >= 1);
    }

    // output tree holds exactly the four tiles
    let count = walkdir::WalkDir::new(&config.output_base).into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .count();
    assert_eq!(count, 4);
}
