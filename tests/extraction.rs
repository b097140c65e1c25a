use chrono::{NaiveDate, NaiveDateTime};
use ndarray::{arr1, arr2, Array1, Array2, Array3, Array4, Array5};
use romsrs_reader::query::QueryError;
use romsrs_reader::reader::{
    CoordinateEcho, DepthEcho, ExtractionError, RomsReaderBuilderError,
};
use romsrs_reader::source::MemoryGridSource;
use romsrs_reader::{Query, RomsReader, RomsReaderBuilder};

const NROWS: usize = 10;
const NCOLS: usize = 10;
const NLAYERS: usize = 5;

fn synthetic_source() -> MemoryGridSource {
    let mut source = MemoryGridSource::new("synthetic");
    source
        .dimension("s_rho", NLAYERS)
        .dimension("eta_rho", NROWS)
        .dimension("xi_rho", NCOLS)
        .variable("lat_rho", Array2::from_elem((NROWS, NCOLS), 60.))
        .variable("lon_rho", Array2::from_elem((NROWS, NCOLS), 5.))
        .variable(
            "angle",
            Array2::from_shape_fn((NROWS, NCOLS), |(r, c)| ((10 * r + c) as f64).to_radians()),
        )
        .variable("h", Array2::from_elem((NROWS, NCOLS), 100.))
        .variable(
            "zeta",
            Array3::from_shape_fn((3, NROWS, NCOLS), |(t, r, c)| (1000 * t + 10 * r + c) as f64),
        )
        .variable(
            "temp",
            Array4::from_shape_fn((3, NLAYERS, NROWS, NCOLS), |(t, k, r, c)| {
                (1000 * t + 100 * k + 10 * r + c) as f64
            }),
        )
        .variable(
            "u",
            Array4::from_shape_fn((3, NLAYERS, NROWS, NCOLS - 1), |(t, k, r, c)| {
                -((1000 * t + 100 * k + 10 * r + c) as f64)
            }),
        )
        .variable(
            "mask_psi",
            Array2::from_shape_fn((NROWS - 1, NCOLS - 1), |(r, c)| {
                if (r, c) == (2, 3) {
                    0.
                } else {
                    1.
                }
            }),
        )
        .variable("ocean_time", arr1(&[0., 3600., 7200.]))
        .attribute("ocean_time", "units", "seconds since 2020-01-01 00:00:00");
    source
}

fn synthetic_reader(buffer: usize) -> RomsReader {
    romsrs_reader::_setup_pretty_env_logger_default();
    RomsReaderBuilder::default()
        .name("synthetic")
        .buffer(&buffer)
        .source(Box::new(synthetic_source()))
        .build()
        .unwrap()
}

fn at(hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

#[test]
fn test_surface_point() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["sea_water_temperature"], arr1(&[3.4]), arr1(&[2.7]));
    let extraction = reader.get_variables(&query).unwrap();
    assert_eq!(extraction.time, at(0, 0));
    let temp = extraction.points("sea_water_temperature").unwrap();
    assert_eq!(temp.data, arr2(&[[423.]]));
    assert_eq!(temp.mask, arr2(&[[false]]));
    assert_eq!(extraction.z, DepthEcho::Requested(arr1(&[0.])));
    assert_eq!(extraction.x, CoordinateEcho::Physical(arr1(&[2.])));
    assert_eq!(extraction.y, CoordinateEcho::Physical(arr1(&[1.])));
    assert!(!reader.grid().is_sea_floor_depth_cached());
}

#[test]
fn test_surface_height_point() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["sea_surface_height"], arr1(&[5.5]), arr1(&[4.2]));
    let extraction = reader.get_variables(&query).unwrap();
    let zeta = extraction.points("sea_surface_height").unwrap();
    assert_eq!(zeta.data, arr2(&[[45.]]));
    assert_eq!(zeta.mask, arr2(&[[false]]));
    assert_eq!(extraction.z, DepthEcho::Requested(arr1(&[0.])));
}

#[test]
fn test_nearest_time_is_used() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["sea_surface_height"], arr1(&[3.4]), arr1(&[2.7])).time(at(1, 50));
    let extraction = reader.get_variables(&query).unwrap();
    assert_eq!(extraction.time, at(2, 0));
    assert_eq!(
        extraction.points("sea_surface_height").unwrap().data,
        arr2(&[[2023.]])
    );
    assert_eq!(
        extraction.points("sea_surface_height").unwrap().mask,
        arr2(&[[false]])
    );
    assert_eq!(extraction.z, DepthEcho::Requested(arr1(&[0.])));
}

#[test]
fn test_mid_depth_spans_every_layer() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["sea_water_temperature"], arr1(&[3.4]), arr1(&[2.7])).z(arr1(&[-50.]));
    let extraction = reader.get_variables(&query).unwrap();
    let temp = extraction.points("sea_water_temperature").unwrap();
    assert_eq!(temp.data, arr2(&[[23.], [123.], [223.], [323.], [423.]]));
    match &extraction.z {
        DepthEcho::Profiles(z) => {
            assert_eq!(z.dim(), (5, 1));
            assert!(z[[0, 0]] < -50. && z[[4, 0]] > -50.);
        }
        other => panic!("Expected layer depths, got {:?}", other),
    }
    assert!(reader.grid().is_sea_floor_depth_cached());
}

#[test]
fn test_shallow_depth_reads_top_layers() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["sea_water_temperature"], arr1(&[3.4]), arr1(&[2.7])).z(arr1(&[-1.]));
    let extraction = reader.get_variables(&query).unwrap();
    let temp = extraction.points("sea_water_temperature").unwrap();
    assert_eq!(temp.data, arr2(&[[323.], [423.]]));
    match &extraction.z {
        DepthEcho::Profiles(z) => assert_eq!(z.dim(), (2, 1)),
        other => panic!("Expected layer depths, got {:?}", other),
    }
}

#[test]
fn test_deep_request_reads_bottom_layers() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["sea_water_temperature"], arr1(&[3.4]), arr1(&[2.7])).z(arr1(&[-99.]));
    let extraction = reader.get_variables(&query).unwrap();
    let temp = extraction.points("sea_water_temperature").unwrap();
    assert_eq!(temp.data, arr2(&[[23.], [123.], [223.]]));
}

#[test]
fn test_points_outside_domain_are_masked() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(
        &["sea_water_temperature", "sea_surface_height"],
        arr1(&[3.4, 12.0, -1.0]),
        arr1(&[2.7, 5.0, 5.0]),
    );
    let extraction = reader.get_variables(&query).unwrap();
    for name in ["sea_water_temperature", "sea_surface_height"] {
        let values = extraction.points(name).unwrap();
        assert_eq!(values.mask, arr2(&[[false, true, true]]));
        assert_eq!(values.get(0, 1), None);
        assert!(values.get(0, 0).is_some());
    }
    assert_eq!(extraction.x, CoordinateEcho::Physical(arr1(&[2., -1., -1.])));
    assert_eq!(extraction.y, CoordinateEcho::Physical(arr1(&[1., -1., -1.])));
}

#[test]
fn test_block_is_clipped_to_grid() {
    let mut reader = synthetic_reader(2);
    let query = Query::new(&["sea_water_temperature"], arr1(&[1.2, 2.5]), arr1(&[0.5, 1.5]))
        .block(true);
    let extraction = reader.get_variables(&query).unwrap();
    let temp = extraction.block("sea_water_temperature").unwrap();
    assert_eq!(temp.dim(), (1, 4, 5));
    assert_eq!(temp[[0, 0, 0]], 400.);
    assert_eq!(temp[[0, 3, 4]], 434.);
    assert_eq!(extraction.x, CoordinateEcho::Indices(vec![0, 1, 2, 3, 4]));
    assert_eq!(extraction.y, CoordinateEcho::Indices(vec![0, 1, 2, 3]));
    assert_eq!(extraction.angle_between_x_and_east.dim(), (5, 4));
}

#[test]
fn test_block_near_far_corner() {
    let mut reader = synthetic_reader(3);
    let query = Query::new(&["sea_surface_height"], arr1(&[8.9]), arr1(&[9.0])).block(true);
    let extraction = reader.get_variables(&query).unwrap();
    assert_eq!(extraction.x, CoordinateEcho::Indices(vec![5, 6, 7, 8, 9]));
    assert_eq!(extraction.y, CoordinateEcho::Indices(vec![6, 7, 8, 9]));
    let zeta = extraction.block("sea_surface_height").unwrap();
    assert_eq!(zeta[[0, 3, 4]], 99.);
}

#[test]
fn test_angle_is_in_degrees_and_indexed_column_first() {
    let mut reader = synthetic_reader(1);
    let query = Query::new(&["sea_surface_height"], arr1(&[4.0]), arr1(&[6.0])).block(true);
    let extraction = reader.get_variables(&query).unwrap();
    let angle = &extraction.angle_between_x_and_east;
    // columns 3..=5, rows 5..=7
    assert_eq!(angle.dim(), (3, 3));
    assert!((angle[[0, 2]] - 73.).abs() < 1e-9);
    assert!((angle[[2, 0]] - 55.).abs() < 1e-9);
}

#[test]
fn test_land_mask_is_inverted() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["land_binary_mask"], arr1(&[3.4, 0.2]), arr1(&[2.7, 0.2]));
    let extraction = reader.get_variables(&query).unwrap();
    assert_eq!(
        extraction.points("land_binary_mask").unwrap().data,
        arr2(&[[1., 0.]])
    );
}

#[test]
fn test_staggered_variable_indices_are_clamped() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["x_sea_water_velocity"], arr1(&[9.0]), arr1(&[2.0]));
    let extraction = reader.get_variables(&query).unwrap();
    assert_eq!(
        extraction.points("x_sea_water_velocity").unwrap().data,
        arr2(&[[-428.]])
    );
}

#[test]
fn test_single_depth_is_broadcast() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["sea_water_temperature"], arr1(&[1., 2.]), arr1(&[1., 2.]))
        .z(arr1(&[-1.]));
    let extraction = reader.get_variables(&query).unwrap();
    let temp = extraction.points("sea_water_temperature").unwrap();
    assert_eq!(temp.data, arr2(&[[311., 322.], [411., 422.]]));
}

#[test]
fn test_unsupported_rank() {
    let mut source = synthetic_source();
    source.variable("salt", Array5::<f64>::zeros((1, 1, NLAYERS, NROWS, NCOLS)));
    let mut reader = RomsReaderBuilder::default()
        .source(Box::new(source))
        .build()
        .unwrap();
    let query = Query::new(&["sea_water_salinity"], arr1(&[1.]), arr1(&[1.]));
    match reader.get_variables(&query) {
        Err(ExtractionError::UnsupportedDimensionality(name, ndim)) => {
            assert_eq!(name, "salt");
            assert_eq!(ndim, 5);
        }
        other => panic!("Expected an unsupported rank error, got {:?}", other),
    }
}

#[test]
fn test_unknown_variable() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["sea_water_salinity"], arr1(&[1.]), arr1(&[1.]));
    assert!(matches!(
        reader.get_variables(&query),
        Err(ExtractionError::QueryError(QueryError::UnknownVariable(_)))
    ));
}

#[test]
fn test_mismatched_depths() {
    let mut reader = synthetic_reader(0);
    let query = Query::new(&["sea_water_temperature"], arr1(&[1., 2., 3.]), arr1(&[1., 2., 3.]))
        .z(arr1(&[-1., -2.]));
    assert!(matches!(
        reader.get_variables(&query),
        Err(ExtractionError::QueryError(QueryError::LengthMismatch("z", 2, 3)))
    ));
}

#[test]
fn test_z_profiles_follow_sea_floor() {
    let mut reader = synthetic_reader(0);
    let profiles = reader
        .z_profiles(&arr1(&[1., 8.]), &Array1::from_elem(2, 4.))
        .unwrap();
    assert_eq!(profiles.nlayers(), NLAYERS);
    assert_eq!(profiles.ncolumns(), 2);
    let z = profiles.z_r();
    for k in 0..NLAYERS {
        assert!(z[[k, 0]] < 0. && z[[k, 0]] > -100.);
        assert_eq!(z[[k, 0]], z[[k, 1]]);
    }
}

#[test]
fn test_builder_requires_filename() {
    match RomsReaderBuilder::default().build() {
        Err(RomsReaderBuilderError::UninitializedFieldError(field)) => {
            assert_eq!(field, "filename")
        }
        Err(e) => panic!("Unexpected error: {}", e),
        Ok(_) => panic!("Built a reader without a dataset"),
    }
}

#[test]
fn test_reader_summary() {
    let reader = synthetic_reader(0);
    assert_eq!(reader.name(), "synthetic");
    assert_eq!(
        reader.variables(),
        vec![
            "land_binary_mask",
            "sea_floor_depth",
            "sea_surface_height",
            "sea_water_temperature",
            "x_sea_water_velocity",
        ]
    );
    let summary = format!("{}", reader);
    assert!(summary.contains("synthetic"));
}

#[cfg(not(feature = "netcdf"))]
#[test]
fn test_files_need_netcdf_support() {
    let path = std::path::Path::new("ocean_his.nc");
    match RomsReaderBuilder::default().filename(path).build() {
        Err(RomsReaderBuilderError::NetcdfSupportDisabled(name)) => {
            assert_eq!(name, "ocean_his.nc")
        }
        Err(e) => panic!("Unexpected error: {}", e),
        Ok(_) => panic!("Opened a file without netcdf support"),
    }
}
