use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use routemap::compose::canvas_origin;
use routemap::{
    async_trait, Basemap, ErrorKind, GeoPoint, RasterTileLoader, RenderArgs, RouteMapRenderer,
    TileIndex, TileLoadError,
};
use serde_json::json;

const LAND: Rgba<u8> = Rgba([242, 239, 233, 255]);

#[derive(Clone, Default)]
struct CountingLoader {
    calls: Arc<AtomicUsize>,
    fail_at: Option<u32>,
}

impl CountingLoader {
    fn failing_at(x: u32) -> Self {
        Self {
            fail_at: Some(x),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RasterTileLoader for CountingLoader {
    async fn load(&self, _basemap: Basemap, index: TileIndex) -> Result<RgbaImage, TileLoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(index.x) {
            return Err(TileLoadError::Status {
                url: format!("https://tiles.test/{index}.png"),
                status: 503,
            });
        }

        Ok(RgbaImage::from_pixel(256, 256, LAND))
    }
}

fn renderer(loader: &CountingLoader) -> RouteMapRenderer {
    let _ = env_logger::builder().is_test(true).try_init();

    RouteMapRenderer::builder()
        .with_loader(loader.clone())
        .build()
        .expect("renderer")
}

fn route() -> Vec<Vec<f64>> {
    vec![vec![-17.1, 28.1], vec![-17.2, 28.2]]
}

#[tokio::test]
async fn renders_default_sized_png() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("map.png");
    let loader = CountingLoader::default();

    let outcome = renderer(&loader)
        .render_route_map(&RenderArgs::new(route(), path.to_string_lossy()))
        .await
        .expect("rendered");

    assert!(outcome.success);
    assert!(outcome.path.is_absolute());
    assert!(loader.calls() > 0);

    let image = image::open(&outcome.path).expect("valid png").to_rgba8();
    assert_eq!(image.dimensions(), (800, 600));
    assert_eq!(image.get_pixel(0, 0), &LAND);
}

#[tokio::test]
async fn single_point_uses_highest_zoom() {
    let dir = tempfile::tempdir().expect("temp dir");
    let loader = CountingLoader::default();
    let renderer = renderer(&loader);

    let mut args = RenderArgs::new(vec![vec![0.0, 0.0]], dir.path().join("point.png").to_string_lossy());
    args.width = 400;
    args.height = 400;

    let request = args.validate(4096).expect("valid");
    assert_eq!(renderer.zoom_for(&request), 19);

    renderer.render_route_map(&args).await.expect("rendered");
}

#[tokio::test]
async fn invalid_arguments_do_not_touch_the_network() {
    let dir = tempfile::tempdir().expect("temp dir");
    let loader = CountingLoader::default();
    let renderer = renderer(&loader);
    let path = dir.path().join("map.png");

    let cases = [
        json!({ "coordinates": route(), "output_path": path, "basemap": "satellite" }),
        json!({ "coordinates": [], "output_path": path }),
        json!({ "coordinates": [[200.0, 0.0]], "output_path": path }),
        json!({ "coordinates": [[1.0, 2.0, 3.0]], "output_path": path }),
        json!({ "coordinates": route(), "output_path": path, "width": 0 }),
        json!({ "coordinates": route(), "output_path": path, "height": -5 }),
        json!({ "coordinates": route(), "output_path": path, "line_width": 1_000_000 }),
        json!({ "coordinates": route(), "output_path": path, "line_color": "not a color" }),
        json!({ "coordinates": route(), "output_path": path, "markers": [{ "label": "x" }] }),
        json!({ "coordinates": route() }),
    ];

    for args in cases {
        let err = renderer
            .render_route_map_json(args.clone())
            .await
            .expect_err("must be rejected");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{args}: {err}");
    }

    assert_eq!(loader.calls(), 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn marker_is_drawn_at_its_position() {
    let dir = tempfile::tempdir().expect("temp dir");
    let loader = CountingLoader::default();
    let renderer = renderer(&loader);

    let args = RenderArgs::from_json(json!({
        "coordinates": route(),
        "output_path": dir.path().join("marker.png"),
        "markers": [{ "lon": -17.15, "lat": 28.15, "label": "Camp" }],
        "line_color": "#0000ff",
    }))
    .expect("parsed");

    let outcome = renderer.render_route_map(&args).await.expect("rendered");
    let image = image::open(&outcome.path).expect("valid png").to_rgba8();

    let request = args.validate(4096).expect("valid");
    let zoom = renderer.zoom_for(&request);
    let (origin_x, origin_y) = canvas_origin(&request, zoom);
    let marker = routemap::to_pixel(GeoPoint::new(-17.15, 28.15), zoom);
    let x = (marker.x - origin_x as f64).round() as u32;
    let y = (marker.y - origin_y as f64).round() as u32;

    assert_eq!(image.get_pixel(x, y), &Rgba([255, 0, 0, 255]));
}

#[tokio::test]
async fn creates_output_directories() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("trips").join("2024").join("map.png");
    let loader = CountingLoader::default();

    let outcome = renderer(&loader)
        .render_route_map(&RenderArgs::new(route(), path.to_string_lossy()))
        .await
        .expect("rendered");

    assert_eq!(outcome.path, path.canonicalize().expect("exists"));
}

#[tokio::test]
async fn same_input_gives_identical_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("map.png");
    let loader = CountingLoader::default();
    let renderer = renderer(&loader);
    let args = RenderArgs::new(route(), path.to_string_lossy());

    renderer.render_route_map(&args).await.expect("first");
    let first = std::fs::read(&path).expect("read");
    renderer.render_route_map(&args).await.expect("second");
    let second = std::fs::read(&path).expect("read");

    assert_eq!(first, second);
}

#[tokio::test]
async fn tile_failure_leaves_no_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("map.png");

    let healthy = CountingLoader::default();
    let healthy_renderer = renderer(&healthy);
    let args = RenderArgs::new(route(), path.to_string_lossy());
    let request = args.validate(4096).expect("valid");
    let zoom = healthy_renderer.zoom_for(&request);
    let (origin_x, _) = canvas_origin(&request, zoom);
    let first_column = origin_x.div_euclid(256) as u32;

    let loader = CountingLoader::failing_at(first_column);
    let err = renderer(&loader)
        .render_route_map(&args)
        .await
        .expect_err("tile failure");

    assert_eq!(err.kind(), ErrorKind::TileFetchError);
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 0);
}

#[tokio::test]
async fn unwritable_output_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"").expect("write");
    let loader = CountingLoader::default();

    let err = renderer(&loader)
        .render_route_map(&RenderArgs::new(route(), blocker.join("map.png").to_string_lossy()))
        .await
        .expect_err("parent is a file");

    assert_eq!(err.kind(), ErrorKind::IOError);
}
