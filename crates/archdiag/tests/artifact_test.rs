use archdiag::render::raster::{RenderError, RenderOptions, render_to_file, write_artifact};
use archdiag::{DiagramConfig, IconCategory, OutputFormat, Scene, SceneBuilder};

fn small_scene() -> Scene {
    let mut b = SceneBuilder::new("Artifact Test");
    let user = b.node("User", IconCategory::User);
    let vm = b.cluster("Subnet", |s| s.node("VM", IconCategory::VmWindows));
    b.edge(user, vm).label("RDP");
    b.build().expect("valid scene")
}

fn png_size(bytes: &[u8]) -> (u32, u32) {
    let decoder = png::Decoder::new(bytes);
    let reader = decoder.read_info().expect("png header");
    let info = reader.info();
    (info.width, info.height)
}

#[test]
fn rendering_twice_rewrites_the_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = DiagramConfig::new("Artifact Test").with_filename("artifact");

    for _ in 0..2 {
        let path = render_to_file(&small_scene(), &config, dir.path()).expect("render ok");
        assert_eq!(path, dir.path().join("artifact.png"));
        let bytes = std::fs::read(&path).expect("read png");
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        let (w, h) = png_size(&bytes);
        assert!(w > 0 && h > 0);
    }
}

#[test]
fn extension_follows_the_output_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cases = [
        (OutputFormat::Png, "png", &b"\x89PNG"[..]),
        (OutputFormat::Jpg, "jpg", &b"\xFF\xD8"[..]),
        (OutputFormat::Svg, "svg", &b"<svg"[..]),
        (OutputFormat::Pdf, "pdf", &b"%PDF-"[..]),
        (OutputFormat::Dot, "dot", &b"digraph"[..]),
    ];
    for (format, ext, magic) in cases {
        let config = DiagramConfig::new("Artifact Test").with_format(format);
        let path = render_to_file(&small_scene(), &config, dir.path()).expect("render ok");
        assert_eq!(
            path.file_name().and_then(|s| s.to_str()),
            Some(format!("artifact_test.{ext}").as_str())
        );
        let bytes = std::fs::read(&path).expect("read artifact");
        assert!(bytes.starts_with(magic), "{ext} artifact has the wrong header");
    }
}

#[test]
fn scale_grows_the_raster() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = DiagramConfig::new("Artifact Test");
    let one = render_to_file(&small_scene(), &config, dir.path()).expect("render ok");
    let (w1, h1) = png_size(&std::fs::read(one).expect("read png"));

    let mut options = RenderOptions::default();
    options.raster.scale = 2.0;
    let two = write_artifact(&small_scene(), &config, dir.path(), &options).expect("render ok");
    let (w2, h2) = png_size(&std::fs::read(two).expect("read png"));
    assert!(w2 >= 2 * w1 - 1 && h2 >= 2 * h1 - 1);
}

#[test]
fn missing_output_directory_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("does-not-exist");
    let config = DiagramConfig::new("Artifact Test").with_format(OutputFormat::Svg);
    let err = render_to_file(&small_scene(), &config, &missing).unwrap_err();
    assert!(matches!(err, RenderError::Io { .. }), "{err}");
}

#[test]
fn invalid_scenes_fail_before_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut scene = small_scene();
    scene.edges[0].to = "ghost".to_string();
    let config = DiagramConfig::new("Artifact Test");
    let err = render_to_file(&scene, &config, dir.path()).unwrap_err();
    assert!(matches!(err, RenderError::Scene(_)), "{err}");
    assert!(!dir.path().join("artifact_test.png").exists());
}
