//! Integration tests for pixops crates.
//!
//! End-to-end checks across decode, transform, controller and encode.

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pixops_core::{PixelBuffer, Point};
    use pixops_io::Format;
    use pixops_ops::filter::{self, EdgePolicy, Kernel};
    use pixops_ops::{crop, grayscale, parallel, resize};
    use pixops_ops::{Completion, ControllerConfig, Filter, Operation, PixelOperationsController, ScaleFactor};
    use tempfile::tempdir;

    /// Deterministic pseudo-random RGBA.
    fn noise(w: u32, h: u32, seed: u32) -> PixelBuffer {
        let mut s = seed | 1;
        PixelBuffer::from_fn(w, h, |_, _| {
            s ^= s << 13;
            s ^= s >> 17;
            s ^= s << 5;
            s.to_le_bytes()
        })
    }

    #[test]
    fn test_io_roundtrip_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");
        let image = noise(37, 23, 7);

        pixops_io::write(&path, &image).expect("Failed to write PNG");
        let loaded = pixops_io::read(&path).expect("Failed to read PNG");
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_io_roundtrip_jpeg_drops_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.jpg");
        let image = PixelBuffer::filled(24, 24, [90, 160, 220, 30]);

        pixops_io::write(&path, &image).expect("Failed to write JPEG");
        assert_eq!(Format::detect(&path).unwrap(), Format::Jpeg);
        let loaded = pixops_io::read(&path).expect("Failed to read JPEG");

        let px = loaded.get(12, 12).unwrap();
        assert_abs_diff_eq!(px[0] as f32, 90.0, epsilon = 6.0);
        assert_abs_diff_eq!(px[1] as f32, 160.0, epsilon = 6.0);
        assert_abs_diff_eq!(px[2] as f32, 220.0, epsilon = 6.0);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_grayscale_scenario_through_png() {
        let dir = tempdir().unwrap();
        let src = PixelBuffer::from_samples(
            2,
            2,
            vec![0, 0, 0, 255, 255, 255, 255, 255, 10, 20, 30, 255, 200, 100, 50, 255],
        )
        .unwrap();
        let path = dir.path().join("in.png");
        pixops_io::write(&path, &src).unwrap();

        let gray = grayscale::grayscale(&pixops_io::read(&path).unwrap());
        let out = dir.path().join(Operation::Grayscale.default_output_name());
        pixops_io::write(&out, &gray).unwrap();

        let back = pixops_io::read(&out).unwrap();
        let expected: Vec<[u8; 4]> = vec![[0, 0, 0, 255], [255, 255, 255, 255], [20, 20, 20, 255], [116, 116, 116, 255]];
        let got: Vec<[u8; 4]> = back.pixels().map(|(_, _, p)| p).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_sharpen_white_stays_white() {
        let white = PixelBuffer::filled(4, 4, [255, 255, 255, 255]);
        let out = Operation::Sharpen.apply(&white).unwrap();
        assert!(out.samples().iter().all(|&s| s == 255));
    }

    #[test]
    fn test_crop_scenario() {
        let src = noise(10, 10, 3);
        let out = crop::crop(&src, Point::new(7, 7), Point::new(3, 3)).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        for (x, y, px) in out.pixels() {
            assert_eq!(px, src.get(x + 3, y + 3).unwrap());
        }
    }

    #[test]
    fn test_identity_properties() {
        for seed in [1, 99, 12345] {
            let b = noise(19, 11, seed);
            let g = grayscale::grayscale(&b);
            assert_eq!(grayscale::grayscale(&g), g);
            assert_eq!(crop::crop(&b, Point::new(0, 0), Point::new(19, 11)).unwrap(), b);
            assert_eq!(resize::resample(&b, 1.0, Filter::Bilinear).unwrap(), b);

            let id = filter::convolve(&b, &Kernel::identity(3)).unwrap();
            for y in 1..10 {
                for x in 1..18 {
                    assert_eq!(id.get(x, y).unwrap(), b.get(x, y).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_parallel_equals_serial_large() {
        let src = noise(300, 200, 42);
        let k = Kernel::box_blur(5);
        assert_eq!(
            parallel::convolve_with(&src, &k, EdgePolicy::Clamp).unwrap(),
            filter::convolve_with(&src, &k, EdgePolicy::Clamp).unwrap()
        );
        assert_eq!(
            parallel::resample(&src, 1.37, Filter::Bilinear).unwrap(),
            resize::resample(&src, 1.37, Filter::Bilinear).unwrap()
        );
    }

    /// Full pipeline: decode -> controller edits -> encode.
    #[test]
    fn test_controller_pipeline() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("photo.png");
        pixops_io::write(&input, &noise(40, 30, 5)).unwrap();

        let mut ctl = PixelOperationsController::with_config(ControllerConfig { parallel_threshold: 100 });
        ctl.load(pixops_io::read(&input).unwrap());

        ctl.apply(Operation::Grayscale).unwrap();
        ctl.apply(Operation::Sharpen).unwrap();
        ctl.begin_selection(Point::new(30, 25)).unwrap();
        ctl.end_selection(Point::new(10, 5)).unwrap();
        assert_eq!(ctl.current().unwrap().dimensions(), (20, 20));

        let up = Operation::Resample {
            factor: ScaleFactor::new(1.5).unwrap(),
            filter: Filter::Nearest,
        };
        let out_name = up.default_output_name();
        let result = ctl.apply(up).unwrap();
        assert_eq!(result.dimensions(), (30, 30));

        let out = dir.path().join(out_name);
        pixops_io::write(&out, result).unwrap();
        assert_eq!(Format::detect(&out).unwrap(), Format::Jpeg);
        assert_eq!(pixops_io::read(&out).unwrap().dimensions(), (30, 30));
    }

    /// A slow operation finishing after a newer one must not overwrite it.
    #[test]
    fn test_controller_single_flight_across_threads() {
        let mut ctl = PixelOperationsController::new();
        ctl.load(noise(64, 64, 9));

        let slow = ctl.start(Operation::Convolve { kernel: Kernel::box_blur(7), edge: EdgePolicy::Clamp }).unwrap();
        let fast = ctl.start(Operation::Grayscale).unwrap();

        let slow_token = slow.token();
        let fast_token = fast.token();
        let slow_handle = std::thread::spawn(move || slow.run());
        let fast_handle = std::thread::spawn(move || fast.run());

        let fast_result = fast_handle.join().unwrap();
        let expected = fast_result.clone().unwrap();
        assert_eq!(ctl.complete(fast_token, fast_result).unwrap(), Completion::Committed);
        assert_eq!(ctl.complete(slow_token, slow_handle.join().unwrap()).unwrap(), Completion::Superseded);
        assert_eq!(ctl.current().unwrap(), &expected);
    }

    #[test]
    fn test_failed_operation_keeps_image() {
        let mut ctl = PixelOperationsController::new();
        ctl.load(noise(8, 8, 11));
        let before = ctl.current().unwrap().clone();

        assert!(ctl.apply(Operation::Crop { a: Point::new(2, 2), b: Point::new(2, 6) }).is_err());
        assert!(ctl.apply(Operation::Crop { a: Point::new(2, 2), b: Point::new(9, 6) }).is_err());
        assert_eq!(ctl.current().unwrap(), &before);

        // still usable afterwards
        ctl.apply(Operation::Grayscale).unwrap();
    }
}
