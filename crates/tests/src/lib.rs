//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 → 传感器 → 采集循环 → 合成器的完整数据流
//! - 相机失败时整条管道的拆除
//! - 停止语义（join 之后不再读取）

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use contracts::{CompositeFrame, Frame, PipelineBlueprint, Resolution};
    use ingestion::{LifecycleController, SensorFeed};
    use sensors::{CaptureBackend, SensorFactory};

    pub const RES: Resolution = Resolution::new(64, 48);

    pub fn gray_frame() -> Frame {
        Frame::new(RES, vec![128u8; RES.area() * 3]).unwrap()
    }

    pub fn start(
        blueprint: &PipelineBlueprint,
        backend: Arc<dyn CaptureBackend>,
    ) -> (LifecycleController, Vec<SensorFeed>) {
        let sensors = SensorFactory::new(backend).build_all(blueprint).unwrap();
        LifecycleController::start(sensors).unwrap()
    }

    /// Overlay value of line `index`, parsed from `Sensor{i}:{value}`
    pub fn line_value(frame: &CompositeFrame, index: usize) -> u64 {
        let text = &frame.lines[index].text;
        let (_, value) = text.split_once(':').unwrap();
        value.parse().unwrap()
    }

    /// Number of ticks on which line `index` differs from the previous tick
    pub fn changes(frames: &[CompositeFrame], index: usize) -> usize {
        frames
            .windows(2)
            .filter(|w| line_value(&w[0], index) != line_value(&w[1], index))
            .count()
    }
}

#[cfg(test)]
mod contract_tests {
    use config_loader::ConfigLoader;
    use contracts::{PipelineBlueprint, Resolution};

    #[test]
    fn test_standard_blueprint_is_valid() {
        let blueprint = PipelineBlueprint::standard(0, Resolution::new(640, 480), 100);
        ConfigLoader::validate(&blueprint).unwrap();
    }

    #[test]
    fn test_standard_blueprint_round_trips_through_toml() {
        let blueprint = PipelineBlueprint::standard(3, Resolution::new(320, 240), 40);
        let toml = ConfigLoader::to_toml(&blueprint).unwrap();
        let loaded = ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml).unwrap();

        assert_eq!(loaded.sensors.len(), 4);
        assert_eq!(loaded.display.tick_delay_ms, 40);
        assert_eq!(loaded.camera().unwrap().kind, blueprint.camera().unwrap().kind);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use compositor::{
        Compositor, CompositorConfig, CompositorError, LogDisplay, RecordingDisplay,
        SnapshotDisplay, SnapshotDisplayConfig, StopReason, StopSignal,
    };
    use contracts::{PipelineBlueprint, Reading, SensorConfig};
    use ingestion::IngestionError;
    use sensors::{ScriptStep, ScriptedCapture, SyntheticCapture};

    use crate::support::{changes, gray_frame, line_value, start, RES};

    /// Generators at 10ms / 100ms / 1s plus a camera, five ticks at 100ms
    #[test]
    fn test_e2e_standard_pipeline_five_ticks() {
        let mut blueprint = PipelineBlueprint::standard(0, RES, 100);
        blueprint.display.max_ticks = Some(5);
        let capture = ScriptedCapture::repeating(gray_frame());
        let stats = capture.stats();

        let (mut controller, feeds) = start(&blueprint, Arc::new(capture));
        let mut compositor = Compositor::new(feeds, CompositorConfig::from_blueprint(&blueprint));
        let mut display = RecordingDisplay::new().with_tick_delay(blueprint.display.tick_delay());

        let report = compositor.run(&mut display, &controller).unwrap();
        let shutdown = controller.stop_all().unwrap();

        assert_eq!(report.ticks, 5);
        assert_eq!(report.stop_reason, StopReason::MaxTicks);
        let frames = display.frames();
        assert_eq!(frames.len(), 5);

        // three numeric lines, camera excluded
        assert!(frames.iter().all(|f| f.lines.len() == 3));
        assert!(frames.iter().all(|f| f.image.resolution() == RES));

        // fastest generator only moves forward and changes more than the slowest
        assert!(line_value(&frames[4], 0) >= line_value(&frames[0], 0));
        assert!(changes(frames, 0) > changes(frames, 2));

        // camera frame is the base image
        assert_eq!(frames[4].image.pixel(0, 0), Some([128, 128, 128]));
        assert_eq!(frames[4].image.pixel(63, 47), Some([255, 255, 255]));

        assert_eq!(shutdown.sensors.len(), 4);
        assert_eq!(stats.releases(), 1);
        assert_eq!(display.close_count(), 1);
    }

    #[test]
    fn test_e2e_first_tick_shows_zero_values() {
        let blueprint = PipelineBlueprint {
            sensors: vec![SensorConfig::numeric("slow", Duration::from_secs(2))],
            ..PipelineBlueprint::standard(0, RES, 10)
        };

        let (mut controller, feeds) = start(&blueprint, Arc::new(ScriptedCapture::unavailable()));
        let mut compositor = Compositor::new(feeds, CompositorConfig::from_blueprint(&blueprint));

        let frame = compositor.tick();
        assert_eq!(frame.lines[0].text, "Sensor0:0");
        // no camera configured: black canvas at the display resolution
        assert_eq!(frame.image.resolution(), RES);
        assert_eq!(frame.image.pixel(0, 0), Some([0, 0, 0]));

        controller.stop_all().unwrap();
    }

    #[test]
    fn test_e2e_camera_failure_tears_down_pipeline() {
        let blueprint = PipelineBlueprint::standard(0, RES, 10);
        // warm-up read succeeds, every read after that comes back empty
        let capture = ScriptedCapture::new(vec![ScriptStep::Frame(gray_frame())]);
        let stats = capture.stats();

        let (mut controller, feeds) = start(&blueprint, Arc::new(capture));
        let mut compositor = Compositor::new(feeds, CompositorConfig::from_blueprint(&blueprint));
        let mut display = RecordingDisplay::new().with_tick_delay(Duration::from_millis(10));

        let err = compositor.run(&mut display, &controller).unwrap_err();
        match err {
            CompositorError::SensorFailed { sensor_id, source } => {
                assert_eq!(sensor_id, "camera");
                assert!(source.is_fatal());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(display.close_count(), 1);

        let shutdown = controller.stop_all().unwrap_err();
        assert!(matches!(shutdown, IngestionError::Acquisition { .. }));
        assert_eq!(controller.running_count(), 0);

        // warm-up plus three attempts, then nothing
        assert_eq!(stats.reads(), 4);
        assert_eq!(stats.releases(), 1);
    }

    #[test]
    fn test_e2e_no_reads_after_stop() {
        let blueprint = PipelineBlueprint::standard(0, RES, 10);
        let capture = ScriptedCapture::repeating(gray_frame()).with_read_delay(Duration::from_millis(5));
        let stats = capture.stats();

        let (mut controller, feeds) = start(&blueprint, Arc::new(capture));
        let mut compositor = Compositor::new(feeds, CompositorConfig::from_blueprint(&blueprint));
        let mut display = RecordingDisplay::stop_after(3).with_tick_delay(Duration::from_millis(10));
        compositor.run(&mut display, &controller).unwrap();

        let shutdown = controller.stop_all().unwrap();
        let reads = stats.reads();
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(stats.reads(), reads);
        assert_eq!(stats.releases(), 1);
        assert_eq!(controller.snapshot(), shutdown.sensors);
        assert_eq!(controller.running_count(), 0);
    }

    #[test]
    fn test_e2e_cache_only_moves_forward() {
        let blueprint = PipelineBlueprint {
            sensors: vec![SensorConfig::numeric("fast", Duration::from_millis(1))],
            ..PipelineBlueprint::standard(0, RES, 1)
        };

        let (mut controller, feeds) = start(&blueprint, Arc::new(ScriptedCapture::unavailable()));
        let mut compositor = Compositor::new(feeds, CompositorConfig::from_blueprint(&blueprint));

        let mut last_seq = 0;
        let mut last_value = 0;
        for _ in 0..50 {
            compositor.tick();
            let entry = compositor.cache().get("fast").unwrap();
            assert!(entry.seq >= last_seq);
            let value = entry.reading.as_counter().unwrap();
            assert!(value >= last_value);
            last_seq = entry.seq;
            last_value = value;
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(last_seq > 0);

        controller.stop_all().unwrap();
    }

    #[test]
    fn test_e2e_snapshot_display_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = PipelineBlueprint::standard(0, RES, 10);
        blueprint.display.max_ticks = Some(3);

        let (mut controller, feeds) = start(&blueprint, Arc::new(SyntheticCapture::default()));
        let mut compositor = Compositor::new(feeds, CompositorConfig::from_blueprint(&blueprint));
        let config = SnapshotDisplayConfig {
            base_path: dir.path().to_path_buf(),
            every: 1,
            tick_delay: blueprint.display.tick_delay(),
        };
        let mut display = SnapshotDisplay::new(config, StopSignal::new()).unwrap();

        let report = compositor.run(&mut display, &controller).unwrap();
        controller.stop_all().unwrap();

        assert_eq!(report.ticks, 3);
        assert_eq!(display.written(), 3);
        for tick in 1..=3 {
            let image = image::open(dir.path().join(format!("{tick}.png")))
                .unwrap()
                .to_rgb8();
            assert_eq!(image.dimensions(), (RES.width, RES.height));
            assert!(dir.path().join(format!("{tick}.json")).exists());
        }
    }

    /// Stop signal raised from an async task, compositor on a blocking worker
    #[tokio::test]
    async fn test_e2e_stop_signal_from_async_task() {
        let blueprint = PipelineBlueprint::standard(0, RES, 20);
        let (controller, feeds) = start(&blueprint, Arc::new(SyntheticCapture::default()));
        let stop = StopSignal::new();

        let trigger = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            trigger.trigger();
        });

        let config = CompositorConfig::from_blueprint(&blueprint);
        let delay = blueprint.display.tick_delay();
        let (mut controller, outcome) = tokio::task::spawn_blocking(move || {
            let mut display = LogDisplay::new(delay, stop);
            let mut compositor = Compositor::new(feeds, config);
            let outcome = compositor.run(&mut display, &controller);
            (controller, outcome)
        })
        .await
        .unwrap();

        let report = outcome.unwrap();
        assert_eq!(report.stop_reason, StopReason::Requested);
        assert!(report.ticks >= 2);
        assert!(matches!(
            report.cache.get("camera").map(|e| &e.reading),
            Some(Reading::Frame(_))
        ));

        controller.stop_all().unwrap();
    }
}
