//! Frame sequencing
//!
//! Drives a video through estimation, rendering and writing, one frame pair
//! at a time:
//!
//! ```text
//! Start → Reading → Estimating → Rendering → Writing ─┐
//!            ↑                                        │
//!            └────────────────────────────────────────┘ → Done
//! ```
//!
//! Any error moves the sequencer to `Failed` and ends the run. Images
//! written before the failure stay on disk.

use crate::error::{Error, Result};
use crate::flow::{FlowEstimator, FlowField, FlowRenderer};
use crate::format::{frame_output_path, open_source, ImageWriter, OutputFormat, VideoSource};
use crate::util::ColorConverter;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Start,
    Reading,
    Estimating,
    Rendering,
    Writing,
    Done,
    Failed,
}

/// Sequencer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerConfig {
    /// Directory receiving the rendered images
    pub output_dir: PathBuf,
    /// Encoded image format
    pub output_format: OutputFormat,
    /// Repeat the last transition under the final frame index so that the
    /// number of images equals the number of frames
    pub pad_tail: bool,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            output_format: OutputFormat::Jpeg,
            pad_tail: true,
        }
    }
}

impl SequencerConfig {
    /// Create a configuration writing into `output_dir`
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Builder method: set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Builder method: set tail padding
    pub fn with_pad_tail(mut self, pad_tail: bool) -> Self {
        self.pad_tail = pad_tail;
        self
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Frames decoded from the source
    pub frames_read: usize,
    /// Paths written, in order
    pub outputs: Vec<PathBuf>,
    /// Wall-clock seconds spent in each estimator call
    pub estimate_seconds: Vec<f64>,
}

impl RunSummary {
    /// Number of images written
    pub fn images_written(&self) -> usize {
        self.outputs.len()
    }
}

/// Turns a video into one flow visualization per frame transition
pub struct FrameSequencer<'w> {
    estimator: Box<dyn FlowEstimator + 'w>,
    renderer: FlowRenderer<'w>,
    writer: Box<dyn ImageWriter + 'w>,
    converter: ColorConverter,
    config: SequencerConfig,
    state: SequencerState,
}

impl<'w> FrameSequencer<'w> {
    /// Create a sequencer from its collaborators
    pub fn new(
        estimator: Box<dyn FlowEstimator + 'w>,
        renderer: FlowRenderer<'w>,
        writer: Box<dyn ImageWriter + 'w>,
        config: SequencerConfig,
    ) -> Self {
        Self {
            estimator,
            renderer,
            writer,
            converter: ColorConverter::default(),
            config,
            state: SequencerState::Start,
        }
    }

    /// Current state
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Get the configuration
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Open the source at `path` and process it
    pub fn run_path(&mut self, path: &Path) -> Result<RunSummary> {
        let mut source = match open_source(path) {
            Ok(source) => source,
            Err(e) => {
                self.state = SequencerState::Failed;
                return Err(e);
            }
        };
        self.run(source.as_mut())
    }

    /// Process every frame pair of an opened source
    pub fn run(&mut self, source: &mut dyn VideoSource) -> Result<RunSummary> {
        let result = self.process(source);
        self.state = match result {
            Ok(_) => SequencerState::Done,
            Err(_) => SequencerState::Failed,
        };
        result
    }

    fn process(&mut self, source: &mut dyn VideoSource) -> Result<RunSummary> {
        let frame_count = source.frame_count();
        let (width, height) = source.dimensions();
        info!(
            "processing {} source: {} frames of {}x{} with {}",
            source.format_name(),
            frame_count,
            width,
            height,
            self.estimator.name()
        );

        let mut summary = RunSummary::default();

        self.state = SequencerState::Reading;
        let first = source.read_frame()?.ok_or(Error::EmptyFirstFrame)?;
        summary.frames_read += 1;
        let mut previous = self.converter.intensity(&first);

        fs::create_dir_all(&self.config.output_dir)?;

        let mut last_field: Option<FlowField> = None;
        for i in 0..frame_count.saturating_sub(1) {
            self.state = SequencerState::Reading;
            let frame = source
                .read_frame()?
                .ok_or(Error::PrematureEndOfStream { index: i + 1 })?;
            summary.frames_read += 1;
            let current = self.converter.intensity(&frame);

            self.state = SequencerState::Estimating;
            let start = Instant::now();
            let field = self.estimator.estimate(&previous, &current)?;
            let elapsed = start.elapsed().as_secs_f64();
            info!("estimated flow for frame {} in {:.3} sec", i, elapsed);
            summary.estimate_seconds.push(elapsed);

            let path = self.render_and_write(&field, i + 1)?;
            summary.outputs.push(path);

            previous = current;
            last_field = Some(field);
        }

        if self.config.pad_tail {
            if let Some(field) = last_field {
                debug!("repeating last transition as frame {}", frame_count);
                let path = self.render_and_write(&field, frame_count)?;
                summary.outputs.push(path);
            }
        }

        info!(
            "wrote {} images to {}",
            summary.images_written(),
            self.config.output_dir.display()
        );
        Ok(summary)
    }

    fn render_and_write(&mut self, field: &FlowField, index: usize) -> Result<PathBuf> {
        self.state = SequencerState::Rendering;
        let image = self.renderer.render(field);

        self.state = SequencerState::Writing;
        let path = frame_output_path(&self.config.output_dir, index, self.config.output_format);
        self.writer.write(&path, &image)?;
        debug!("wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowImage, RenderConfig};
    use crate::util::ColorWheel;
    use image::RgbImage;
    use ndarray::Array2;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Source declaring `declared` frames but holding only `frames`
    struct MemorySource {
        frames: Vec<RgbImage>,
        declared: usize,
    }

    impl MemorySource {
        fn new(frames: usize, declared: usize) -> Self {
            Self {
                frames: (0..frames)
                    .map(|i| RgbImage::from_pixel(4, 4, image::Rgb([i as u8 * 10; 3])))
                    .rev()
                    .collect(),
                declared,
            }
        }
    }

    impl VideoSource for MemorySource {
        fn format_name(&self) -> &str {
            "memory"
        }

        fn frame_count(&self) -> usize {
            self.declared
        }

        fn dimensions(&self) -> (u32, u32) {
            (4, 4)
        }

        fn read_frame(&mut self) -> Result<Option<RgbImage>> {
            Ok(self.frames.pop())
        }
    }

    /// Reports a constant rightward motion and counts its calls
    struct ConstantEstimator {
        calls: Rc<RefCell<usize>>,
    }

    impl FlowEstimator for ConstantEstimator {
        fn estimate(&mut self, previous: &Array2<f32>, _current: &Array2<f32>) -> Result<FlowField> {
            *self.calls.borrow_mut() += 1;
            let (h, w) = previous.dim();
            FlowField::from_planes(Array2::from_elem((h, w), 5.0), Array2::zeros((h, w)))
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    /// Keeps written images in memory
    #[derive(Default)]
    struct RecordingWriter {
        written: Rc<RefCell<Vec<(PathBuf, FlowImage)>>>,
    }

    impl ImageWriter for RecordingWriter {
        fn write(&mut self, path: &Path, image: &FlowImage) -> Result<()> {
            self.written
                .borrow_mut()
                .push((path.to_path_buf(), image.clone()));
            Ok(())
        }
    }

    struct Harness {
        calls: Rc<RefCell<usize>>,
        written: Rc<RefCell<Vec<(PathBuf, FlowImage)>>>,
        dir: tempfile::TempDir,
    }

    fn sequencer<'w>(
        wheel: &'w ColorWheel,
        pad_tail: bool,
    ) -> (FrameSequencer<'w>, Harness) {
        let harness = Harness {
            calls: Rc::new(RefCell::new(0)),
            written: Rc::new(RefCell::new(Vec::new())),
            dir: tempfile::TempDir::new().unwrap(),
        };
        let sequencer = FrameSequencer::new(
            Box::new(ConstantEstimator {
                calls: harness.calls.clone(),
            }),
            FlowRenderer::new(wheel, RenderConfig::default()),
            Box::new(RecordingWriter {
                written: harness.written.clone(),
            }),
            SequencerConfig::new(harness.dir.path()).with_pad_tail(pad_tail),
        );
        (sequencer, harness)
    }

    fn names(harness: &Harness) -> Vec<String> {
        harness
            .written
            .borrow()
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_padded_run_writes_one_image_per_frame() {
        let wheel = ColorWheel::new();
        let (mut seq, harness) = sequencer(&wheel, true);
        let mut source = MemorySource::new(4, 4);

        let summary = seq.run(&mut source).unwrap();
        assert_eq!(seq.state(), SequencerState::Done);
        assert_eq!(summary.frames_read, 4);
        assert_eq!(summary.images_written(), 4);
        assert_eq!(summary.estimate_seconds.len(), 3);
        assert_eq!(*harness.calls.borrow(), 3);
        assert_eq!(names(&harness), vec!["00001.jpg", "00002.jpg", "00003.jpg", "00004.jpg"]);

        let written = harness.written.borrow();
        assert_eq!(written[3].1, written[2].1);
    }

    #[test]
    fn test_unpadded_run_writes_one_image_per_transition() {
        let wheel = ColorWheel::new();
        let (mut seq, harness) = sequencer(&wheel, false);
        let mut source = MemorySource::new(3, 3);

        let summary = seq.run(&mut source).unwrap();
        assert_eq!(summary.images_written(), 2);
        assert_eq!(names(&harness), vec!["00001.jpg", "00002.jpg"]);
    }

    #[test]
    fn test_rendered_images_use_explicit_scale() {
        let wheel = ColorWheel::new();
        let (mut seq, harness) = sequencer(&wheel, false);
        let mut source = MemorySource::new(2, 2);
        seq.run(&mut source).unwrap();

        // (5, 0) over the default scale of 10 → half saturation of wheel red
        let written = harness.written.borrow();
        assert_eq!(written[0].1.pixel(0, 0), &[255, 127, 127, 255]);
    }

    #[test]
    fn test_single_frame_writes_nothing() {
        let wheel = ColorWheel::new();
        let (mut seq, harness) = sequencer(&wheel, true);
        let mut source = MemorySource::new(1, 1);

        let summary = seq.run(&mut source).unwrap();
        assert_eq!(summary.images_written(), 0);
        assert_eq!(*harness.calls.borrow(), 0);
    }

    #[test]
    fn test_empty_source_fails() {
        let wheel = ColorWheel::new();
        let (mut seq, harness) = sequencer(&wheel, true);
        let mut source = MemorySource::new(0, 0);

        let result = seq.run(&mut source);
        assert!(matches!(result, Err(Error::EmptyFirstFrame)));
        assert_eq!(seq.state(), SequencerState::Failed);
        assert!(harness.written.borrow().is_empty());
    }

    #[test]
    fn test_premature_end_keeps_earlier_output() {
        let wheel = ColorWheel::new();
        let (mut seq, harness) = sequencer(&wheel, true);
        let mut source = MemorySource::new(3, 5);

        let result = seq.run(&mut source);
        assert!(matches!(
            result,
            Err(Error::PrematureEndOfStream { index: 3 })
        ));
        assert_eq!(seq.state(), SequencerState::Failed);
        assert_eq!(names(&harness), vec!["00001.jpg", "00002.jpg"]);
    }

    #[test]
    fn test_unopenable_path_fails() {
        let wheel = ColorWheel::new();
        let (mut seq, _harness) = sequencer(&wheel, true);

        let result = seq.run_path(Path::new("/definitely/not/here.y4m"));
        assert!(matches!(result, Err(Error::SourceOpen(_))));
        assert_eq!(seq.state(), SequencerState::Failed);
    }

    #[test]
    fn test_sequencer_config_builder() {
        let config = SequencerConfig::new("out")
            .with_output_format(OutputFormat::Png)
            .with_pad_tail(false);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.output_format, OutputFormat::Png);
        assert!(!config.pad_tail);
        assert!(SequencerConfig::default().pad_tail);
    }
}
