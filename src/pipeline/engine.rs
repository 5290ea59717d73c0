use std::path::PathBuf;
use tracing::{info, debug, warn};

use crate::{
    assets::{newest_asset, MediaAsset, MediaKind},
    config::Config,
    crossfade::{plan, CrossfadeGraphBuilder, CrossfadePlan, FilterGraph, ShortClipGraphBuilder, StreamFormat},
    error::Result,
    probe::DurationProbe,
    render::{Codecs, RenderInput, RenderInvoker, RenderJob, StagedOutput},
};

/// Main engine that builds both renders from the newest input assets
///
/// The engine follows a strict sequence; the first failure stops the run:
/// 1. Asset Selection - newest video and audio file
/// 2. Duration Probing - clip lengths
/// 3. Crossfade Planning - loop seam timing
/// 4. Graph Construction - short clip and loop graphs
/// 5. Short Render - vertical clip
/// 6. Long Render - one seamless loop unit, then looped to full length
pub struct AmbientEngine {
    config: Config,
    probe: Box<dyn DurationProbe>,
    invoker: Box<dyn RenderInvoker>,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub short_output: PathBuf,
    pub long_output: PathBuf,
    pub video: MediaAsset,
    pub audio: MediaAsset,
    pub plan: CrossfadePlan,
}

/// Graphs built before any render starts
struct RenderGraphs {
    short: FilterGraph,
    crossfade: FilterGraph,
}

impl AmbientEngine {
    /// Create a new engine with the given configuration and collaborators
    pub fn new(
        config: Config,
        probe: Box<dyn DurationProbe>,
        invoker: Box<dyn RenderInvoker>,
    ) -> Self {
        Self { config, probe, invoker }
    }

    /// Run the whole build
    pub fn run(&self) -> Result<BuildReport> {
        info!("🎬 Starting ambient build");
        self.config.validate()?;

        // Step 1: Asset Selection
        let (video, audio) = self.select_assets()?;

        // Step 2: Duration Probing
        let (video, audio) = self.probe_assets(&video, &audio)?;

        // Step 3: Crossfade Planning
        let clip_duration = video.duration.unwrap_or_default();
        let plan = self.plan_crossfade(clip_duration)?;

        // Step 4: Graph Construction
        let graphs = self.build_graphs(&plan)?;
        self.invoker.ensure_available()?;

        // Step 5: Short Render
        let short_output = self.render_short(&video, &audio, graphs.short)?;

        // Step 6: Long Render
        let long_output = self.render_long(&video, &audio, &plan, graphs.crossfade)?;

        info!("🎉 Build complete");
        info!("   Short: {:?}", short_output);
        info!("   Long:  {:?}", long_output);

        Ok(BuildReport {
            short_output,
            long_output,
            video,
            audio,
            plan,
        })
    }

    // ==========================================
    // STEP 1: ASSET SELECTION
    // ==========================================

    fn select_assets(&self) -> Result<(MediaAsset, MediaAsset)> {
        info!("📁 Step 1: Selecting newest assets...");

        let video = newest_asset(&self.config.paths.video_dir, MediaKind::Video)?;
        let audio = newest_asset(&self.config.paths.audio_dir, MediaKind::Audio)?;

        Ok((video, audio))
    }

    // ==========================================
    // STEP 2: DURATION PROBING
    // ==========================================

    fn probe_assets(&self, video: &MediaAsset, audio: &MediaAsset) -> Result<(MediaAsset, MediaAsset)> {
        info!("🔎 Step 2: Probing durations...");

        let video = video.with_duration(self.probe.probe_duration(video.path())?);
        let audio = audio.with_duration(self.probe.probe_duration(audio.path())?);

        let video_duration = video.duration.unwrap_or_default();
        let audio_duration = audio.duration.unwrap_or_default();
        info!("   Video: {:.2}s", video_duration);
        info!("   Audio: {:.2}s", audio_duration);

        if audio_duration < video_duration {
            debug!("Audio is shorter than the video clip and will repeat within each loop");
        }

        Ok((video, audio))
    }

    // ==========================================
    // STEP 3: CROSSFADE PLANNING
    // ==========================================

    fn plan_crossfade(&self, clip_duration: f64) -> Result<CrossfadePlan> {
        info!("⏱️  Step 3: Planning loop crossfade...");

        let plan = plan(clip_duration, self.config.long.crossfade())?;

        info!("   Clip: {:.3}s, crossfade: {:.3}s, offset: {:.3}s",
              plan.clip_duration(), plan.crossfade_duration(), plan.offset());
        Ok(plan)
    }

    // ==========================================
    // STEP 4: GRAPH CONSTRUCTION
    // ==========================================

    fn build_graphs(&self, plan: &CrossfadePlan) -> Result<RenderGraphs> {
        info!("🧩 Step 4: Building filter graphs...");

        let format = StreamFormat::from(&self.config.encoding);
        let short = ShortClipGraphBuilder::new(format.clone(), &self.config.short).build()?;
        let crossfade = CrossfadeGraphBuilder::new(format).build(plan)?;

        debug!("Short graph has {} chains, loop graph has {} chains",
               short.chains().len(), crossfade.chains().len());
        Ok(RenderGraphs { short, crossfade })
    }

    // ==========================================
    // STEP 5: SHORT RENDER
    // ==========================================

    fn render_short(&self, video: &MediaAsset, audio: &MediaAsset, graph: FilterGraph) -> Result<PathBuf> {
        info!("📱 Step 5: Rendering {:.0}s vertical clip...", self.config.short.duration);

        let encoding = &self.config.encoding;
        let stage = StagedOutput::new(&self.config.paths.short_output)?;

        let job = RenderJob::new(stage.path(), Codecs::from(encoding), &encoding.container)
            .input(RenderInput::looped(video.path()))
            .input(RenderInput::looped(audio.path()))
            .graph(graph)
            .duration(self.config.short.duration);
        self.invoker.invoke(&job)?;

        let output = stage.commit()?;
        info!("   ✅ Short clip saved: {:?}", output);
        Ok(output)
    }

    // ==========================================
    // STEP 6: LONG RENDER
    // ==========================================

    fn render_long(
        &self,
        video: &MediaAsset,
        audio: &MediaAsset,
        plan: &CrossfadePlan,
        graph: FilterGraph,
    ) -> Result<PathBuf> {
        let target = self.config.long.duration;
        info!("🌊 Step 6: Rendering {:.0}s looped video...", target);

        if target < plan.loop_duration() {
            warn!("Target duration {:.1}s is shorter than one loop ({:.1}s)", target, plan.loop_duration());
        }

        let encoding = &self.config.encoding;
        let stage = StagedOutput::new(&self.config.paths.long_output)?;
        let unit_path = stage.scratch("loop_unit");

        // Pass 1: one loop unit, starting and ending on the same source frame
        let unit = RenderJob::new(&unit_path, Codecs::from(encoding), &encoding.container)
            .input(RenderInput::looped(video.path()))
            .input(RenderInput::looped(audio.path()))
            .graph(graph)
            .duration(plan.loop_duration());
        self.invoker.invoke(&unit)?;
        debug!("Loop unit rendered to {:?}", unit_path);

        // Pass 2: repeat the whole unit and cut to length
        let iterations = (target / plan.loop_duration()).ceil();
        info!("   Looping unit {:.0} times", iterations);

        let looped = RenderJob::new(stage.path(), Codecs::Copy, &encoding.container)
            .input(RenderInput::looped(&unit_path))
            .map("0:v")
            .map("0:a")
            .duration(target);
        self.invoker.invoke(&looped)?;

        let output = stage.commit()?;
        info!("   ✅ Long video saved: {:?}", output);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    use crate::error::{AmbientError, AssetError, ConfigError, PlanError, ProbeError, RenderError};

    /// Probe answering from a fixed table keyed by file name
    struct MockProbe {
        durations: HashMap<String, f64>,
    }

    impl DurationProbe for MockProbe {
        fn probe_duration(&self, path: &Path) -> std::result::Result<f64, ProbeError> {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            match self.durations.get(&name) {
                Some(duration) if *duration > 0.0 => Ok(*duration),
                _ => Err(ProbeError::NoDuration { path: path.display().to_string() }),
            }
        }
    }

    /// Invoker that records jobs and writes a placeholder output file
    #[derive(Clone, Default)]
    struct RecordingInvoker {
        jobs: Rc<RefCell<Vec<RenderJob>>>,
        fail_on_call: Option<usize>,
    }

    impl RenderInvoker for RecordingInvoker {
        fn invoke(&self, job: &RenderJob) -> std::result::Result<(), RenderError> {
            let call = self.jobs.borrow().len();
            self.jobs.borrow_mut().push(job.clone());

            if self.fail_on_call == Some(call) {
                std::fs::write(job.output_path(), b"partial").unwrap();
                return Err(RenderError::EngineFailed {
                    status: "exit status: 1".to_string(),
                    stderr: "simulated failure".to_string(),
                });
            }

            std::fs::write(job.output_path(), b"rendered").unwrap();
            Ok(())
        }
    }

    struct Fixture {
        root: TempDir,
        config: Config,
    }

    fn fixture() -> Fixture {
        let root = tempdir().unwrap();
        let mut config = Config::default();
        config.paths.video_dir = root.path().join("assets/Video_raw");
        config.paths.audio_dir = root.path().join("assets/audio_raw");
        config.paths.short_output = root.path().join("Output/shorts/short_final.mp4");
        config.paths.long_output = root.path().join("Output/longform/long_ambient_90min.mp4");

        std::fs::create_dir_all(&config.paths.video_dir).unwrap();
        std::fs::create_dir_all(&config.paths.audio_dir).unwrap();
        std::fs::write(config.paths.video_dir.join("waves.mp4"), b"video").unwrap();
        std::fs::write(config.paths.audio_dir.join("rain.wav"), b"audio").unwrap();

        Fixture { root, config }
    }

    fn probe(video: f64, audio: f64) -> Box<MockProbe> {
        Box::new(MockProbe {
            durations: HashMap::from([
                ("waves.mp4".to_string(), video),
                ("rain.wav".to_string(), audio),
            ]),
        })
    }

    #[test]
    fn test_full_build() {
        let fixture = fixture();
        let invoker = RecordingInvoker::default();
        let engine = AmbientEngine::new(fixture.config.clone(), probe(60.0, 300.0), Box::new(invoker.clone()));

        let report = engine.run().unwrap();

        assert_eq!(report.plan.offset(), 59.0);
        assert_eq!(report.video.duration, Some(60.0));
        assert_eq!(report.audio.duration, Some(300.0));
        assert_eq!(report.short_output, fixture.config.paths.short_output);
        assert_eq!(std::fs::read(&report.short_output).unwrap(), b"rendered");
        assert_eq!(std::fs::read(&report.long_output).unwrap(), b"rendered");

        let jobs = invoker.jobs.borrow();
        assert_eq!(jobs.len(), 3);

        // Short render first
        assert_eq!(jobs[0].duration, Some(10.0));
        assert!(jobs[0].inputs.iter().all(|input| input.loop_forever));
        assert_eq!(jobs[0].maps, vec!["[vout]", "[aout]"]);

        // Loop unit carries the crossfade graph and drops the leading crossfade
        assert_eq!(jobs[1].duration, Some(59.0));
        let unit_graph = jobs[1].graph.as_ref().unwrap();
        assert!(unit_graph.chains().iter().any(|c| c.filters().iter().any(|f| f.name() == "blend")));

        // Final pass loops the unit without re-encoding
        assert_eq!(jobs[2].codecs, Codecs::Copy);
        assert_eq!(jobs[2].duration, Some(5400.0));
        assert_eq!(jobs[2].inputs, vec![RenderInput::looped(jobs[1].output_path())]);
        assert!(jobs[2].graph.is_none());

        // Staging directories are gone
        let long_dir = fixture.root.path().join("Output/longform");
        assert_eq!(std::fs::read_dir(long_dir).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_video_directory() {
        let fixture = fixture();
        let mut config = fixture.config.clone();
        config.paths.video_dir = fixture.root.path().join("missing");

        let invoker = RecordingInvoker::default();
        let engine = AmbientEngine::new(config, probe(60.0, 60.0), Box::new(invoker.clone()));

        let result = engine.run();
        assert!(matches!(result, Err(AmbientError::Asset(AssetError::MissingInputDirectory { .. }))));
        assert!(invoker.jobs.borrow().is_empty());
    }

    #[test]
    fn test_unequal_crossfades_rejected_before_any_work() {
        let fixture = fixture();
        let mut config = fixture.config.clone();
        config.long.audio_crossfade = 3.0;

        let invoker = RecordingInvoker::default();
        let engine = AmbientEngine::new(config, probe(60.0, 60.0), Box::new(invoker.clone()));

        let result = engine.run();
        assert!(matches!(result, Err(AmbientError::Config(ConfigError::InvalidValue { .. }))));
        assert!(invoker.jobs.borrow().is_empty());
        assert!(!fixture.config.paths.short_output.exists());
    }

    #[test]
    fn test_zero_duration_halts_before_render() {
        let fixture = fixture();
        let invoker = RecordingInvoker::default();
        let engine = AmbientEngine::new(fixture.config.clone(), probe(0.0, 60.0), Box::new(invoker.clone()));

        let result = engine.run();
        assert!(matches!(result, Err(AmbientError::Probe(ProbeError::NoDuration { .. }))));
        assert!(invoker.jobs.borrow().is_empty());
        assert!(!fixture.config.paths.short_output.exists());
    }

    #[test]
    fn test_clip_too_short_for_crossfade() {
        let fixture = fixture();
        let invoker = RecordingInvoker::default();
        let engine = AmbientEngine::new(fixture.config.clone(), probe(1.0, 60.0), Box::new(invoker.clone()));

        let result = engine.run();
        assert!(matches!(result, Err(AmbientError::Plan(PlanError::Infeasible { .. }))));
        assert!(invoker.jobs.borrow().is_empty());
    }

    #[test]
    fn test_short_failure_stops_run() {
        let fixture = fixture();
        let invoker = RecordingInvoker { fail_on_call: Some(0), ..Default::default() };
        let engine = AmbientEngine::new(fixture.config.clone(), probe(60.0, 60.0), Box::new(invoker.clone()));

        let result = engine.run();
        assert!(matches!(result, Err(AmbientError::Render(RenderError::EngineFailed { .. }))));
        assert_eq!(invoker.jobs.borrow().len(), 1);
        assert!(!fixture.config.paths.short_output.exists());
        assert!(!fixture.config.paths.long_output.exists());
    }

    #[test]
    fn test_long_failure_keeps_previous_output() {
        let fixture = fixture();
        std::fs::create_dir_all(fixture.config.paths.long_output.parent().unwrap()).unwrap();
        std::fs::write(&fixture.config.paths.long_output, b"last week").unwrap();

        let invoker = RecordingInvoker { fail_on_call: Some(2), ..Default::default() };
        let engine = AmbientEngine::new(fixture.config.clone(), probe(60.0, 60.0), Box::new(invoker.clone()));

        assert!(engine.run().is_err());
        assert_eq!(std::fs::read(&fixture.config.paths.short_output).unwrap(), b"rendered");
        assert_eq!(std::fs::read(&fixture.config.paths.long_output).unwrap(), b"last week");
    }
}
