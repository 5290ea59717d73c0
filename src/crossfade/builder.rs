use tracing::debug;

use crate::config::{EncodingConfig, ShortConfig};
use crate::crossfade::graph::{Filter, FilterChain, FilterGraph, Pad};
use crate::crossfade::plan::CrossfadePlan;
use crate::error::RenderError;

/// Label of the final video stream in every graph built here
pub const VIDEO_OUT: &str = "vout";

/// Label of the final audio stream in every graph built here
pub const AUDIO_OUT: &str = "aout";

/// Stream parameters both crossfade inputs are normalized to
///
/// The blend filters combine frames and samples one-to-one, so both copies
/// must agree on rate and format regardless of how the sources were encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFormat {
    pub frame_rate: u32,
    pub pixel_format: String,
    pub sample_rate: u32,
    pub sample_format: String,
    pub channel_layout: String,
}

impl From<&EncodingConfig> for StreamFormat {
    fn from(config: &EncodingConfig) -> Self {
        Self {
            frame_rate: config.frame_rate,
            pixel_format: config.pixel_format.clone(),
            sample_rate: config.sample_rate,
            sample_format: config.sample_format.clone(),
            channel_layout: config.channel_layout.clone(),
        }
    }
}

impl StreamFormat {
    fn video_filters(&self) -> [Filter; 2] {
        [
            Filter::new("fps").opt("fps", self.frame_rate),
            Filter::new("format").opt("pix_fmts", &self.pixel_format),
        ]
    }

    fn audio_filter(&self) -> Filter {
        Filter::new("aformat")
            .opt("sample_fmts", &self.sample_format)
            .opt("sample_rates", self.sample_rate)
            .opt("channel_layouts", &self.channel_layout)
    }
}

/// Builds the graph that turns the looping video input (`0`) and audio
/// input (`1`) into one seamless loop unit
///
/// Copy A of each stream plays unchanged; copy B is shifted forward by the
/// plan's offset so the clip's head lines up with its own tail, and the two
/// are blended over the crossfade window. The first `crossfade_duration`
/// seconds are then cut so the unit ends on the frame it starts with. Video
/// and audio use the same plan, so picture and sound cross the seam together.
#[derive(Debug, Clone)]
pub struct CrossfadeGraphBuilder {
    format: StreamFormat,
}

impl CrossfadeGraphBuilder {
    pub fn new(format: StreamFormat) -> Self {
        Self { format }
    }

    pub fn build(&self, plan: &CrossfadePlan) -> Result<FilterGraph, RenderError> {
        let clip = seconds(plan.clip_duration());
        let offset = seconds(plan.offset());
        let crossfade = seconds(plan.crossfade_duration());
        let loop_start = seconds(plan.loop_start());

        let [fps, format] = self.format.video_filters();
        let graph = FilterGraph::new()
            // Video: normalize, cut one iteration, duplicate
            .chain(
                FilterChain::new()
                    .input(Pad::video(0))
                    .filter(fps)
                    .filter(format)
                    .filter(Filter::new("trim").opt("duration", &clip))
                    .filter(reset_pts("setpts"))
                    .filter(Filter::new("split").arg(2))
                    .output("va")
                    .output("vb"),
            )
            // Video copy B: hold the first frame for `offset`, then play
            .chain(
                FilterChain::new()
                    .input(Pad::link("vb"))
                    .filter(
                        Filter::new("tpad")
                            .opt("start_duration", &offset)
                            .opt("start_mode", "clone"),
                    )
                    .filter(Filter::new("trim").opt("duration", &clip))
                    .filter(reset_pts("setpts"))
                    .output("vbs"),
            )
            .chain(
                FilterChain::new()
                    .input(Pad::link("va"))
                    .input(Pad::link("vbs"))
                    .filter(Filter::new("blend").opt("all_expr", blend_expression(&offset, &crossfade)))
                    .filter(Filter::new("trim").opt("start", &loop_start))
                    .filter(reset_pts("setpts"))
                    .output(VIDEO_OUT),
            )
            // Audio: normalize, cut one iteration, duplicate
            .chain(
                FilterChain::new()
                    .input(Pad::audio(1))
                    .filter(self.format.audio_filter())
                    .filter(Filter::new("atrim").opt("duration", &clip))
                    .filter(reset_pts("asetpts"))
                    .filter(Filter::new("asplit").arg(2))
                    .output("aa")
                    .output("ab"),
            )
            .chain(
                FilterChain::new()
                    .input(Pad::link("aa"))
                    .filter(fade("out", &offset, &crossfade))
                    .output("aaf"),
            )
            // Audio copy B: silence for `offset` (fully faded out anyway), then play
            .chain(
                FilterChain::new()
                    .input(Pad::link("ab"))
                    .filter(
                        Filter::new("adelay")
                            .opt("delays", plan.offset_millis())
                            .opt("all", 1),
                    )
                    .filter(Filter::new("atrim").opt("duration", &clip))
                    .filter(reset_pts("asetpts"))
                    .filter(fade("in", &offset, &crossfade))
                    .output("abf"),
            )
            .chain(
                FilterChain::new()
                    .input(Pad::link("aaf"))
                    .input(Pad::link("abf"))
                    .filter(
                        Filter::new("amix")
                            .opt("inputs", 2)
                            .opt("duration", "longest")
                            .opt("normalize", 0),
                    )
                    .filter(Filter::new("atrim").opt("start", &loop_start))
                    .filter(reset_pts("asetpts"))
                    .output(AUDIO_OUT),
            )
            .output(VIDEO_OUT)
            .output(AUDIO_OUT);

        graph.validate()?;
        debug!("Crossfade graph: {}", graph);
        Ok(graph)
    }
}

/// Builds the vertical short-clip graph: fill-scale, center-crop, normalize
#[derive(Debug, Clone)]
pub struct ShortClipGraphBuilder {
    format: StreamFormat,
    width: u32,
    height: u32,
}

impl ShortClipGraphBuilder {
    pub fn new(format: StreamFormat, short: &ShortConfig) -> Self {
        Self {
            format,
            width: short.width,
            height: short.height,
        }
    }

    pub fn build(&self) -> Result<FilterGraph, RenderError> {
        let [fps, format] = self.format.video_filters();
        let graph = FilterGraph::new()
            .chain(
                FilterChain::new()
                    .input(Pad::video(0))
                    .filter(
                        Filter::new("scale")
                            .opt("w", self.width)
                            .opt("h", self.height)
                            .opt("force_original_aspect_ratio", "increase"),
                    )
                    .filter(Filter::new("crop").opt("w", self.width).opt("h", self.height))
                    .filter(Filter::new("setsar").arg(1))
                    .filter(fps)
                    .filter(format)
                    .output(VIDEO_OUT),
            )
            .chain(
                FilterChain::new()
                    .input(Pad::audio(1))
                    .filter(self.format.audio_filter())
                    .output(AUDIO_OUT),
            )
            .output(VIDEO_OUT)
            .output(AUDIO_OUT);

        graph.validate()?;
        Ok(graph)
    }
}

fn reset_pts(name: &str) -> Filter {
    Filter::new(name).arg("PTS-STARTPTS")
}

fn fade(direction: &str, offset: &str, crossfade: &str) -> Filter {
    Filter::new("afade")
        .opt("t", direction)
        .opt("st", offset)
        .opt("d", crossfade)
        .opt("curve", "tri")
}

/// `A*(1-w)+B*w` with `w` ramping linearly from 0 at `offset` to 1 one
/// crossfade later; matches [`CrossfadePlan::blend_weight`]
fn blend_expression(offset: &str, crossfade: &str) -> String {
    let weight = format!("clip((T-{})/{},0,1)", offset, crossfade);
    format!("A*(1-{w})+B*{w}", w = weight)
}

/// Format seconds without float noise or trailing zeros
pub fn seconds(value: f64) -> String {
    let formatted = format!("{:.6}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossfade::plan::plan;

    fn builder() -> CrossfadeGraphBuilder {
        CrossfadeGraphBuilder::new(StreamFormat::from(&EncodingConfig::default()))
    }

    fn find_filter<'a>(graph: &'a FilterGraph, name: &str) -> Vec<&'a Filter> {
        graph
            .chains()
            .iter()
            .flat_map(|chain| chain.filters())
            .filter(|filter| filter.name() == name)
            .collect()
    }

    #[test]
    fn test_seconds_formatting() {
        assert_eq!(seconds(59.0), "59");
        assert_eq!(seconds(0.5), "0.5");
        assert_eq!(seconds(1.0 / 3.0), "0.333333");
        assert_eq!(seconds(0.0), "0");
    }

    #[test]
    fn test_two_declared_outputs() {
        let graph = builder().build(&plan(60.0, 1.0).unwrap()).unwrap();
        assert_eq!(graph.outputs(), &[VIDEO_OUT.to_string(), AUDIO_OUT.to_string()]);
    }

    #[test]
    fn test_blend_inputs_have_single_producers() {
        let graph = builder().build(&plan(60.0, 1.0).unwrap()).unwrap();

        for blend_name in ["blend", "amix"] {
            let chain = graph
                .chains()
                .iter()
                .find(|chain| chain.filters().iter().any(|f| f.name() == blend_name))
                .unwrap();
            assert_eq!(chain.inputs().len(), 2);

            for pad in chain.inputs() {
                let Pad::Link(label) = pad else {
                    panic!("{} should read linked pads", blend_name);
                };
                let producers = graph
                    .chains()
                    .iter()
                    .filter(|c| c.outputs().contains(label))
                    .count();
                assert_eq!(producers, 1, "label {} produced {} times", label, producers);
            }
        }
    }

    #[test]
    fn test_offsets_shared_by_video_and_audio() {
        let graph = builder().build(&plan(60.0, 1.0).unwrap()).unwrap();

        let tpad = find_filter(&graph, "tpad");
        assert_eq!(tpad[0].option("start_duration"), Some("59"));
        assert_eq!(tpad[0].option("start_mode"), Some("clone"));

        let adelay = find_filter(&graph, "adelay");
        assert_eq!(adelay[0].option("delays"), Some("59000"));

        let fades = find_filter(&graph, "afade");
        assert_eq!(fades.len(), 2);
        for fade in fades {
            assert_eq!(fade.option("st"), Some("59"));
            assert_eq!(fade.option("d"), Some("1"));
            assert_eq!(fade.option("curve"), Some("tri"));
        }

        let blend = find_filter(&graph, "blend");
        assert_eq!(
            blend[0].option("all_expr"),
            Some("A*(1-clip((T-59)/1,0,1))+B*clip((T-59)/1,0,1)")
        );
    }

    #[test]
    fn test_every_branch_trimmed_to_clip_length() {
        let graph = builder().build(&plan(12.5, 0.5).unwrap()).unwrap();

        let trims: Vec<_> = find_filter(&graph, "trim")
            .into_iter()
            .chain(find_filter(&graph, "atrim"))
            .filter(|f| f.option("duration").is_some())
            .collect();
        assert_eq!(trims.len(), 4);
        assert!(trims.iter().all(|f| f.option("duration") == Some("12.5")));
    }

    #[test]
    fn test_loop_unit_drops_leading_crossfade() {
        let graph = builder().build(&plan(60.0, 1.5).unwrap()).unwrap();

        for (label, expected) in [
            (VIDEO_OUT, ["blend", "trim", "setpts"]),
            (AUDIO_OUT, ["amix", "atrim", "asetpts"]),
        ] {
            let chain = graph
                .chains()
                .iter()
                .find(|chain| chain.outputs().iter().any(|out| out == label))
                .unwrap();
            let names: Vec<_> = chain.filters().iter().map(|f| f.name()).collect();
            assert_eq!(names, expected);
            assert_eq!(chain.filters()[1].option("start"), Some("1.5"));
        }
    }

    #[test]
    fn test_serialized_graph() {
        let graph = builder().build(&plan(10.0, 2.0).unwrap()).unwrap();
        let text = graph.to_filter_complex();

        assert!(text.starts_with("[0:v]fps=fps=30,format=pix_fmts=yuv420p,trim=duration=10,setpts=PTS-STARTPTS,split=2[va][vb];"));
        assert!(text.contains("[vb]tpad=start_duration=8:start_mode=clone,trim=duration=10,setpts=PTS-STARTPTS[vbs]"));
        assert!(text.contains(r"[va][vbs]blend=all_expr=A*(1-clip((T-8)/2\,0\,1))+B*clip((T-8)/2\,0\,1),trim=start=2,setpts=PTS-STARTPTS[vout]"));
        assert!(text.contains("[1:a]aformat=sample_fmts=fltp:sample_rates=48000:channel_layouts=stereo"));
        assert!(text.contains("[aaf][abf]amix=inputs=2:duration=longest:normalize=0,atrim=start=2,asetpts=PTS-STARTPTS[aout]"));
        assert_eq!(text.matches(';').count(), graph.chains().len() - 1);
    }

    #[test]
    fn test_short_clip_graph() {
        let format = StreamFormat::from(&EncodingConfig::default());
        let graph = ShortClipGraphBuilder::new(format, &ShortConfig::default())
            .build()
            .unwrap();

        assert_eq!(graph.outputs().len(), 2);
        assert_eq!(
            graph.to_filter_complex(),
            "[0:v]scale=w=1080:h=1920:force_original_aspect_ratio=increase,crop=w=1080:h=1920,setsar=1,fps=fps=30,format=pix_fmts=yuv420p[vout];\
             [1:a]aformat=sample_fmts=fltp:sample_rates=48000:channel_layouts=stereo[aout]"
        );
    }
}
