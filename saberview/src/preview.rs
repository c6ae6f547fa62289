use saberview_chart::{LoadedDifficulty, Note};
use saberview_graphics::{
    scene::{
        Arc, ArcPool, ArcStyle, ArcWindow, GridLayout, JumpParameters, ObjectMotion,
        PlaybackState, TempoMap,
    },
    settings::Settings,
};

const BEAT_EPSILON: f32 = 1e-3;
const POSITION_EPSILON: f32 = 1e-3;

/// Note an arc starts on, if any. Arcs only pick up notes of their own color.
fn head_note<'a>(arc: &Arc, notes: &'a [Note], layout: &GridLayout) -> Option<&'a Note> {
    notes.iter().find(|note| {
        note.color == arc.color
            && (note.beat - arc.beat).abs() < BEAT_EPSILON
            && (layout.object_position(note.x, note.y, note.coordinates) - arc.position).norm()
                < POSITION_EPSILON
    })
}

/// Outcome of stepping through a whole difficulty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PreviewStats {
    pub(crate) ticks: usize,
    pub(crate) peak_rendered: usize,
    pub(crate) rendered_ticks: usize,
}

/// Headless playback of the arcs of one difficulty.
pub(crate) struct Preview<P: ArcPool> {
    tempo: TempoMap,
    jump: JumpParameters,
    window: ArcWindow<P>,
    end_time: f32,
}

impl<P: ArcPool> Preview<P> {
    pub(crate) fn new(
        difficulty: &LoadedDifficulty,
        base_bpm: f32,
        song_duration: f32,
        pool: P,
        settings: &Settings,
    ) -> Self {
        let beatmap = &difficulty.beatmap;
        let layout = GridLayout::default();
        let tempo = TempoMap::new(base_bpm, &beatmap.bpm_changes);
        let jump = JumpParameters::new(
            tempo.base_bpm(),
            difficulty.note_jump_speed,
            difficulty.spawn_offset,
        );

        let arcs = beatmap
            .arcs
            .iter()
            .map(|slider| Arc::from_slider(slider, &layout, &tempo))
            .collect::<Vec<_>>();
        let end_time = arcs
            .iter()
            .map(|arc| arc.tail_time)
            .fold(song_duration, f32::max);

        let mut window = ArcWindow::new(
            pool,
            ObjectMotion::default(),
            ArcStyle::default(),
            settings,
        );
        window.reload(arcs);

        // Notes rise from the floor row before settling on their lane.
        let heads = window
            .arcs()
            .iter()
            .enumerate()
            .filter(|(_, arc)| head_note(arc, &beatmap.notes, &layout).is_some())
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        for &index in &heads {
            window.attach_head(index, layout.bottom_left.y);
        }

        log::debug!(
            "Preview of {} arcs, {} starting on notes, reaction time {}s",
            window.arcs().len(),
            heads.len(),
            jump.reaction_time
        );

        Self {
            tempo,
            jump,
            window,
            end_time,
        }
    }

    pub(crate) fn end_time(&self) -> f32 {
        self.end_time
    }

    pub(crate) fn window(&self) -> &ArcWindow<P> {
        &self.window
    }

    pub(crate) fn tick(&mut self, time: f32) -> usize {
        let playback = PlaybackState::at_time(time, &self.tempo, &self.jump);
        self.window.update(&playback);
        self.window.rendered().len()
    }

    /// Steps from the start until one second past the last object.
    pub(crate) fn run(&mut self, ticks_per_second: f32) -> PreviewStats {
        let mut stats = PreviewStats::default();
        if ticks_per_second <= 0.0 {
            log::warn!("Skipping preview with {} ticks per second", ticks_per_second);
            return stats;
        }

        let step = 1.0 / ticks_per_second;
        let end = self.end_time + 1.0;
        loop {
            let time = stats.ticks as f32 * step;
            if time > end {
                break;
            }

            let rendered = self.tick(time);
            stats.ticks += 1;
            stats.peak_rendered = stats.peak_rendered.max(rendered);
            if rendered > 0 {
                stats.rendered_ticks += 1;
            }
        }

        self.window.clear_rendered();
        stats
    }
}
