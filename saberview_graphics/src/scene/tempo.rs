use saberview_chart::BpmChange;

pub(crate) const FALLBACK_BPM: f32 = 120.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct TempoSection {
    beat: f32,
    /// Seconds at `beat`.
    time: f32,
    bpm: f32,
}

impl TempoSection {
    fn beat_duration(&self) -> f32 {
        60.0 / self.bpm
    }
}

/// Converts between beats and seconds over a base BPM and its changes.
#[derive(Clone, Debug)]
pub struct TempoMap {
    /// Sorted by beat; the first section always starts at beat 0.
    sections: Vec<TempoSection>,
}

pub(crate) fn valid_bpm(bpm: f32) -> bool {
    bpm.is_finite() && bpm > 0.0
}

impl TempoMap {
    pub fn new(base_bpm: f32, changes: &[BpmChange]) -> Self {
        let base_bpm = if valid_bpm(base_bpm) {
            base_bpm
        } else {
            log::warn!("Invalid base BPM {}, using {}", base_bpm, FALLBACK_BPM);
            FALLBACK_BPM
        };

        let mut changes = changes
            .iter()
            .filter(|c| {
                let valid = valid_bpm(c.bpm) && c.beat.is_finite();
                if !valid {
                    log::warn!("Ignoring BPM change to {} at beat {}", c.bpm, c.beat);
                }
                valid
            })
            .copied()
            .collect::<Vec<_>>();
        changes.sort_by(|a, b| a.beat.total_cmp(&b.beat));

        let start = TempoSection {
            beat: 0.0,
            time: 0.0,
            bpm: base_bpm,
        };
        let sections = std::iter::once(start)
            .chain(changes.into_iter().scan(start, |current, change| {
                // Changes before the first beat replace the base tempo.
                let beat = change.beat.max(0.0);
                let time = current.time + (beat - current.beat) * current.beat_duration();
                *current = TempoSection {
                    beat,
                    time,
                    bpm: change.bpm,
                };
                Some(*current)
            }))
            .fold(Vec::new(), |mut sections: Vec<TempoSection>, section| {
                match sections.last_mut() {
                    Some(last) if last.beat == section.beat => *last = section,
                    _ => sections.push(section),
                }
                sections
            });

        Self { sections }
    }

    pub fn base_bpm(&self) -> f32 {
        self.sections[0].bpm
    }

    pub fn bpm_at_beat(&self, beat: f32) -> f32 {
        self.section_at_beat(beat).bpm
    }

    fn section_at_beat(&self, beat: f32) -> &TempoSection {
        let index = self.sections.partition_point(|s| s.beat <= beat);
        &self.sections[index.saturating_sub(1)]
    }

    fn section_at_time(&self, time: f32) -> &TempoSection {
        let index = self.sections.partition_point(|s| s.time <= time);
        &self.sections[index.saturating_sub(1)]
    }

    pub fn time_from_beat(&self, beat: f32) -> f32 {
        let section = self.section_at_beat(beat);
        section.time + (beat - section.beat) * section.beat_duration()
    }

    pub fn beat_from_time(&self, time: f32) -> f32 {
        let section = self.section_at_time(time);
        section.beat + (time - section.time) / section.beat_duration()
    }
}
