use saberview_chart::{BeatmapInfo, LoadedDifficulty};

/// "title sub_title by author", skipping an empty subtitle.
pub(crate) fn song_line(info: &BeatmapInfo) -> String {
    let song = &info.song;
    let title = if song.sub_title.is_empty() {
        song.title.clone()
    } else {
        format!("{} {}", song.title, song.sub_title)
    };

    if song.author.is_empty() {
        title
    } else {
        format!("{} by {}", title, song.author)
    }
}

/// Mappers and lighters of a difficulty. A single mapper who also did the
/// lights is only named once.
pub(crate) fn credits(mappers: &[String], lighters: &[String]) -> String {
    if let ([mapper], [lighter]) = (mappers, lighters) {
        if mapper.to_lowercase() == lighter.to_lowercase() {
            return mapper.clone();
        }
    }

    mappers
        .iter()
        .chain(lighters)
        .filter(|name| !name.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn difficulty_line(difficulty: &LoadedDifficulty) -> String {
    let credits = credits(&difficulty.mappers, &difficulty.lighters);
    let mut line = format!(
        "{} {} (NJS {}, offset {})",
        difficulty.characteristic,
        difficulty.level,
        difficulty.note_jump_speed,
        difficulty.spawn_offset
    );
    if !credits.is_empty() {
        line.push_str(" mapped by ");
        line.push_str(&credits);
    }
    line
}
