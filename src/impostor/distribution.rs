use crate::rng::RandomSource;
use crate::types::*;
use crate::words::{draw_entry, WordEntry};
use rand::seq::SliceRandom;

/// Hand out the round's word.
///
/// Impostors get no word (and the entry's hint when enabled). In two-word mode
/// `floor(crew / 2)` randomly chosen crew members get the related word instead
/// of the primary one. Returns the drawn entry.
pub fn distribute_words<R: RandomSource + ?Sized>(
    players: &mut [ImpostorPlayer],
    config: &ImpostorConfig,
    used_words: &[String],
    rng: &mut R,
) -> &'static WordEntry {
    let entry = draw_entry(&config.selected_categories, used_words, rng);

    let mut crew: Vec<usize> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_impostor)
        .map(|(idx, _)| idx)
        .collect();
    crew.shuffle(rng);
    let second_group = &crew[..crew.len() / 2];

    for (idx, player) in players.iter_mut().enumerate() {
        if player.is_impostor {
            player.word = None;
            player.hint = config.impostor_has_hint.then(|| entry.hint.to_string());
            continue;
        }

        player.hint = None;
        let word = match entry.related {
            Some(related) if config.two_words_mode && second_group.contains(&idx) => related,
            _ => entry.word,
        };
        player.word = Some(word.to_string());
    }

    entry
}
