//! Static word bank shared by both games

use crate::rng::RandomSource;
use rand::seq::IndexedRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordEntry {
    pub word: &'static str,
    pub category: &'static str,
    /// Vague clue an impostor may receive
    pub hint: &'static str,
    /// Similar word handed to half the crew in two-word mode
    pub related: Option<&'static str>,
}

const fn entry(
    category: &'static str,
    word: &'static str,
    hint: &'static str,
    related: Option<&'static str>,
) -> WordEntry {
    WordEntry {
        word,
        category,
        hint,
        related,
    }
}

pub static WORDS: &[WordEntry] = &[
    // Animals
    entry("Animals", "Lion", "Savanna", Some("Tiger")),
    entry("Animals", "Dolphin", "Ocean", Some("Whale")),
    entry("Animals", "Eagle", "Sky", Some("Hawk")),
    entry("Animals", "Penguin", "Ice", Some("Seal")),
    entry("Animals", "Horse", "Farm", Some("Donkey")),
    entry("Animals", "Owl", "Night", Some("Bat")),
    entry("Animals", "Snake", "Scales", Some("Lizard")),
    entry("Animals", "Bee", "Flowers", Some("Wasp")),
    // Food
    entry("Food", "Pizza", "Oven", Some("Lasagna")),
    entry("Food", "Sushi", "Rice", Some("Sashimi")),
    entry("Food", "Burger", "Bun", Some("Hot dog")),
    entry("Food", "Pancake", "Breakfast", Some("Waffle")),
    entry("Food", "Chocolate", "Sweet", Some("Candy")),
    entry("Food", "Popcorn", "Cinema", Some("Chips")),
    entry("Food", "Ice cream", "Cold", Some("Milkshake")),
    entry("Food", "Soup", "Spoon", Some("Stew")),
    // Objects
    entry("Objects", "Umbrella", "Rain", Some("Raincoat")),
    entry("Objects", "Scissors", "Cut", Some("Knife")),
    entry("Objects", "Mirror", "Reflection", Some("Window")),
    entry("Objects", "Candle", "Wax", Some("Lamp")),
    entry("Objects", "Pillow", "Bed", Some("Blanket")),
    entry("Objects", "Key", "Lock", Some("Padlock")),
    entry("Objects", "Backpack", "School", Some("Suitcase")),
    entry("Objects", "Clock", "Time", Some("Calendar")),
    // Places
    entry("Places", "Hospital", "Doctor", Some("Pharmacy")),
    entry("Places", "Airport", "Travel", Some("Train station")),
    entry("Places", "Library", "Silence", Some("Bookstore")),
    entry("Places", "Beach", "Sand", Some("Pool")),
    entry("Places", "Museum", "Exhibit", Some("Gallery")),
    entry("Places", "Stadium", "Crowd", Some("Arena")),
    entry("Places", "Bakery", "Bread", Some("Cafe")),
    entry("Places", "Prison", "Bars", Some("Police station")),
    // Nature
    entry("Nature", "Volcano", "Lava", Some("Geyser")),
    entry("Nature", "Waterfall", "River", Some("Lake")),
    entry("Nature", "Desert", "Dry", Some("Savanna")),
    entry("Nature", "Rainbow", "Colors", Some("Aurora")),
    entry("Nature", "Forest", "Trees", Some("Jungle")),
    entry("Nature", "Storm", "Thunder", Some("Hurricane")),
    entry("Nature", "Cave", "Dark", Some("Tunnel")),
    entry("Nature", "Island", "Isolated", Some("Peninsula")),
    // Science
    entry("Science", "Magnet", "Attraction", Some("Compass")),
    entry("Science", "Telescope", "Stars", Some("Microscope")),
    entry("Science", "Gravity", "Falling", Some("Orbit")),
    entry("Science", "Atom", "Tiny", Some("Molecule")),
    entry("Science", "Fossil", "Ancient", Some("Skeleton")),
    entry("Science", "Vaccine", "Needle", Some("Antibiotic")),
    entry("Science", "Eclipse", "Shadow", Some("Full moon")),
    entry("Science", "Laboratory", "Experiment", Some("Classroom")),
    // Technology
    entry("Technology", "Smartphone", "Pocket", Some("Tablet")),
    entry("Technology", "Robot", "Machine", Some("Drone")),
    entry("Technology", "Password", "Secret", Some("Fingerprint")),
    entry("Technology", "Headphones", "Music", Some("Speaker")),
    entry("Technology", "Satellite", "Space", Some("Antenna")),
    entry("Technology", "Keyboard", "Typing", Some("Mouse")),
    entry("Technology", "Camera", "Photo", Some("Video")),
    entry("Technology", "Printer", "Paper", Some("Scanner")),
    // Sports
    entry("Sports", "Football", "Goal", Some("Futsal")),
    entry("Sports", "Tennis", "Racket", Some("Badminton")),
    entry("Sports", "Surfing", "Waves", Some("Skateboarding")),
    entry("Sports", "Boxing", "Gloves", Some("Wrestling")),
    entry("Sports", "Chess", "Strategy", Some("Checkers")),
    entry("Sports", "Swimming", "Pool", Some("Diving")),
    entry("Sports", "Cycling", "Pedals", Some("Motocross")),
    entry("Sports", "Basketball", "Hoop", Some("Volleyball")),
    // Professions
    entry("Professions", "Firefighter", "Hose", Some("Lifeguard")),
    entry("Professions", "Chef", "Kitchen", Some("Baker")),
    entry("Professions", "Pilot", "Cockpit", Some("Astronaut")),
    entry("Professions", "Teacher", "Blackboard", Some("Principal")),
    entry("Professions", "Dentist", "Teeth", Some("Doctor")),
    entry("Professions", "Detective", "Clues", Some("Spy")),
    entry("Professions", "Farmer", "Harvest", Some("Gardener")),
    entry("Professions", "Magician", "Tricks", Some("Clown")),
    // Emotions
    entry("Emotions", "Jealousy", "Envy", Some("Resentment")),
    entry("Emotions", "Nostalgia", "Memories", Some("Longing")),
    entry("Emotions", "Fear", "Scream", Some("Anxiety")),
    entry("Emotions", "Pride", "Achievement", Some("Confidence")),
    entry("Emotions", "Boredom", "Yawn", None),
    entry("Emotions", "Surprise", "Unexpected", Some("Shock")),
];

/// Distinct categories in bank order
pub fn categories() -> Vec<&'static str> {
    let mut seen: Vec<&'static str> = Vec::new();
    for entry in WORDS {
        if !seen.contains(&entry.category) {
            seen.push(entry.category);
        }
    }
    seen
}

/// Entries a draw may choose from.
///
/// Narrows the bank to `categories` (all of it when `categories` is empty),
/// then drops `used` words. Whenever a step would leave nothing the previous
/// set is kept, so the result is never empty.
pub fn candidate_pool(categories: &[String], used: &[String]) -> Vec<&'static WordEntry> {
    let filtered: Vec<&'static WordEntry> = if categories.is_empty() {
        WORDS.iter().collect()
    } else {
        WORDS
            .iter()
            .filter(|w| categories.iter().any(|c| c == w.category))
            .collect()
    };

    let available: Vec<&'static WordEntry> = filtered
        .iter()
        .copied()
        .filter(|w| !used.iter().any(|u| u == w.word))
        .collect();

    if !available.is_empty() {
        available
    } else if !filtered.is_empty() {
        filtered
    } else {
        WORDS.iter().collect()
    }
}

/// Draw one entry uniformly from the candidate pool
pub fn draw_entry<R: RandomSource + ?Sized>(
    categories: &[String],
    used: &[String],
    rng: &mut R,
) -> &'static WordEntry {
    let pool = candidate_pool(categories, used);
    pool.choose(rng).copied().unwrap_or(&WORDS[0])
}

/// Draw a word for Secret Word
pub fn draw_word<R: RandomSource + ?Sized>(
    categories: &[String],
    used: &[String],
    rng: &mut R,
) -> String {
    draw_entry(categories, used, rng).word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cats(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_categories_are_distinct() {
        let all = categories();
        assert!(all.contains(&"Animals"));
        assert!(all.contains(&"Emotions"));
        let mut deduped = all.clone();
        deduped.dedup();
        assert_eq!(all, deduped);
    }

    #[test]
    fn test_pool_filters_by_category() {
        let pool = candidate_pool(&cats(&["Food"]), &[]);
        assert_eq!(pool.len(), 8);
        assert!(pool.iter().all(|w| w.category == "Food"));
    }

    #[test]
    fn test_pool_excludes_used_words() {
        let pool = candidate_pool(&cats(&["Food"]), &cats(&["Pizza", "Sushi"]));
        assert_eq!(pool.len(), 6);
        assert!(pool.iter().all(|w| w.word != "Pizza" && w.word != "Sushi"));
    }

    #[test]
    fn test_exhausted_category_falls_back() {
        let used: Vec<String> = WORDS
            .iter()
            .filter(|w| w.category == "Animals")
            .map(|w| w.word.to_string())
            .collect();
        let mut rng = StdRng::seed_from_u64(5);

        let word = draw_word(&cats(&["Animals"]), &used, &mut rng);
        assert!(WORDS.iter().any(|w| w.word == word));
    }

    #[test]
    fn test_unknown_category_falls_back_to_full_bank() {
        let pool = candidate_pool(&cats(&["Nonexistent"]), &[]);
        assert_eq!(pool.len(), WORDS.len());
    }

    #[test]
    fn test_everything_used_still_draws() {
        let used: Vec<String> = WORDS.iter().map(|w| w.word.to_string()).collect();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let entry = draw_entry(&[], &used, &mut rng);
            assert!(!entry.word.is_empty());
        }
    }
}
