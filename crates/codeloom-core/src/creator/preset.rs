//! Default creator presets seeded on first run.

use super::Creator;

/// Built-in creators available before the user saves any of their own.
pub fn default_creators() -> Vec<Creator> {
    vec![
        Creator::new(
            "Arcade",
            "retro game developer",
            "Playable browser games with keyboard controls, bold colors and a visible score.",
        ),
        Creator::new(
            "Sketch",
            "generative artist",
            "Canvas-based visuals, smooth animation loops, parameters easy to tweak at the top of the file.",
        ),
        Creator::new(
            "Toolsmith",
            "utility developer",
            "Small single-purpose tools with a plain interface and no external dependencies.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_distinct() {
        let presets = default_creators();
        assert_eq!(presets.len(), 3);
        assert_ne!(presets[0].id, presets[1].id);
    }
}
