use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::maze::MazeParams;

const DEFAULT_GRID_W: usize = 15;
const DEFAULT_GRID_H: usize = 15;
const DEFAULT_KEYS: usize = 5;
const DEFAULT_HAZARDS: usize = 3;
const DEFAULT_WALL_CHANCE: f64 = 0.1;
const DEFAULT_TICK_MS: u64 = 500;
const DEFAULT_RENDER_FPS: u64 = 60;
const MAX_GRID_SIDE: usize = 200;
const MAX_RENDER_FPS: u64 = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub maze: MazeParams,
    pub tick_ms: u64,
    pub render_fps: u64,
    pub seed: Option<u64>,
    pub bell: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            maze: MazeParams {
                width: DEFAULT_GRID_W,
                height: DEFAULT_GRID_H,
                wall_chance: DEFAULT_WALL_CHANCE,
                key_count: DEFAULT_KEYS,
                hazard_count: DEFAULT_HAZARDS,
            },
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            seed: None,
            bell: false,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let width = positive::<usize>(&lookup, "KEYMAZE_WIDTH")
            .filter(|v| *v <= MAX_GRID_SIDE)
            .unwrap_or(defaults.maze.width);
        let height = positive::<usize>(&lookup, "KEYMAZE_HEIGHT")
            .filter(|v| *v <= MAX_GRID_SIDE)
            .unwrap_or(defaults.maze.height);
        let key_count = parsed(&lookup, "KEYMAZE_KEYS").unwrap_or(defaults.maze.key_count);
        let hazard_count =
            parsed(&lookup, "KEYMAZE_HAZARDS").unwrap_or(defaults.maze.hazard_count);
        let wall_chance = parsed::<f64>(&lookup, "KEYMAZE_WALL_CHANCE")
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.maze.wall_chance);

        Self {
            maze: MazeParams {
                width,
                height,
                wall_chance,
                key_count,
                hazard_count,
            },
            tick_ms: positive(&lookup, "KEYMAZE_TICK_MS").unwrap_or(defaults.tick_ms),
            render_fps: positive::<u64>(&lookup, "KEYMAZE_FPS")
                .map(|v| v.min(MAX_RENDER_FPS))
                .unwrap_or(defaults.render_fps),
            seed: parsed(&lookup, "KEYMAZE_SEED"),
            bell: lookup("KEYMAZE_BELL").is_some_and(|v| is_truthy(&v)),
            log_file: lookup("KEYMAZE_LOG_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.render_fps.max(1))
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    lookup(name).and_then(|v| v.trim().parse::<T>().ok())
}

fn positive<T: FromStr + PartialOrd + Default>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    parsed::<T>(lookup, name).filter(|v| *v > T::default())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = from_pairs(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.maze.width, 15);
        assert_eq!(config.tick_interval(), Duration::from_millis(500));
    }

    #[test]
    fn overrides_are_applied() {
        let config = from_pairs(&[
            ("KEYMAZE_WIDTH", "20"),
            ("KEYMAZE_HEIGHT", " 12 "),
            ("KEYMAZE_KEYS", "0"),
            ("KEYMAZE_HAZARDS", "6"),
            ("KEYMAZE_TICK_MS", "250"),
            ("KEYMAZE_SEED", "1234"),
            ("KEYMAZE_BELL", "yes"),
            ("KEYMAZE_LOG_FILE", "/tmp/keymaze.log"),
        ]);
        assert_eq!(config.maze.width, 20);
        assert_eq!(config.maze.height, 12);
        assert_eq!(config.maze.key_count, 0);
        assert_eq!(config.maze.hazard_count, 6);
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.seed, Some(1234));
        assert!(config.bell);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/keymaze.log")));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = from_pairs(&[
            ("KEYMAZE_WIDTH", "0"),
            ("KEYMAZE_TICK_MS", "fast"),
            ("KEYMAZE_FPS", "-5"),
            ("KEYMAZE_WALL_CHANCE", "NaN"),
            ("KEYMAZE_BELL", "nope"),
        ]);
        assert_eq!(config.maze.width, 15);
        assert_eq!(config.tick_ms, 500);
        assert_eq!(config.render_fps, 60);
        assert_eq!(config.maze.wall_chance, 0.1);
        assert!(!config.bell);
    }

    #[test]
    fn oversized_grid_falls_back_to_default() {
        let config = from_pairs(&[("KEYMAZE_WIDTH", "32768"), ("KEYMAZE_HEIGHT", "2")]);
        assert_eq!(config.maze.width, 15);
        assert_eq!(config.maze.height, 2);

        let config = from_pairs(&[("KEYMAZE_WIDTH", "200"), ("KEYMAZE_HEIGHT", "201")]);
        assert_eq!(config.maze.width, 200);
        assert_eq!(config.maze.height, 15);
    }

    #[test]
    fn render_rate_is_capped() {
        let config = from_pairs(&[("KEYMAZE_FPS", "5000000")]);
        assert_eq!(config.render_fps, 1000);
        assert_eq!(config.frame_time(), Duration::from_millis(1));
    }

    #[test]
    fn wall_chance_is_clamped() {
        assert_eq!(from_pairs(&[("KEYMAZE_WALL_CHANCE", "3")]).maze.wall_chance, 1.0);
        assert_eq!(from_pairs(&[("KEYMAZE_WALL_CHANCE", "-1")]).maze.wall_chance, 0.0);
    }
}
