use std::time::Duration;

/// Divergent historical behaviours, picked once before a run starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY6/8XYE shift VX in place instead of shifting VY into VX
    pub shift_uses_single_register: bool,
    /// FX55/FX65 leave I where it was instead of advancing it by X+1
    pub load_store_keeps_index: bool,
}

/// how fast the COSMAC VIP roughly ran typical programs
const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;

/// how long a terminal key counts as held after its last repeat
const DEFAULT_KEY_HOLD: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
pub struct Config {
    pub quirks: Quirks,
    pub instructions_per_second: u32,
    pub key_hold: Duration,
    /// fixed seed for CXNN; entropy when unset
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            key_hold: DEFAULT_KEY_HOLD,
            rng_seed: None,
        }
    }
}

impl Config {
    /// time budget for one instruction at the configured speed
    pub fn instruction_interval(&self) -> Duration {
        Duration::from_secs(1) / self.instructions_per_second.max(1)
    }
}
