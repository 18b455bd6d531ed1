use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Boolean prelude switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct PreludeFlags: u16 {
        const DEBUG                    = 0x0001;
        const VERBOSE_LOGGING          = 0x0002;
        const RUN_RULES_ON_LEVEL_START = 0x0004;
        const REQUIRE_PLAYER_MOVEMENT  = 0x0008;
        const NOACTION                 = 0x0010;
        const NOUNDO                   = 0x0020;
        const NORESTART                = 0x0040;
        const THROTTLE_MOVEMENT        = 0x0080;
        const NOREPEAT_ACTION          = 0x0100;
        const SCANLINE                 = 0x0200;
    }
}

impl PreludeFlags {
    pub fn from_keyword(word: &str) -> Option<Self> {
        let flag = match word {
            "debug" => Self::DEBUG,
            "verbose_logging" => Self::VERBOSE_LOGGING,
            "run_rules_on_level_start" => Self::RUN_RULES_ON_LEVEL_START,
            "require_player_movement" => Self::REQUIRE_PLAYER_MOVEMENT,
            "noaction" => Self::NOACTION,
            "noundo" => Self::NOUNDO,
            "norestart" => Self::NORESTART,
            "throttle_movement" => Self::THROTTLE_MOVEMENT,
            "norepeat_action" => Self::NOREPEAT_ACTION,
            "scanline" => Self::SCANLINE,
            _ => return None,
        };
        Some(flag)
    }
}

/// Keys that carry a value and are kept verbatim for front ends.
pub const PRELUDE_SETTINGS: &[&str] = &[
    "title",
    "author",
    "homepage",
    "color_palette",
    "again_interval",
    "background_color",
    "text_color",
    "key_repeat_interval",
    "realtime_interval",
    "flickscreen",
    "zoomscreen",
    "youtube",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Prelude {
    pub flags: PreludeFlags,
    pub settings: BTreeMap<String, String>,
}

impl Prelude {
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn has(&self, flag: PreludeFlags) -> bool {
        self.flags.contains(flag)
    }
}
