use crate::types::QUESTION_PRESETS;
use tracing::{info, warn};

pub const FEEDBACK_DELAY_MS: i64 = 1000;
pub const TICK_RATE_MS: u64 = 100;

/// Command-line options. `question_count` skips the start menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub question_count: Option<u32>,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            let flag = arg.trim_start_matches('-').to_lowercase();

            match flag.as_str() {
                "s" | "seed" => match args.next().and_then(|v| v.as_ref().parse::<u64>().ok()) {
                    Some(seed) => {
                        info!(seed, "Using fixed random seed");
                        config.seed = Some(seed);
                    }
                    None => warn!("Missing or invalid value for '{}', ignoring", arg),
                },
                _ => match parse_question_count(&flag) {
                    Some(count) => config.question_count = Some(count),
                    None => warn!("Unrecognized argument '{}', ignoring", arg),
                },
            }
        }

        config
    }
}

fn parse_question_count(arg: &str) -> Option<u32> {
    match arg.parse::<u32>() {
        Ok(count) if count > 0 => {
            if !QUESTION_PRESETS.contains(&count) {
                info!(count, "Question count outside the menu presets");
            }
            Some(count)
        }
        _ => None,
    }
}
