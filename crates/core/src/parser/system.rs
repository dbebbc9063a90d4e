use super::structured;
use crate::keywords::contains_any;
use crate::types::{Direction, ParseOutcome, SystemControlCommand, SystemTarget, Toggle};
use serde::Deserialize;

/// Reason attached when no brightness/volume/bluetooth target was named.
pub const NO_TARGET_REASON: &str = "no system target named";

const INCREASE: &[&str] = &[
    "increase", "turn up", "up", "raise", "higher", "louder", "brighter", "boost", "more",
];
const DECREASE: &[&str] = &[
    "decrease", "turn down", "down", "lower", "reduce", "dim", "dimmer", "quieter", "less",
];
// Checked before ENABLE so that "turn off" never reads as "on".
const DISABLE: &[&str] = &["disable", "turn off", "switch off", "deactivate", "off"];
const ENABLE: &[&str] = &["enable", "turn on", "switch on", "activate", "on"];

#[derive(Debug, Deserialize)]
struct SystemPayload {
    target: SystemTarget,
    direction: Option<Direction>,
    state: Option<Toggle>,
}

pub fn detect_target(lowered: &str) -> Option<SystemTarget> {
    [
        (SystemTarget::Brightness, &["brightness", "screen"][..]),
        (SystemTarget::Volume, &["volume", "sound", "audio"][..]),
        (SystemTarget::Bluetooth, &["bluetooth"][..]),
    ]
    .into_iter()
    .find_map(|(target, keywords)| contains_any(lowered, keywords).then_some(target))
}

pub fn parse_system_command(input: &str) -> ParseOutcome<SystemControlCommand> {
    if let Some(payload) = structured::<SystemPayload>(input) {
        return build(payload.target, payload.direction, payload.state);
    }

    let lowered = input.to_lowercase();
    let Some(target) = detect_target(&lowered) else {
        return ParseOutcome::defaulted(
            SystemControlCommand::Brightness {
                direction: Direction::Decrease,
            },
            NO_TARGET_REASON,
        );
    };

    let direction = if contains_any(&lowered, INCREASE) {
        Some(Direction::Increase)
    } else if contains_any(&lowered, DECREASE) {
        Some(Direction::Decrease)
    } else {
        None
    };
    let state = if contains_any(&lowered, DISABLE) {
        Some(Toggle::Disable)
    } else if contains_any(&lowered, ENABLE) {
        Some(Toggle::Enable)
    } else {
        None
    };

    build(target, direction, state)
}

fn build(
    target: SystemTarget,
    direction: Option<Direction>,
    state: Option<Toggle>,
) -> ParseOutcome<SystemControlCommand> {
    match target {
        SystemTarget::Brightness | SystemTarget::Volume => {
            let make = |direction| match target {
                SystemTarget::Volume => SystemControlCommand::Volume { direction },
                _ => SystemControlCommand::Brightness { direction },
            };
            match direction {
                Some(direction) => ParseOutcome::parsed(make(direction)),
                None => ParseOutcome::defaulted(
                    make(Direction::Decrease),
                    format!("no direction for {}, decreasing", target),
                ),
            }
        }
        SystemTarget::Bluetooth => match state {
            Some(state) => ParseOutcome::parsed(SystemControlCommand::Bluetooth { state }),
            None => ParseOutcome::defaulted(
                SystemControlCommand::Bluetooth {
                    state: Toggle::Disable,
                },
                "no bluetooth state, disabling",
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(
            parse_system_command("increase brightness").into_value(),
            SystemControlCommand::Brightness {
                direction: Direction::Increase
            }
        );
        assert_eq!(
            parse_system_command("turn the volume down a bit").into_value(),
            SystemControlCommand::Volume {
                direction: Direction::Decrease
            }
        );
        assert_eq!(
            parse_system_command("make it louder, volume please").into_value(),
            SystemControlCommand::Volume {
                direction: Direction::Increase
            }
        );
    }

    #[test]
    fn test_brightness_wins_over_volume() {
        let cmd = parse_system_command("lower brightness and volume").into_value();
        assert_eq!(cmd.target(), SystemTarget::Brightness);
    }

    #[test]
    fn test_bluetooth_off_is_not_on() {
        assert_eq!(
            parse_system_command("turn off bluetooth").into_value(),
            SystemControlCommand::Bluetooth {
                state: Toggle::Disable
            }
        );
        assert_eq!(
            parse_system_command("switch on bluetooth").into_value(),
            SystemControlCommand::Bluetooth {
                state: Toggle::Enable
            }
        );
    }

    #[test]
    fn test_missing_direction_defaults_to_decrease() {
        let outcome = parse_system_command("brightness");
        assert!(outcome.is_defaulted());
        assert_eq!(
            outcome.into_value(),
            SystemControlCommand::Brightness {
                direction: Direction::Decrease
            }
        );
    }

    #[test]
    fn test_no_target() {
        let outcome = parse_system_command("make it nicer");
        assert_eq!(outcome.reason().map(|r| r.as_str()), Some(NO_TARGET_REASON));
    }

    #[test]
    fn test_structured_payload() {
        let outcome = parse_system_command(r#"{"target": "bluetooth", "state": "enable"}"#);
        assert!(!outcome.is_defaulted());
        assert_eq!(
            outcome.into_value(),
            SystemControlCommand::Bluetooth {
                state: Toggle::Enable
            }
        );
    }
}
