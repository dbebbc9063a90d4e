use super::{wrong_command, Handler};
use crate::context::HandlerContext;
use crate::error::HandlerError;
use async_trait::async_trait;
use deskpilot_core::parser::system::NO_TARGET_REASON;
use deskpilot_core::{Direction, Intent, ParseOutcome, ParsedCommand, SystemControlCommand, Toggle};
use deskpilot_memory::ChatHistory;

/// One step in `direction`, clamped to `0..=100`.
pub fn adjust_percent(current: u8, step: u8, direction: Direction) -> u8 {
    let current = current.min(100);
    match direction {
        Direction::Increase => current.saturating_add(step).min(100),
        Direction::Decrease => current.saturating_sub(step),
    }
}

/// One step in `direction`, clamped to `0.0..=1.0` and rounded to hundredths.
pub fn adjust_scalar(current: f32, step: f32, direction: Direction) -> f32 {
    let next = match direction {
        Direction::Increase => current + step,
        Direction::Decrease => current - step,
    };
    ((next * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

fn verb(direction: Direction) -> &'static str {
    match direction {
        Direction::Increase => "increased",
        Direction::Decrease => "decreased",
    }
}

pub struct SystemHandler;

#[async_trait]
impl Handler for SystemHandler {
    fn intent(&self) -> Intent {
        Intent::SystemControl
    }

    fn description(&self) -> &str {
        "Adjust brightness or volume, toggle bluetooth"
    }

    async fn execute(
        &self,
        ctx: &HandlerContext,
        _history: &ChatHistory,
        command: ParseOutcome<ParsedCommand>,
    ) -> Result<String, HandlerError> {
        if command.reason().is_some_and(|r| r.as_str() == NO_TARGET_REASON) {
            return Err(HandlerError::Unsupported("Unsupported system operation".to_string()));
        }
        let command = match command.into_value() {
            ParsedCommand::SystemControl(cmd) => cmd,
            other => return Err(wrong_command(Intent::SystemControl, &other)),
        };

        let settings = &ctx.settings;
        let surface = &ctx.surface;
        match command {
            SystemControlCommand::Brightness { direction } => {
                let current = surface.brightness().await?;
                let next = adjust_percent(current, settings.percent_step, direction);
                surface.set_brightness(next).await?;
                tracing::info!(current, next, "Brightness adjusted");
                Ok(format!("Brightness {} to {}%", verb(direction), next))
            }
            SystemControlCommand::Volume { direction } => {
                let current = surface.volume().await?;
                let next = adjust_scalar(current, settings.volume_step, direction);
                surface.set_volume(next).await?;
                tracing::info!(current, next, "Volume adjusted");
                Ok(format!(
                    "Volume {} to {}%",
                    verb(direction),
                    (next * 100.0).round() as u8
                ))
            }
            SystemControlCommand::Bluetooth { state } => {
                let enabled = state == Toggle::Enable;
                surface.set_bluetooth(enabled).await?;
                tracing::info!(enabled, "Bluetooth toggled");
                Ok(format!(
                    "Bluetooth {}",
                    if enabled { "enabled" } else { "disabled" }
                ))
            }
        }
    }
}
