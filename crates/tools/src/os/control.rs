//! Hardware control surfaces: screen brightness, output volume, bluetooth radio

use super::{OsError, OsResult, Platform};
use async_trait::async_trait;
use deskpilot_executor::CommandRunner;
use std::sync::Arc;

/// Brightness is a percentage, volume a scalar in `0.0..=1.0`.
#[async_trait]
pub trait ControlSurface: Send + Sync {
    async fn brightness(&self) -> OsResult<u8>;
    async fn set_brightness(&self, percent: u8) -> OsResult<()>;
    async fn volume(&self) -> OsResult<f32>;
    async fn set_volume(&self, level: f32) -> OsResult<()>;
    async fn set_bluetooth(&self, enabled: bool) -> OsResult<()>;
}

pub fn platform_surface(platform: Platform, runner: Arc<dyn CommandRunner>) -> Arc<dyn ControlSurface> {
    match platform {
        Platform::Linux => Arc::new(LinuxSurface::new(runner)),
        Platform::MacOs => Arc::new(MacSurface::new(runner)),
        Platform::Windows => Arc::new(UnsupportedSurface::new("windows")),
    }
}

const DEFAULT_SINK: &str = "@DEFAULT_AUDIO_SINK@";

/// brightnessctl, wpctl and bluetoothctl.
pub struct LinuxSurface {
    runner: Arc<dyn CommandRunner>,
}

impl LinuxSurface {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn run(&self, command: &str, args: &[&str]) -> OsResult<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        Ok(self.runner.run(command, &args).await?)
    }
}

#[async_trait]
impl ControlSurface for LinuxSurface {
    async fn brightness(&self) -> OsResult<u8> {
        // device,class,current,percent,max
        let output = self.run("brightnessctl", &["-m"]).await?;
        output
            .lines()
            .next()
            .and_then(|line| line.split(',').nth(3))
            .and_then(|field| field.trim().trim_end_matches('%').parse::<u8>().ok())
            .ok_or_else(|| OsError::OperationFailed(format!("unexpected brightnessctl output: {}", output.trim())))
    }

    async fn set_brightness(&self, percent: u8) -> OsResult<()> {
        self.run("brightnessctl", &["set", &format!("{}%", percent.min(100))])
            .await
            .map(|_| ())
    }

    async fn volume(&self) -> OsResult<f32> {
        // "Volume: 0.40" optionally followed by " [MUTED]"
        let output = self.run("wpctl", &["get-volume", DEFAULT_SINK]).await?;
        output
            .split_whitespace()
            .nth(1)
            .and_then(|value| value.parse::<f32>().ok())
            .ok_or_else(|| OsError::OperationFailed(format!("unexpected wpctl output: {}", output.trim())))
    }

    async fn set_volume(&self, level: f32) -> OsResult<()> {
        let level = format!("{:.2}", level.clamp(0.0, 1.0));
        self.run("wpctl", &["set-volume", DEFAULT_SINK, &level])
            .await
            .map(|_| ())
    }

    async fn set_bluetooth(&self, enabled: bool) -> OsResult<()> {
        let state = if enabled { "on" } else { "off" };
        self.run("bluetoothctl", &["power", state]).await.map(|_| ())
    }
}

/// osascript for volume and blueutil for bluetooth. No brightness.
pub struct MacSurface {
    runner: Arc<dyn CommandRunner>,
}

impl MacSurface {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn osascript(&self, script: &str) -> OsResult<String> {
        Ok(self
            .runner
            .run("osascript", &["-e".to_string(), script.to_string()])
            .await?)
    }
}

#[async_trait]
impl ControlSurface for MacSurface {
    async fn brightness(&self) -> OsResult<u8> {
        Err(OsError::Unsupported("brightness control on macos".to_string()))
    }

    async fn set_brightness(&self, _percent: u8) -> OsResult<()> {
        Err(OsError::Unsupported("brightness control on macos".to_string()))
    }

    async fn volume(&self) -> OsResult<f32> {
        let output = self.osascript("output volume of (get volume settings)").await?;
        output
            .trim()
            .parse::<f32>()
            .map(|v| (v / 100.0).clamp(0.0, 1.0))
            .map_err(|e| OsError::OperationFailed(e.to_string()))
    }

    async fn set_volume(&self, level: f32) -> OsResult<()> {
        let percent = (level.clamp(0.0, 1.0) * 100.0).round() as u8;
        self.osascript(&format!("set volume output volume {}", percent))
            .await
            .map(|_| ())
    }

    async fn set_bluetooth(&self, enabled: bool) -> OsResult<()> {
        let state = if enabled { "1" } else { "0" };
        self.runner
            .run("blueutil", &["--power".to_string(), state.to_string()])
            .await?;
        Ok(())
    }
}

/// Reports every control as unsupported.
pub struct UnsupportedSurface {
    platform: String,
}

impl UnsupportedSurface {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }

    fn unsupported<T>(&self, what: &str) -> OsResult<T> {
        Err(OsError::Unsupported(format!("{} control on {}", what, self.platform)))
    }
}

#[async_trait]
impl ControlSurface for UnsupportedSurface {
    async fn brightness(&self) -> OsResult<u8> {
        self.unsupported("brightness")
    }

    async fn set_brightness(&self, _percent: u8) -> OsResult<()> {
        self.unsupported("brightness")
    }

    async fn volume(&self) -> OsResult<f32> {
        self.unsupported("volume")
    }

    async fn set_volume(&self, _level: f32) -> OsResult<()> {
        self.unsupported("volume")
    }

    async fn set_bluetooth(&self, _enabled: bool) -> OsResult<()> {
        self.unsupported("bluetooth")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskpilot_executor::ExecutorError;
    use std::sync::Mutex;

    struct MockRunner {
        reply: Result<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl MockRunner {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn missing() -> Self {
            Self {
                reply: Err("missing".to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for MockRunner {
        async fn run(&self, command: &str, args: &[String]) -> Result<String, ExecutorError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{} {}", command, args.join(" ")));
            self.reply
                .clone()
                .map_err(|_| ExecutorError::Unavailable(command.to_string()))
        }
    }

    #[tokio::test]
    async fn test_linux_brightness_roundtrip() {
        let runner = Arc::new(MockRunner::replying("intel_backlight,backlight,1200,50%,2400\n"));
        let surface = LinuxSurface::new(runner.clone());

        assert_eq!(surface.brightness().await.unwrap(), 50);
        surface.set_brightness(70).await.unwrap();
        assert_eq!(
            runner.calls.lock().unwrap().clone(),
            vec!["brightnessctl -m", "brightnessctl set 70%"]
        );
    }

    #[tokio::test]
    async fn test_linux_volume() {
        let runner = Arc::new(MockRunner::replying("Volume: 0.40 [MUTED]\n"));
        let surface = LinuxSurface::new(runner.clone());

        assert!((surface.volume().await.unwrap() - 0.4).abs() < f32::EPSILON);
        surface.set_volume(0.6).await.unwrap();
        assert_eq!(
            runner.calls.lock().unwrap().last().unwrap(),
            "wpctl set-volume @DEFAULT_AUDIO_SINK@ 0.60"
        );
    }

    #[tokio::test]
    async fn test_missing_tool_is_unsupported() {
        let surface = LinuxSurface::new(Arc::new(MockRunner::missing()));
        assert!(matches!(
            surface.set_bluetooth(true).await,
            Err(OsError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_unsupported_surface() {
        let surface = UnsupportedSurface::new("windows");
        assert!(matches!(surface.volume().await, Err(OsError::Unsupported(_))));
    }
}
